//! Offline cache coordinator.
//!
//! The coordinator owns the service-worker side of the NovelReader site:
//!
//! - **install**: create every partition, precache the navigation routes
//! - **activate**: delete partitions left over from older versions, claim clients
//! - **fetch**: classify each request ([`route::classify`]) and run the chosen
//!   [`Strategy`] against the injected storage and fetcher
//! - **message / push / notificationclick / sync**: control surface for pages
//!
//! Network failures never escape a fetch: the worst case is a synthesized 503
//! or the offline page.

pub mod fallback;
pub mod host;
pub mod lifecycle;
pub mod message;
pub mod notify;
pub mod route;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use url::Url;

use novel_sw_core::{AppConfig, CacheStorage, Error, PartitionSet, Request, Response};

use crate::fetch::{Fetcher, resolve};

pub use host::{ClientHost, HostEvent, RecordingHost};
pub use lifecycle::{ActivateReport, InstallReport, Lifecycle};
pub use message::ControlMessage;
pub use notify::{Notification, NotificationData};
pub use route::{PassReason, Route, Strategy, classify};
pub use strategy::is_fresh;

/// Resolved settings the coordinator runs with.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub partitions: PartitionSet,
    pub origin: Url,
    /// Fetched into the static partition at install time.
    pub precache: Vec<Url>,
    pub offline_fallback: Url,
    /// Path fragment identifying bundler output.
    pub asset_marker: String,
    pub static_max_age: Duration,
    pub image_max_age: Duration,
}

impl WorkerConfig {
    /// Resolve every configured path against the configured origin.
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        let resolve_path = |path: &str| resolve(&origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")));

        let precache = config
            .precache_urls
            .iter()
            .map(|p| resolve_path(p))
            .collect::<Result<Vec<_>, _>>()?;
        let offline_fallback = resolve_path(&config.offline_fallback_path)?;

        Ok(Self {
            partitions: PartitionSet::new(&config.cache_prefix, &config.cache_version),
            precache,
            offline_fallback,
            asset_marker: config.asset_marker.clone(),
            static_max_age: config.static_max_age(),
            image_max_age: config.image_max_age(),
            origin,
        })
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseSource {
    /// Straight from the network (any status).
    Network,
    /// A cache hit trusted without contacting the network first.
    Cache,
    /// A cached entry served because the network failed.
    CacheFallback,
    /// The precached offline page.
    OfflinePage,
    /// Built inline because nothing else was available.
    Synthesized,
}

/// A response together with its provenance.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

impl Served {
    pub fn new(response: Response, source: ResponseSource) -> Self {
        Self { response, source }
    }
}

/// Result of offering a request to the coordinator.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Not intercepted; the caller performs the request itself.
    PassThrough(PassReason),
    Handled { strategy: Strategy, served: Served },
}

/// The offline cache coordinator.
pub struct Coordinator {
    config: WorkerConfig,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    host: Arc<dyn ClientHost>,
    lifecycle: RwLock<Lifecycle>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    pub fn new(
        config: WorkerConfig, storage: Arc<dyn CacheStorage>, fetcher: Arc<dyn Fetcher>, host: Arc<dyn ClientHost>,
    ) -> Self {
        Self {
            config,
            storage,
            fetcher,
            host,
            lifecycle: RwLock::new(Lifecycle::Parsed),
            background: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    pub async fn state(&self) -> Lifecycle {
        *self.lifecycle.read().await
    }

    async fn set_state(&self, state: Lifecycle) {
        *self.lifecycle.write().await = state;
    }

    /// Offer an intercepted request to the coordinator.
    pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
        match classify(request, &self.config) {
            Route::PassThrough(reason) => {
                tracing::debug!(method = %request.method, url = %request.url, ?reason, "passing through");
                FetchOutcome::PassThrough(reason)
            }
            Route::Handle(strategy) => {
                let served = self.execute(&strategy, request).await;
                tracing::debug!(
                    url = %request.url,
                    strategy = strategy.name(),
                    status = served.response.status,
                    source = ?served.source,
                    "served"
                );
                FetchOutcome::Handled { strategy, served }
            }
        }
    }

    /// Keep a detached task's handle so [`Coordinator::settle`] can await it.
    pub(crate) async fn track(&self, task: JoinHandle<()>) {
        let mut pending = self.background.lock().await;
        pending.retain(|t| !t.is_finished());
        pending.push(task);
    }

    /// Wait for every background revalidation started so far.
    pub async fn settle(&self) {
        let pending = std::mem::take(&mut *self.background.lock().await);
        for task in pending {
            if let Err(e) = task.await {
                tracing::warn!("background revalidation aborted: {e}");
            }
        }
    }
}
