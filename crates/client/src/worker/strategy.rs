//! Strategy execution.
//!
//! Entries are written only for 2xx network responses. Storage failures are
//! logged and treated as a miss or a skipped write; they never fail a request.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

use novel_sw_core::{CacheStorage, Request, Response};

use super::{Coordinator, ResponseSource, Served, Strategy};
use crate::fetch::Fetcher;

/// Whether a cached response is younger than `max_age` at `now`.
///
/// Age comes from the `date` header alone. A missing or unparseable header
/// makes the entry permanently stale, and a `date` ahead of the local clock
/// counts as fresh; both follow from trusting the origin's clock.
pub fn is_fresh(response: &Response, max_age: Duration, now: DateTime<Utc>) -> bool {
    let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
    response
        .age(now)
        .is_some_and(|age| age.num_milliseconds() < max_age_ms)
}

async fn store(storage: &dyn CacheStorage, partition: &str, request: &Request, response: &Response) {
    if let Err(e) = storage.put(partition, request, response).await {
        tracing::warn!(partition, url = %request.url, "failed to store response: {e}");
    }
}

/// Fetch and, on 2xx, store. `None` means the network was unreachable.
async fn revalidate(
    storage: Arc<dyn CacheStorage>, fetcher: Arc<dyn Fetcher>, partition: String, request: Request,
) -> Option<Response> {
    match fetcher.fetch(&request).await {
        Ok(response) => {
            if response.is_ok() {
                store(storage.as_ref(), &partition, &request, &response).await;
            }
            Some(response)
        }
        Err(e) => {
            tracing::debug!(url = %request.url, "revalidation failed: {e}");
            None
        }
    }
}

impl Coordinator {
    pub(crate) async fn execute(&self, strategy: &Strategy, request: &Request) -> Served {
        let partition = self.config.partitions.name(strategy.category());
        self.open_partition(&partition).await;

        match strategy {
            Strategy::CacheFirst { max_age, unavailable, .. } => {
                self.cache_first(&partition, request, *max_age, unavailable).await
            }
            Strategy::NetworkFirst { .. } => self.network_first(&partition, request).await,
            Strategy::StaleWhileRevalidate { .. } => self.stale_while_revalidate(partition, request).await,
        }
    }

    pub(crate) async fn open_partition(&self, partition: &str) {
        if let Err(e) = self.storage.open(partition).await {
            tracing::warn!(partition, "failed to open partition: {e}");
        }
    }

    async fn cached(&self, partition: &str, request: &Request) -> Option<Response> {
        match self.storage.lookup(partition, request).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(partition, url = %request.url, "cache lookup failed: {e}");
                None
            }
        }
    }

    async fn cache_first(&self, partition: &str, request: &Request, max_age: Duration, unavailable: &str) -> Served {
        let cached = self.cached(partition, request).await;

        if let Some(hit) = &cached
            && is_fresh(hit, max_age, Utc::now())
        {
            return Served::new(hit.clone(), ResponseSource::Cache);
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    store(self.storage.as_ref(), partition, request, &response).await;
                }
                Served::new(response, ResponseSource::Network)
            }
            Err(e) => {
                tracing::debug!(url = %request.url, "network failed: {e}");
                match cached {
                    Some(stale) => Served::new(stale, ResponseSource::CacheFallback),
                    None => Served::new(Response::unavailable_text(unavailable), ResponseSource::Synthesized),
                }
            }
        }
    }

    async fn network_first(&self, partition: &str, request: &Request) -> Served {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    store(self.storage.as_ref(), partition, request, &response).await;
                }
                Served::new(response, ResponseSource::Network)
            }
            Err(e) => {
                tracing::debug!(url = %request.url, "network failed: {e}");
                match self.cached(partition, request).await {
                    Some(hit) => Served::new(hit, ResponseSource::CacheFallback),
                    None => self.offline_fallback().await,
                }
            }
        }
    }

    async fn stale_while_revalidate(&self, partition: String, request: &Request) -> Served {
        let cached = self.cached(&partition, request).await;

        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(revalidate(
            Arc::clone(&self.storage),
            Arc::clone(&self.fetcher),
            partition,
            request.clone(),
        ));
        // The request may stop listening; the revalidation still runs to completion.
        let forward = tokio::spawn(async move {
            if let Ok(result) = task.await {
                let _ = tx.send(result);
            }
        });
        self.track(forward).await;

        if let Some(hit) = cached {
            return Served::new(hit, ResponseSource::Cache);
        }

        match rx.await {
            Ok(Some(response)) => Served::new(response, ResponseSource::Network),
            _ => self.offline_fallback().await,
        }
    }
}
