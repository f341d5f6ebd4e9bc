//! Install, activate and bulk partition operations.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

use novel_sw_core::{CacheMode, Category, Error, Request};

use super::Coordinator;

/// Lifecycle of one coordinator version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
}

/// Outcome of the install phase.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub version: String,
    pub partitions: Vec<String>,
    pub precached: usize,
    /// Why precaching was skipped; install completes regardless.
    pub precache_error: Option<String>,
}

/// Outcome of the activate phase.
#[derive(Debug, Clone, Serialize)]
pub struct ActivateReport {
    pub version: String,
    pub deleted: Vec<String>,
}

impl Coordinator {
    /// Create every partition, precache the navigation routes, then ask the
    /// host to activate without waiting for open clients.
    pub async fn install(&self) -> InstallReport {
        let version = self.config.partitions.version().to_string();
        tracing::info!(%version, "installing");
        self.set_state(Lifecycle::Installing).await;

        let partitions = self.config.partitions.names();
        for name in &partitions {
            self.open_partition(name).await;
        }

        let requests: Vec<Request> = self
            .config
            .precache
            .iter()
            .map(|url| Request::get(url.clone()).with_cache_mode(CacheMode::Reload))
            .collect();
        let statics = self.config.partitions.name(Category::Static);

        let (precached, precache_error) = match self.add_all(&statics, &requests).await {
            Ok(count) => {
                tracing::info!(count, "precached");
                (count, None)
            }
            Err(e) => {
                tracing::warn!("precache failed: {e}");
                (0, Some(e.to_string()))
            }
        };

        self.host.skip_waiting().await;
        self.set_state(Lifecycle::Installed).await;

        InstallReport { version, partitions, precached, precache_error }
    }

    /// Delete partitions from older versions, then take control of open clients.
    pub async fn activate(&self) -> ActivateReport {
        let version = self.config.partitions.version().to_string();
        tracing::info!(%version, "activating");
        self.set_state(Lifecycle::Activating).await;

        let names = match self.storage.keys().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!("failed to enumerate partitions: {e}");
                Vec::new()
            }
        };

        let mut deleted = Vec::new();
        for name in names.into_iter().filter(|n| self.config.partitions.is_orphaned(n)) {
            tracing::info!(partition = %name, "deleting old partition");
            match self.storage.delete(&name).await {
                Ok(_) => deleted.push(name),
                Err(e) => tracing::warn!(partition = %name, "failed to delete partition: {e}"),
            }
        }

        self.host.claim_clients().await;
        self.set_state(Lifecycle::Activated).await;

        ActivateReport { version, deleted }
    }

    /// Delete every partition, whatever its prefix. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns the first storage error; partitions deleted before it stay deleted.
    pub async fn clear_all(&self) -> Result<usize, Error> {
        let names = self.storage.keys().await?;
        let mut removed = 0;
        for name in &names {
            if self.storage.delete(name).await? {
                removed += 1;
            }
        }
        tracing::info!(removed, "all partitions cleared");
        Ok(removed)
    }

    /// Fetch every request and store all of them, or none.
    ///
    /// # Arguments
    ///
    /// * `partition` - Partition receiving the entries; created if missing
    /// * `requests` - Requests fetched concurrently
    ///
    /// # Errors
    ///
    /// Returns `Error::Network` for the first unreachable URL, `Error::HttpError`
    /// for the first non-2xx status, or the storage error from the single
    /// batched write. Nothing is written in any of these cases.
    pub async fn add_all(&self, partition: &str, requests: &[Request]) -> Result<usize, Error> {
        let results = join_all(requests.iter().map(|r| self.fetcher.fetch(r))).await;

        let mut fetched = Vec::with_capacity(requests.len());
        for (request, result) in requests.iter().zip(results) {
            let response = result?;
            if !response.is_ok() {
                return Err(Error::HttpError(format!("{} returned status {}", request.url, response.status)));
            }
            fetched.push((request.clone(), response));
        }

        self.storage.put_all(partition, &fetched).await?;
        Ok(fetched.len())
    }
}
