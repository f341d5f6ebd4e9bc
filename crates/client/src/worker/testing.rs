//! Shared fixtures for coordinator tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use url::Url;

use novel_sw_core::{
    AppConfig, CacheStorage, Error, MemoryStorage, PartitionInfo, Request, Response, http_date,
};

use super::{Coordinator, RecordingHost, WorkerConfig};
use crate::fetch::Fetcher;

pub const ORIGIN: &str = "https://novels.test";

pub fn url(path: &str) -> Url {
    Url::parse(ORIGIN).and_then(|o| o.join(path)).unwrap()
}

pub fn test_config() -> WorkerConfig {
    let app = AppConfig { origin: ORIGIN.into(), cache_version: "v2".into(), ..Default::default() };
    WorkerConfig::from_app(&app).unwrap()
}

/// 200 stamped with the current time.
pub fn ok_response(body: &str) -> Response {
    dated(body, Utc::now())
}

/// 200 stamped with `at`.
pub fn dated(body: &str, at: DateTime<Utc>) -> Response {
    Response::new(200, body.to_string()).with_header("date", &http_date(at))
}

/// Canned replies keyed by URL; anything unknown fails like an unreachable host.
#[derive(Default)]
pub struct StubFetcher {
    replies: Mutex<HashMap<String, Response>>,
    seen: Mutex<Vec<Request>>,
    gate: Option<Semaphore>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch blocks until [`StubFetcher::open_gate`].
    pub fn gated() -> Self {
        Self { gate: Some(Semaphore::new(0)), ..Self::default() }
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.close();
        }
    }

    pub fn reply(&self, url: &str, response: Response) {
        self.replies.lock().unwrap().insert(url.to_string(), response);
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.seen.lock().unwrap().push(request.clone());

        if let Some(gate) = &self.gate {
            // resolves with an error once the gate is closed
            let _ = gate.acquire().await;
        }

        let reply = self.replies.lock().unwrap().get(request.url.as_str()).cloned();
        reply.ok_or_else(|| Error::Network(format!("{} unreachable", request.url)))
    }
}

pub fn coordinator(fetcher: Arc<StubFetcher>) -> (Coordinator, Arc<MemoryStorage>, Arc<RecordingHost>) {
    let storage = Arc::new(MemoryStorage::new());
    let host = Arc::new(RecordingHost::new());
    let sw = Coordinator::new(test_config(), storage.clone(), fetcher, host.clone());
    (sw, storage, host)
}

/// Coordinator over any storage backend.
pub fn coordinator_with(storage: Arc<dyn CacheStorage>, fetcher: Arc<StubFetcher>) -> Coordinator {
    Coordinator::new(test_config(), storage, fetcher, Arc::new(RecordingHost::new()))
}

/// In-memory storage that can be made slow or broken.
#[derive(Default)]
pub struct FaultyStorage {
    inner: MemoryStorage,
    lookup_delay: Option<Duration>,
    fail_all: bool,
    reject_writes_for: Option<String>,
}

impl FaultyStorage {
    /// Lookups sleep for `delay` before reading.
    pub fn slow_lookups(delay: Duration) -> Self {
        Self { lookup_delay: Some(delay), ..Self::default() }
    }

    /// Every operation fails.
    pub fn failing() -> Self {
        Self { fail_all: true, ..Self::default() }
    }

    /// Writes touching `url` fail; a batch containing it writes nothing.
    pub fn rejecting_writes_for(url: &str) -> Self {
        Self { reject_writes_for: Some(url.to_string()), ..Self::default() }
    }

    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }

    fn check(&self) -> Result<(), Error> {
        if self.fail_all {
            return Err(Error::CorruptEntry("storage unavailable".into()));
        }
        Ok(())
    }

    fn check_write(&self, request: &Request) -> Result<(), Error> {
        self.check()?;
        match &self.reject_writes_for {
            Some(url) if request.url.as_str() == url.as_str() => {
                Err(Error::CorruptEntry(format!("write rejected for {url}")))
            }
            _ => Ok(()),
        }
    }

    async fn delay(&self) {
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CacheStorage for FaultyStorage {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        self.check()?;
        self.inner.open(partition).await
    }

    async fn has(&self, partition: &str) -> Result<bool, Error> {
        self.check()?;
        self.inner.has(partition).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.check()?;
        self.inner.keys().await
    }

    async fn delete(&self, partition: &str) -> Result<bool, Error> {
        self.check()?;
        self.inner.delete(partition).await
    }

    async fn lookup(&self, partition: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.check()?;
        self.delay().await;
        self.inner.lookup(partition, request).await
    }

    async fn lookup_any(&self, request: &Request) -> Result<Option<Response>, Error> {
        self.check()?;
        self.delay().await;
        self.inner.lookup_any(request).await
    }

    async fn put(&self, partition: &str, request: &Request, response: &Response) -> Result<(), Error> {
        self.check_write(request)?;
        self.inner.put(partition, request, response).await
    }

    async fn put_all(&self, partition: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        for (request, _) in entries {
            self.check_write(request)?;
        }
        self.inner.put_all(partition, entries).await
    }

    async fn describe(&self) -> Result<Vec<PartitionInfo>, Error> {
        self.check()?;
        self.inner.describe().await
    }
}
