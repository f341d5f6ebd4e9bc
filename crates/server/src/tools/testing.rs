//! Fixtures for tool tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rmcp::model::CallToolResult;
use serde::de::DeserializeOwned;

use novel_sw_client::fetch::Fetcher;
use novel_sw_client::{Coordinator, RecordingHost, WorkerConfig};
use novel_sw_core::{AppConfig, Error, MemoryStorage, Request, Response, http_date};

pub const ORIGIN: &str = "https://novels.test";

/// Replies keyed by URL; everything else is unreachable.
#[derive(Default)]
pub struct SiteStub {
    replies: Mutex<HashMap<String, Response>>,
}

impl SiteStub {
    pub fn page(self, url: &str, body: &str) -> Self {
        let response = Response::new(200, body.to_string())
            .with_header("content-type", "text/html")
            .with_header("date", http_date(chrono::Utc::now()));
        self.replies.lock().unwrap().insert(url.to_string(), response);
        self
    }
}

#[async_trait]
impl Fetcher for SiteStub {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let reply = self.replies.lock().unwrap().get(request.url.as_str()).cloned();
        reply.ok_or_else(|| Error::Network(format!("{} unreachable", request.url)))
    }
}

pub fn coordinator(site: SiteStub) -> (Arc<Coordinator>, Arc<RecordingHost>) {
    let app = AppConfig { origin: ORIGIN.into(), cache_version: "v2".into(), ..Default::default() };
    let config = WorkerConfig::from_app(&app).unwrap();
    let host = Arc::new(RecordingHost::new());
    let sw = Coordinator::new(config, Arc::new(MemoryStorage::new()), Arc::new(site), host.clone());
    (Arc::new(sw), host)
}

/// Decode the JSON text content of a tool result.
pub fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
