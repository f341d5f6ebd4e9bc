//! sw_fetch tool implementation.
//!
//! Offers a request to the coordinator as if a page had issued it. Requests
//! the coordinator does not intercept are fetched directly, the way the
//! browser would.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use novel_sw_client::fetch::resolve;
use novel_sw_client::worker::PassReason;
use novel_sw_client::{Coordinator, FetchOutcome, ResponseSource};
use novel_sw_core::{CacheMode, Destination, Error, Request, Response};

use super::json_result;

/// Parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL or a path resolved against the site origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request destination: "document", "image", "script", "style", "font",
    /// "manifest" or "" (default).
    #[serde(default)]
    pub destination: Destination,

    /// Request headers, e.g. {"accept": "text/html"}.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Send with cache mode `reload`.
    #[serde(default)]
    pub reload: bool,

    /// Wait for background revalidation to finish before returning.
    #[serde(default)]
    pub settle: bool,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwFetchOutput {
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
    /// Strategy name, or "pass-through".
    pub handling: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_reason: Option<PassReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ResponseSource>,
}

impl SwFetchOutput {
    fn new(request: &Request, response: Response, handling: String) -> Self {
        Self {
            url: request.url.to_string(),
            status: response.status,
            body: response.text(),
            body_bytes: response.body.len(),
            status_text: response.status_text,
            headers: response.headers,
            handling,
            pass_reason: None,
            partition: None,
            source: None,
        }
    }
}

fn build_request(coordinator: &Coordinator, params: &SwFetchParams) -> Result<Request, Error> {
    let method = params.method.trim();
    if method.is_empty() {
        return Err(Error::InvalidInput("method cannot be empty".into()));
    }

    let url = resolve(&coordinator.config().origin, &params.url)
        .map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;

    let mut request = Request::new(method, url).with_destination(params.destination);
    for (name, value) in &params.headers {
        request = request.with_header(name, value.as_str());
    }
    if params.reload {
        request = request.with_cache_mode(CacheMode::Reload);
    }
    Ok(request)
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(coordinator: &Coordinator, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    let request = build_request(coordinator, &params)?;

    let output = match coordinator.handle_fetch(&request).await {
        FetchOutcome::PassThrough(reason) => {
            let response = coordinator.fetcher().fetch(&request).await?;
            SwFetchOutput { pass_reason: Some(reason), ..SwFetchOutput::new(&request, response, "pass-through".into()) }
        }
        FetchOutcome::Handled { strategy, served } => {
            let partition = coordinator.config().partitions.name(strategy.category());
            SwFetchOutput {
                partition: Some(partition),
                source: Some(served.source),
                ..SwFetchOutput::new(&request, served.response, strategy.name().into())
            }
        }
    };

    if params.settle {
        coordinator.settle().await;
    }

    json_result(&output)
}
