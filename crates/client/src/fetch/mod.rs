//! Network access for the coordinator.
//!
//! ### Fetch seam
//! - [`Fetcher`] is the only way the coordinator reaches the network, so tests
//!   can substitute a stub.
//! - Any HTTP status counts as a successful fetch; only transport failures
//!   (DNS, refused connection, client timeout) are errors.
//!
//! ### Cache busting
//! - Requests in `reload` cache mode carry `Cache-Control: no-cache` and
//!   `Pragma: no-cache` so intermediaries revalidate with the origin.

pub mod url;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::{Client, Method, header};

pub use self::url::{UrlError, is_same_origin, resolve};

use novel_sw_core::{AppConfig, CacheMode, Error, Request, Response};

/// Performs network requests on behalf of the coordinator.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a request. Returns `Error::Network` when the network is unreachable.
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "novel-sw/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "novel-sw/0.1".to_string(), timeout: Duration::from_millis(20000), max_redirects: 5 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

/// reqwest-backed [`Fetcher`].
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

/// Flatten a header map into lowercase names, joining repeated headers with ", ".
pub(crate) fn collect_headers(headers: &header::HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else { continue };
        out.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    out
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method: {}", request.method)))?;

        let mut builder = self.http.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.cache_mode == CacheMode::Reload {
            builder = builder
                .header(header::CACHE_CONTROL, "no-cache")
                .header(header::PRAGMA, "no-cache");
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("{}: {e}", request.url)))?;

        let status = response.status();
        let headers = collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {e}")))?;

        tracing::debug!(
            url = %request.url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
