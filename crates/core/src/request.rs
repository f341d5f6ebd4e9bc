//! Intercepted request model.
//!
//! Mirrors the subset of a browser `Request` the coordinator inspects:
//! method, absolute URL, destination, headers and cache mode.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// What kind of resource the requesting context expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Document,
    Image,
    Script,
    Style,
    Font,
    Manifest,
    /// Plain `fetch()` calls and anything without a destination.
    #[default]
    #[serde(rename = "")]
    Empty,
    #[serde(other)]
    Other,
}

/// How the request interacts with intermediate HTTP caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    #[default]
    Default,
    /// Bypass intermediate caches and revalidate with the origin.
    Reload,
}

/// An outgoing request as seen by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub destination: Destination,
    /// Header names are stored lowercase.
    pub headers: BTreeMap<String, String>,
    pub cache_mode: CacheMode,
}

impl Request {
    /// A plain GET with no destination and no headers.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// A request with the given method; the method is uppercased.
    pub fn new(method: &str, url: Url) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url,
            destination: Destination::Empty,
            headers: BTreeMap::new(),
            cache_mode: CacheMode::Default,
        }
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Whether the `accept` header asks for an HTML document.
    pub fn accepts_html(&self) -> bool {
        self.header("accept").is_some_and(|accept| accept.contains("text/html"))
    }

    /// URL with any fragment removed, as used for cache identity.
    pub fn identity_url(&self) -> Url {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url
    }
}
