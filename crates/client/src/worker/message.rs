//! Control messages posted by open pages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use novel_sw_core::{Category, Error, Request};

use super::Coordinator;
use crate::fetch::resolve;

/// Payload of a `CACHE_URLS` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheUrlsData {
    pub urls: Vec<String>,
}

/// A recognized control message.
///
/// Wire form: `{ "type": "SKIP_WAITING" }`, `{ "type": "CLEAR_CACHE" }`,
/// `{ "type": "CACHE_URLS", "data": { "urls": [...] } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    SkipWaiting,
    ClearCache,
    CacheUrls { data: CacheUrlsData },
}

impl ControlMessage {
    /// Parse a posted message; anything unrecognized yields `None`.
    pub fn parse(message: &Value) -> Option<Self> {
        serde_json::from_value(message.clone()).ok()
    }
}

impl Coordinator {
    /// Act on a posted message. Unrecognized messages are ignored and return `None`.
    pub async fn handle_message(&self, message: &Value) -> Option<ControlMessage> {
        let Some(parsed) = ControlMessage::parse(message) else {
            tracing::debug!(%message, "ignoring unrecognized message");
            return None;
        };

        match &parsed {
            ControlMessage::SkipWaiting => self.host.skip_waiting().await,
            ControlMessage::ClearCache => {
                if let Err(e) = self.clear_all().await {
                    tracing::warn!("failed to clear partitions: {e}");
                }
            }
            ControlMessage::CacheUrls { data } => match self.cache_urls(&data.urls).await {
                Ok(count) => tracing::info!(count, "cached requested urls"),
                Err(e) => tracing::warn!("failed to cache requested urls: {e}"),
            },
        }

        Some(parsed)
    }

    /// Batch-add URLs (paths or absolute) to the pages partition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if any URL does not resolve against the
    /// origin, otherwise whatever [`Coordinator::add_all`] returns.
    pub async fn cache_urls(&self, urls: &[String]) -> Result<usize, Error> {
        let requests = urls
            .iter()
            .map(|u| {
                resolve(&self.config.origin, u)
                    .map(Request::get)
                    .map_err(|e| Error::InvalidUrl(format!("{u}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pages = self.config.partitions.name(Category::Pages);
        self.add_all(&pages, &requests).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::HostEvent;
    use crate::worker::testing::{StubFetcher, coordinator, ok_response, url};
    use novel_sw_core::CacheStorage;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_parse_messages() {
        assert_eq!(ControlMessage::parse(&json!({"type": "SKIP_WAITING"})), Some(ControlMessage::SkipWaiting));
        assert_eq!(ControlMessage::parse(&json!({"type": "CLEAR_CACHE"})), Some(ControlMessage::ClearCache));
        assert_eq!(
            ControlMessage::parse(&json!({"type": "CACHE_URLS", "data": {"urls": ["/a", "/b"]}})),
            Some(ControlMessage::CacheUrls { data: CacheUrlsData { urls: vec!["/a".into(), "/b".into()] } })
        );
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let msg = json!({"type": "SKIP_WAITING", "data": {"reason": "update banner"}});
        assert_eq!(ControlMessage::parse(&msg), Some(ControlMessage::SkipWaiting));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(ControlMessage::parse(&json!({"type": "PING"})), None);
        assert_eq!(ControlMessage::parse(&json!({"kind": "CLEAR_CACHE"})), None);
        assert_eq!(ControlMessage::parse(&json!({"type": "CACHE_URLS"})), None);
        assert_eq!(ControlMessage::parse(&json!("CLEAR_CACHE")), None);
    }

    #[tokio::test]
    async fn test_skip_waiting_message() {
        let (sw, _, host) = coordinator(Arc::new(StubFetcher::new()));
        let handled = sw.handle_message(&json!({"type": "SKIP_WAITING"})).await;
        assert_eq!(handled, Some(ControlMessage::SkipWaiting));
        assert_eq!(host.events().await, vec![HostEvent::SkipWaiting]);
    }

    #[tokio::test]
    async fn test_clear_cache_message_leaves_no_partitions() {
        let (sw, storage, _) = coordinator(Arc::new(StubFetcher::new()));
        for name in sw.config().partitions.names() {
            storage.open(&name).await.unwrap();
        }
        storage.open("someone-elses-cache").await.unwrap();

        sw.handle_message(&json!({"type": "CLEAR_CACHE"})).await;
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cache_urls_message_fills_pages() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.reply("https://novels.test/novel/7", ok_response("novel seven"));
        fetcher.reply("https://novels.test/novel/7/chapter/1", ok_response("chapter one"));
        let (sw, storage, _) = coordinator(fetcher);

        let msg = json!({"type": "CACHE_URLS", "data": {"urls": ["/novel/7", "/novel/7/chapter/1"]}});
        sw.handle_message(&msg).await;

        let pages = sw.config().partitions.name(Category::Pages);
        let hit = storage.lookup(&pages, &Request::get(url("/novel/7/chapter/1"))).await.unwrap();
        assert_eq!(hit.unwrap().text(), "chapter one");
    }

    #[tokio::test]
    async fn test_cache_urls_failure_is_not_fatal() {
        let (sw, storage, _) = coordinator(Arc::new(StubFetcher::new()));
        let msg = json!({"type": "CACHE_URLS", "data": {"urls": ["/novel/9"]}});

        assert!(sw.handle_message(&msg).await.is_some());
        let pages = sw.config().partitions.name(Category::Pages);
        assert!(storage.lookup(&pages, &Request::get(url("/novel/9"))).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_message_is_ignored() {
        let (sw, storage, host) = coordinator(Arc::new(StubFetcher::new()));
        storage.open("novel-reader-pages-v2").await.unwrap();

        assert!(sw.handle_message(&json!({"type": "REFRESH_EVERYTHING"})).await.is_none());
        assert!(host.events().await.is_empty());
        assert_eq!(storage.keys().await.unwrap().len(), 1);
    }
}
