//! Event tools: sw_message, sw_push, sw_notification_click and sw_sync.
//!
//! Each tool dispatches one event to the coordinator and reports the host
//! effects it produced (skip waiting, notifications shown, windows opened).

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use novel_sw_client::worker::NotificationData;
use novel_sw_client::{ControlMessage, Coordinator, HostEvent, Notification, RecordingHost};

use super::json_result;

/// Parameters for the sw_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessageParams {
    /// The posted message, e.g. {"type": "CACHE_URLS", "data": {"urls": ["/novel/1"]}}.
    pub message: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageOutput {
    /// The recognized message, or null when it was ignored.
    pub handled: Option<ControlMessage>,
    pub effects: Vec<HostEvent>,
}

/// Parameters for the sw_push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Raw push payload; JSON of the form {title, body, icon, badge, tag, data: {url}}.
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushOutput {
    pub notification: Notification,
    pub effects: Vec<HostEvent>,
}

/// Parameters for the sw_notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClickParams {
    /// The clicked notification's `data.url`; the site root when absent.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickOutput {
    pub opened: String,
    pub effects: Vec<HostEvent>,
}

/// Parameters for the sw_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    /// Sync registration tag, e.g. "sync-bookmarks".
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOutput {
    pub tag: String,
    pub effects: Vec<HostEvent>,
}

pub async fn message_impl(
    coordinator: &Coordinator, host: &RecordingHost, params: MessageParams,
) -> Result<CallToolResult, McpError> {
    let handled = coordinator.handle_message(&params.message).await;
    json_result(&MessageOutput { handled, effects: host.drain().await })
}

pub async fn push_impl(
    coordinator: &Coordinator, host: &RecordingHost, params: PushParams,
) -> Result<CallToolResult, McpError> {
    let notification = coordinator.handle_push(params.payload.as_deref().map(str::as_bytes)).await;
    json_result(&PushOutput { notification, effects: host.drain().await })
}

pub async fn click_impl(
    coordinator: &Coordinator, host: &RecordingHost, params: ClickParams,
) -> Result<CallToolResult, McpError> {
    let notification =
        Notification { data: params.url.map(|url| NotificationData { url: Some(url) }), ..Notification::default() };
    let opened = coordinator.handle_notification_click(&notification).await;
    json_result(&ClickOutput { opened: opened.to_string(), effects: host.drain().await })
}

pub async fn sync_impl(
    coordinator: &Coordinator, host: &RecordingHost, params: SyncParams,
) -> Result<CallToolResult, McpError> {
    coordinator.handle_sync(&params.tag).await;
    json_result(&SyncOutput { tag: params.tag, effects: host.drain().await })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{SiteStub, coordinator, output};
    use serde_json::json;

    #[tokio::test]
    async fn test_skip_waiting_message() {
        let (sw, host) = coordinator(SiteStub::default());
        let params = MessageParams { message: json!({"type": "SKIP_WAITING"}) };

        let out: MessageOutput = output(&message_impl(&sw, &host, params).await.unwrap());
        assert_eq!(out.handled, Some(ControlMessage::SkipWaiting));
        assert_eq!(out.effects, vec![HostEvent::SkipWaiting]);
    }

    #[tokio::test]
    async fn test_unknown_message() {
        let (sw, host) = coordinator(SiteStub::default());
        let params = MessageParams { message: json!({"type": "WHATEVER"}) };

        let out: MessageOutput = output(&message_impl(&sw, &host, params).await.unwrap());
        assert!(out.handled.is_none());
        assert!(out.effects.is_empty());
    }

    #[tokio::test]
    async fn test_cache_urls_then_clear() {
        let (sw, host) = coordinator(SiteStub::default().page("https://novels.test/novel/3", "three"));

        let cache = MessageParams { message: json!({"type": "CACHE_URLS", "data": {"urls": ["/novel/3"]}}) };
        message_impl(&sw, &host, cache).await.unwrap();
        assert_eq!(sw.storage().keys().await.unwrap(), vec!["novel-reader-pages-v2".to_string()]);

        let clear = MessageParams { message: json!({"type": "CLEAR_CACHE"}) };
        message_impl(&sw, &host, clear).await.unwrap();
        assert!(sw.storage().keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_push_payload() {
        let (sw, host) = coordinator(SiteStub::default());
        let params = PushParams { payload: Some(r#"{"title":"X","body":"Y"}"#.into()) };

        let out: PushOutput = output(&push_impl(&sw, &host, params).await.unwrap());
        assert_eq!(out.notification.title, "X");
        assert_eq!(out.notification.body.as_deref(), Some("Y"));
        assert_eq!(out.effects.len(), 1);
    }

    #[tokio::test]
    async fn test_push_without_payload() {
        let (sw, host) = coordinator(SiteStub::default());
        let out: PushOutput = output(&push_impl(&sw, &host, PushParams { payload: None }).await.unwrap());
        assert_eq!(out.notification, Notification::default());
    }

    #[tokio::test]
    async fn test_click() {
        let (sw, host) = coordinator(SiteStub::default());

        let out: ClickOutput =
            output(&click_impl(&sw, &host, ClickParams { url: Some("/novel/3".into()) }).await.unwrap());
        assert_eq!(out.opened, "https://novels.test/novel/3");
        assert_eq!(out.effects, vec![HostEvent::OpenWindow { url: "https://novels.test/novel/3".into() }]);

        let out: ClickOutput = output(&click_impl(&sw, &host, ClickParams { url: None }).await.unwrap());
        assert_eq!(out.opened, "https://novels.test/");
    }

    #[tokio::test]
    async fn test_sync() {
        let (sw, host) = coordinator(SiteStub::default());
        let out: SyncOutput =
            output(&sync_impl(&sw, &host, SyncParams { tag: "sync-bookmarks".into() }).await.unwrap());
        assert_eq!(out.tag, "sync-bookmarks");
        assert!(out.effects.is_empty());
    }
}
