//! Push, notification click and background sync.

use serde::{Deserialize, Serialize};
use url::Url;

use super::Coordinator;
use crate::fetch::resolve;

const DEFAULT_TITLE: &str = "NovelReader";
const DEFAULT_ICON: &str = "/icon-192.svg";

/// Tag of the bookmark sync registered by the reader UI.
pub const SYNC_BOOKMARKS: &str = "sync-bookmarks";

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

/// Notification payload shown for a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NotificationData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Default for Notification {
    /// The "new chapters" announcement.
    fn default() -> Self {
        Self {
            title: default_title(),
            body: Some("New chapters available!".to_string()),
            icon: Some(DEFAULT_ICON.to_string()),
            badge: Some(DEFAULT_ICON.to_string()),
            tag: Some("new-chapters".to_string()),
            data: Some(NotificationData { url: Some("/latest".to_string()) }),
        }
    }
}

impl Notification {
    /// Build from a raw push payload. Absent, empty or malformed payloads give
    /// the default notification; a parsed payload is used as-is.
    pub fn from_push(payload: Option<&[u8]>) -> Self {
        let Some(bytes) = payload.filter(|b| !b.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_slice(bytes) {
            Ok(notification) => notification,
            Err(e) => {
                tracing::debug!("unreadable push payload, using default: {e}");
                Self::default()
            }
        }
    }

    /// Where a click should take the user, relative to the site.
    pub fn target(&self) -> &str {
        self.data.as_ref().and_then(|d| d.url.as_deref()).unwrap_or("/")
    }
}

impl Coordinator {
    /// Show a notification for a push message.
    pub async fn handle_push(&self, payload: Option<&[u8]>) -> Notification {
        let notification = Notification::from_push(payload);
        self.host.show_notification(&notification).await;
        notification
    }

    /// Open a window at the notification's target. Returns the opened URL.
    pub async fn handle_notification_click(&self, notification: &Notification) -> Url {
        let target = match resolve(&self.config.origin, notification.target()) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(target = notification.target(), "bad notification target: {e}");
                self.config.origin.clone()
            }
        };
        self.host.open_window(&target).await;
        target
    }

    /// Background sync. Nothing is synchronized; the tag is only logged.
    pub async fn handle_sync(&self, tag: &str) {
        if tag == SYNC_BOOKMARKS {
            tracing::info!(tag, "bookmark sync requested");
        } else {
            tracing::debug!(tag, "ignoring unknown sync tag");
        }
    }
}
