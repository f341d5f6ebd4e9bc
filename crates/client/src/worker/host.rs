//! The environment hosting the coordinator: open pages and the notification tray.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use url::Url;

use super::Notification;

/// Effects the coordinator asks its host to perform.
#[async_trait]
pub trait ClientHost: Send + Sync {
    /// Activate the new version without waiting for old clients to close.
    async fn skip_waiting(&self);

    /// Take control of every open page.
    async fn claim_clients(&self);

    async fn show_notification(&self, notification: &Notification);

    async fn open_window(&self, url: &Url);
}

/// A recorded host effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    SkipWaiting,
    ClaimClients,
    ShowNotification { notification: Notification },
    OpenWindow { url: String },
}

/// Host that logs and records every effect in order.
///
/// Used by the server binary, where the effects are reported back to the
/// caller instead of reaching a real browser.
#[derive(Debug, Default)]
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub async fn events(&self) -> Vec<HostEvent> {
        self.events.lock().await.clone()
    }

    /// Take everything recorded so far, leaving the log empty.
    pub async fn drain(&self) -> Vec<HostEvent> {
        std::mem::take(&mut *self.events.lock().await)
    }

    async fn record(&self, event: HostEvent) {
        tracing::info!(?event, "host effect");
        self.events.lock().await.push(event);
    }
}

#[async_trait]
impl ClientHost for RecordingHost {
    async fn skip_waiting(&self) {
        self.record(HostEvent::SkipWaiting).await;
    }

    async fn claim_clients(&self) {
        self.record(HostEvent::ClaimClients).await;
    }

    async fn show_notification(&self, notification: &Notification) {
        self.record(HostEvent::ShowNotification { notification: notification.clone() }).await;
    }

    async fn open_window(&self, url: &Url) {
        self.record(HostEvent::OpenWindow { url: url.to_string() }).await;
    }
}
