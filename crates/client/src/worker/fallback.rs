//! Offline fallback page.

use novel_sw_core::{Request, Response};

use super::{Coordinator, ResponseSource, Served};

const OFFLINE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Offline - NovelReader</title>
  <style>
    body { font-family: sans-serif; text-align: center; padding: 2rem; }
    h1 { color: #6366f1; }
    a { color: #6366f1; text-decoration: none; }
  </style>
</head>
<body>
  <h1>You're Offline</h1>
  <p>Check your connection and try again.</p>
  <p><a href="/">Go Home</a></p>
</body>
</html>"#;

/// The inline page served when even the precached error page is missing.
pub fn offline_page() -> Response {
    Response::new(503, OFFLINE_HTML)
        .with_status_text("Service Unavailable")
        .with_header("content-type", "text/html")
}

impl Coordinator {
    /// The precached error page from any partition, else [`offline_page`].
    pub(crate) async fn offline_fallback(&self) -> Served {
        let request = Request::get(self.config.offline_fallback.clone());
        match self.storage.lookup_any(&request).await {
            Ok(Some(page)) => return Served::new(page, ResponseSource::OfflinePage),
            Ok(None) => {}
            Err(e) => tracing::warn!(url = %request.url, "offline page lookup failed: {e}"),
        }
        Served::new(offline_page(), ResponseSource::Synthesized)
    }
}
