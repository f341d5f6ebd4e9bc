//! Response model shared by the network, the partitions and the coordinator.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};

/// An HTTP response, either fresh from the network or read back from a partition.
///
/// Cloning is cheap: the body is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    /// Header names are stored lowercase.
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, status_text: String::new(), headers: BTreeMap::new(), body: body.into() }
    }

    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// A 503 with a plain-text body, used when nothing can be served.
    pub fn unavailable_text(body: &str) -> Self {
        Self::new(503, body.to_string())
            .with_status_text("Service Unavailable")
            .with_header("content-type", "text/plain;charset=UTF-8")
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Status in the 200..=299 range.
    pub fn is_ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Parsed `date` header, if present and well-formed.
    ///
    /// Accepts the three HTTP-date forms: IMF-fixdate (and general RFC 2822),
    /// obsolete RFC 850 and asctime.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        parse_http_date(self.header("date")?)
    }

    /// Age relative to `now`, derived from the `date` header.
    ///
    /// Negative when the header lies in the future.
    pub fn age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.date().map(|date| now - date)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
        return Some(date.with_timezone(&Utc));
    }
    ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Format a timestamp the way HTTP `date` headers are written.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
