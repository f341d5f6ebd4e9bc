//! Request classification.
//!
//! [`classify`] is pure: it looks only at the request and the configuration
//! and never touches storage or the network.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use novel_sw_core::{Category, Destination, Request};

use super::WorkerConfig;
use crate::fetch::is_same_origin;

/// Body of the 503 returned for a cross-origin image nobody can serve.
pub const IMAGE_UNAVAILABLE: &str = "Image not available";

/// Body of the 503 returned by same-origin cache-first routes.
pub const RESOURCE_UNAVAILABLE: &str = "Resource not available offline";

/// Why a request was left to the network untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassReason {
    NonGet,
    CrossOrigin,
}

/// A caching strategy bound to its partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Serve a cached entry younger than `max_age`, otherwise go to the network.
    CacheFirst { category: Category, max_age: Duration, unavailable: &'static str },
    /// Go to the network, fall back to the cache, then to the offline page.
    NetworkFirst { category: Category },
    /// Serve the cache immediately and refresh it in the background.
    StaleWhileRevalidate { category: Category },
}

impl Strategy {
    pub fn category(&self) -> Category {
        match self {
            Strategy::CacheFirst { category, .. }
            | Strategy::NetworkFirst { category }
            | Strategy::StaleWhileRevalidate { category } => *category,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::CacheFirst { .. } => "cache-first",
            Strategy::NetworkFirst { .. } => "network-first",
            Strategy::StaleWhileRevalidate { .. } => "stale-while-revalidate",
        }
    }
}

/// Routing decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    PassThrough(PassReason),
    Handle(Strategy),
}

/// Pick the strategy for a request.
///
/// Order matters: method, then origin, then destination, `accept` header and
/// finally the bundler marker in the URL.
pub fn classify(request: &Request, config: &WorkerConfig) -> Route {
    if !request.is_get() {
        return Route::PassThrough(PassReason::NonGet);
    }

    let is_image = request.destination == Destination::Image;

    if !is_same_origin(&request.url, &config.origin) {
        if is_image {
            return Route::Handle(Strategy::CacheFirst {
                category: Category::Images,
                max_age: config.image_max_age,
                unavailable: IMAGE_UNAVAILABLE,
            });
        }
        return Route::PassThrough(PassReason::CrossOrigin);
    }

    let strategy = if is_image {
        Strategy::CacheFirst {
            category: Category::Images,
            max_age: config.image_max_age,
            unavailable: RESOURCE_UNAVAILABLE,
        }
    } else if request.accepts_html() {
        Strategy::StaleWhileRevalidate { category: Category::Pages }
    } else if request.url.as_str().contains(&config.asset_marker) {
        Strategy::CacheFirst {
            category: Category::Static,
            max_age: config.static_max_age,
            unavailable: RESOURCE_UNAVAILABLE,
        }
    } else {
        Strategy::NetworkFirst { category: Category::Static }
    };

    Route::Handle(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::testing::{test_config, url};

    const DAY: u64 = 24 * 60 * 60;

    #[test]
    fn test_non_get_passes_through() {
        let config = test_config();
        for method in ["POST", "PUT", "DELETE", "HEAD"] {
            let request = Request::new(method, url("/bookmarks"));
            assert_eq!(classify(&request, &config), Route::PassThrough(PassReason::NonGet));
        }
    }

    #[test]
    fn test_non_get_image_still_passes_through() {
        let request = Request::new("POST", url("/cover.png")).with_destination(Destination::Image);
        assert_eq!(classify(&request, &test_config()), Route::PassThrough(PassReason::NonGet));
    }

    #[test]
    fn test_cross_origin_image() {
        let request =
            Request::get("https://cdn.example.com/c.webp".parse().unwrap()).with_destination(Destination::Image);
        let Route::Handle(strategy) = classify(&request, &test_config()) else { panic!("expected handled") };
        assert_eq!(
            strategy,
            Strategy::CacheFirst {
                category: Category::Images,
                max_age: Duration::from_secs(30 * DAY),
                unavailable: IMAGE_UNAVAILABLE
            }
        );
    }

    #[test]
    fn test_cross_origin_html_passes_through() {
        let request = Request::get("https://other.example.com/".parse().unwrap()).with_header("accept", "text/html");
        assert_eq!(classify(&request, &test_config()), Route::PassThrough(PassReason::CrossOrigin));
    }

    #[test]
    fn test_same_origin_image() {
        let request = Request::get(url("/images/cover.png")).with_destination(Destination::Image);
        let Route::Handle(strategy) = classify(&request, &test_config()) else { panic!("expected handled") };
        assert_eq!(strategy.name(), "cache-first");
        assert_eq!(strategy.category(), Category::Images);
        assert!(matches!(strategy, Strategy::CacheFirst { unavailable: RESOURCE_UNAVAILABLE, .. }));
    }

    #[test]
    fn test_image_wins_over_accept_header() {
        let request = Request::get(url("/images/cover.png"))
            .with_destination(Destination::Image)
            .with_header("accept", "text/html,image/*");
        let Route::Handle(strategy) = classify(&request, &test_config()) else { panic!("expected handled") };
        assert_eq!(strategy.category(), Category::Images);
    }

    #[test]
    fn test_html_navigation() {
        let request = Request::get(url("/novel/the-long-road"))
            .with_destination(Destination::Document)
            .with_header("Accept", "text/html,application/xhtml+xml;q=0.9");
        assert_eq!(
            classify(&request, &test_config()),
            Route::Handle(Strategy::StaleWhileRevalidate { category: Category::Pages })
        );
    }

    #[test]
    fn test_bundler_asset() {
        let request = Request::get(url("/_astro/index.Bx2k.js")).with_destination(Destination::Script);
        assert_eq!(
            classify(&request, &test_config()),
            Route::Handle(Strategy::CacheFirst {
                category: Category::Static,
                max_age: Duration::from_secs(7 * DAY),
                unavailable: RESOURCE_UNAVAILABLE
            })
        );
    }

    #[test]
    fn test_everything_else_is_network_first() {
        let request = Request::get(url("/manifest.json")).with_destination(Destination::Manifest);
        assert_eq!(
            classify(&request, &test_config()),
            Route::Handle(Strategy::NetworkFirst { category: Category::Static })
        );
    }
}
