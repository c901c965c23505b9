//! Test utilities: mock implementations of the collaborator traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use url::Url;

use crate::error::AppError;
use crate::models::ContactSignals;
use crate::traits::{PageScraper, Sleeper, Transport};

type Reply = Result<serde_json::Value, AppError>;

// ---------------------------------------------------------------------------
// MockTransport
// ---------------------------------------------------------------------------

/// Mock transport with per-route reply queues.
///
/// A call is answered by the first route whose fragment occurs in the URL and
/// whose queue is non-empty, then by the catch-all queue, then by an empty
/// `ZERO_RESULTS` body.
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<Vec<(String, VecDeque<Reply>)>>>,
    fallback: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<Mutex<Vec<(Url, Option<Url>)>>>,
}

impl MockTransport {
    /// Catch-all replies, consumed in order.
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            fallback: Arc::new(Mutex::new(replies.into())),
            ..Default::default()
        }
    }

    /// Queue replies for URLs containing `fragment`.
    pub fn on(self, fragment: &str, replies: Vec<Reply>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((fragment.to_string(), replies.into()));
        self
    }

    pub fn calls(&self) -> Vec<Url> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(u, _)| u.clone())
            .collect()
    }

    /// Calls whose URL contains `fragment`.
    pub fn calls_to(&self, fragment: &str) -> Vec<Url> {
        self.calls()
            .into_iter()
            .filter(|u| u.as_str().contains(fragment))
            .collect()
    }

    pub fn proxies(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, p)| p.as_ref().map(Url::to_string))
            .collect()
    }
}

impl Transport for MockTransport {
    async fn get_json(&self, url: &Url, proxy: Option<&Url>) -> Reply {
        self.calls
            .lock()
            .unwrap()
            .push((url.clone(), proxy.cloned()));

        {
            let mut routes = self.routes.lock().unwrap();
            for (fragment, queue) in routes.iter_mut() {
                if url.as_str().contains(fragment.as_str())
                    && let Some(reply) = queue.pop_front()
                {
                    return reply;
                }
            }
        }

        self.fallback
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(serde_json::json!({"status": "ZERO_RESULTS", "results": []})))
    }
}

// ---------------------------------------------------------------------------
// RecordingSleeper
// ---------------------------------------------------------------------------

/// Sleeper that records requested durations and returns immediately.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

// ---------------------------------------------------------------------------
// MockScraper
// ---------------------------------------------------------------------------

/// Mock page scraper returning a fixed result and recording visited URLs.
#[derive(Clone)]
pub struct MockScraper {
    result: Arc<Mutex<Result<ContactSignals, String>>>,
    visited: Arc<Mutex<Vec<String>>>,
}

impl MockScraper {
    pub fn new(signals: ContactSignals) -> Self {
        Self {
            result: Arc::new(Mutex::new(Ok(signals))),
            visited: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(message: &str) -> Self {
        Self {
            result: Arc::new(Mutex::new(Err(message.to_string()))),
            visited: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

impl PageScraper for MockScraper {
    async fn scrape(&self, url: &str) -> Result<ContactSignals, AppError> {
        self.visited.lock().unwrap().push(url.to_string());
        self.result
            .lock()
            .unwrap()
            .clone()
            .map_err(AppError::BrowserError)
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A nearby-search body with one result per id.
pub fn nearby_page(ids: &[&str], next_page_token: Option<&str>) -> serde_json::Value {
    let results: Vec<_> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "place_id": id,
                "name": format!("Place {id}"),
                "types": ["dentist", "health"],
                "vicinity": format!("{id} Street"),
                "geometry": {"location": {"lat": 28.5, "lng": 77.2}}
            })
        })
        .collect();
    let mut body = serde_json::json!({"status": "OK", "results": results});
    if let Some(token) = next_page_token {
        body["next_page_token"] = serde_json::Value::String(token.to_string());
    }
    body
}

/// A geocode body resolving to `(lat, lng)`.
pub fn geocode_hit(lat: f64, lng: f64) -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "results": [{"geometry": {"location": {"lat": lat, "lng": lng}}}]
    })
}

pub fn geocode_miss() -> serde_json::Value {
    serde_json::json!({"status": "ZERO_RESULTS", "results": []})
}
