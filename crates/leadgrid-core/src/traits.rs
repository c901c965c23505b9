use std::future::Future;
use std::time::Duration;

use url::Url;

use crate::error::AppError;
use crate::models::ContactSignals;

/// Performs one outbound GET and decodes the body as JSON.
///
/// Implementations make exactly one attempt; retries, backoff, and proxy
/// selection belong to [`crate::executor::ResilientExecutor`].
pub trait Transport: Send + Sync + Clone {
    fn get_json(
        &self,
        url: &Url,
        proxy: Option<&Url>,
    ) -> impl Future<Output = Result<serde_json::Value, AppError>> + Send;
}

/// Loads a web page and harvests contact signals from it.
pub trait PageScraper: Send + Sync + Clone {
    fn scrape(&self, url: &str) -> impl Future<Output = Result<ContactSignals, AppError>> + Send;
}

/// Suspends the current task.
///
/// Every pacing and backoff pause in the pipeline goes through this trait so
/// tests can observe the pauses without waiting on the wall clock.
pub trait Sleeper: Send + Sync + Clone {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// A [`PageScraper`] for builds without a browser engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBrowser;

impl PageScraper for NoBrowser {
    async fn scrape(&self, _url: &str) -> Result<ContactSignals, AppError> {
        Err(AppError::BrowserError(
            "fallback scraping requires the `browser` feature".into(),
        ))
    }
}
