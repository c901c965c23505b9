//! Resilient single-request execution: proxy selection, retry, and
//! exponential backoff around one [`Transport`] call.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::AppError;
use crate::proxy::ProxyRotator;
use crate::traits::{Sleeper, Transport};

/// Retry budget for one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub retries: u32,
    /// Pause after the first failure; doubled after every further failure.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            initial_backoff: Duration::from_millis(1000),
        }
    }
}

/// Wraps a [`Transport`] with proxy rotation and timed retries.
#[derive(Clone)]
pub struct ResilientExecutor<T, S> {
    transport: T,
    sleeper: S,
    policy: RetryPolicy,
    proxies: Arc<ProxyRotator>,
}

impl<T: Transport, S: Sleeper> ResilientExecutor<T, S> {
    pub fn new(transport: T, sleeper: S, policy: RetryPolicy, proxies: Arc<ProxyRotator>) -> Self {
        Self {
            transport,
            sleeper,
            policy,
            proxies,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch `url` and decode the JSON body with `decode`.
    ///
    /// One proxy is drawn from the rotator per call and reused for every
    /// attempt. A decode failure counts as a failed attempt. After the last
    /// attempt fails, its error is returned.
    pub async fn execute<R, F>(&self, url: &Url, decode: F) -> Result<R, AppError>
    where
        F: Fn(serde_json::Value) -> Result<R, AppError>,
    {
        let proxy = self.select_proxy();
        let attempts = self.policy.retries.max(1);
        let mut backoff = self.policy.initial_backoff;
        let mut last_error = None;

        for attempt in 1..=attempts {
            let outcome = match self.transport.get_json(url, proxy.as_ref()).await {
                Ok(body) => decode(body),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        endpoint = %url.path(),
                        attempt,
                        attempts,
                        backoff_ms = %backoff.as_millis(),
                        transient = e.is_retryable(),
                        error = %e,
                        "Request failed, retrying"
                    );
                    self.sleeper.sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                    last_error = Some(e);
                }
                Err(e) => {
                    tracing::warn!(
                        endpoint = %url.path(),
                        attempts,
                        error = %e,
                        "Request failed, retries exhausted"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AppError::Generic("request made no attempts".into())))
    }

    /// Draw the next proxy, falling back to a direct connection when the
    /// configured URI does not parse.
    fn select_proxy(&self) -> Option<Url> {
        let raw = self.proxies.next()?;
        match Url::parse(raw) {
            Ok(url) if url.has_host() => Some(url),
            Ok(_) | Err(_) => {
                tracing::warn!(
                    proxy = %raw,
                    "Invalid proxy URL, this request will proceed without a proxy"
                );
                None
            }
        }
    }
}
