use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::aggregate::DEFAULT_MAX_RESULTS;
use crate::error::AppError;
use crate::executor::RetryPolicy;
use crate::locations::LocationMode;
use crate::places::DEFAULT_BASE_URL;
use crate::proxy::{self, ProxyRotator};
use crate::throttle::{DelayWindow, Pacing};

/// Runtime configuration for the scrape pipeline and its front ends.
#[derive(Clone)]
pub struct ScraperConfig {
    pub api_key: String,
    pub base_url: String,
    pub proxies: Vec<String>,
    pub retry: RetryPolicy,
    pub pacing: Pacing,
    pub grid_search: bool,
    pub grid_points: usize,
    pub fallback_scraping: bool,
    pub max_concurrent_sessions: usize,
    pub max_results: usize,
    pub request_timeout: Duration,
    pub browser_timeout: Duration,
    pub port: u16,
}

impl fmt::Debug for ScraperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScraperConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("proxies", &self.proxies.len())
            .field("retry", &self.retry)
            .field("pacing", &self.pacing)
            .field("grid_search", &self.grid_search)
            .field("grid_points", &self.grid_points)
            .field("fallback_scraping", &self.fallback_scraping)
            .field("max_concurrent_sessions", &self.max_concurrent_sessions)
            .field("max_results", &self.max_results)
            .field("request_timeout", &self.request_timeout)
            .field("browser_timeout", &self.browser_timeout)
            .field("port", &self.port)
            .finish()
    }
}

impl ScraperConfig {
    /// Read configuration from process environment variables.
    ///
    /// - `GOOGLE_API_KEY` (required)
    /// - `PLACES_API_BASE_URL`, `PROXIES`
    /// - `MAX_RETRIES`, `INITIAL_BACKOFF` (ms)
    /// - `MIN_DELAY`/`MAX_DELAY`, `PAGE_TOKEN_MIN_DELAY`/`PAGE_TOKEN_MAX_DELAY` (ms)
    /// - `GRID_SEARCH_ENABLED`, `GRID_POINTS`
    /// - `FALLBACK_SCRAPING_ENABLED`
    /// - `MAX_CONCURRENT_SESSIONS`, `MAX_RESULTS`
    /// - `REQUEST_TIMEOUT_SECS`, `BROWSER_TIMEOUT_SECS`
    /// - `PORT`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let api_key = var("GOOGLE_API_KEY").filter(|k| !k.is_empty()).ok_or_else(|| {
            AppError::ConfigError("GOOGLE_API_KEY not set. Required for places API access.".into())
        })?;

        let base_url = var("PLACES_API_BASE_URL")
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let proxies = var("PROXIES").map(|raw| proxy::parse_pool(&raw)).unwrap_or_default();

        let retry = RetryPolicy {
            retries: at_least_one(&var, "MAX_RETRIES", 3u32)?,
            initial_backoff: Duration::from_millis(parse_or(&var, "INITIAL_BACKOFF", 1000u64)?),
        };

        let pacing = Pacing {
            general: DelayWindow::from_millis(
                parse_or(&var, "MIN_DELAY", 100)?,
                parse_or(&var, "MAX_DELAY", 500)?,
            )?,
            page_token: DelayWindow::from_millis(
                parse_or(&var, "PAGE_TOKEN_MIN_DELAY", 2000)?,
                parse_or(&var, "PAGE_TOKEN_MAX_DELAY", 3000)?,
            )?,
        };

        Ok(Self {
            api_key,
            base_url,
            proxies,
            retry,
            pacing,
            grid_search: flag(&var, "GRID_SEARCH_ENABLED")?,
            grid_points: at_least_one(&var, "GRID_POINTS", 8usize)?,
            fallback_scraping: flag(&var, "FALLBACK_SCRAPING_ENABLED")?,
            max_concurrent_sessions: at_least_one(&var, "MAX_CONCURRENT_SESSIONS", 5usize)?,
            max_results: at_least_one(&var, "MAX_RESULTS", DEFAULT_MAX_RESULTS)?,
            request_timeout: Duration::from_secs(at_least_one(&var, "REQUEST_TIMEOUT_SECS", 30u64)?),
            browser_timeout: Duration::from_secs(at_least_one(&var, "BROWSER_TIMEOUT_SECS", 30u64)?),
            port: parse_or(&var, "PORT", 3000u16)?,
        })
    }

    pub fn location_mode(&self) -> LocationMode {
        if self.grid_search {
            LocationMode::Grid {
                points: self.grid_points,
            }
        } else {
            LocationMode::Areas
        }
    }

    pub fn proxy_rotator(&self) -> ProxyRotator {
        ProxyRotator::new(self.proxies.clone())
    }
}

fn parse_or<T, V>(var: &V, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    V: Fn(&str) -> Option<String>,
{
    match var(key).filter(|raw| !raw.is_empty()) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::ConfigError(format!("Invalid {key} '{raw}': expected a number"))),
    }
}

fn at_least_one<T, V>(var: &V, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr + PartialOrd + From<u8>,
    V: Fn(&str) -> Option<String>,
{
    let value = parse_or(var, key, default)?;
    if value < T::from(1) {
        return Err(AppError::ConfigError(format!("{key} must be at least 1")));
    }
    Ok(value)
}

fn flag<V>(var: &V, key: &str) -> Result<bool, AppError>
where
    V: Fn(&str) -> Option<String>,
{
    let Some(raw) = var(key).filter(|raw| !raw.is_empty()) else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::ConfigError(format!(
            "Invalid {key} '{raw}': expected true/false"
        ))),
    }
}
