//! Randomised pacing between upstream calls.
//!
//! Two independent windows are used by the pipeline: a general one applied
//! after each location sweep and each detail lookup, and a wider one applied
//! before following a page token (the places API rejects a token that is
//! used immediately after it was issued).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use leadgrid_core::throttle::{DelayWindow, TokioSleeper};
//! use leadgrid_core::traits::Sleeper;
//!
//! # async fn run() {
//! let window = DelayWindow::new(Duration::from_millis(100), Duration::from_millis(500));
//! TokioSleeper.sleep(window.sample()).await;
//! # }
//! ```

use std::time::Duration;

use rand::Rng;

use crate::error::AppError;
use crate::traits::Sleeper;

/// A uniform `[min, max]` delay band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayWindow {
    pub min: Duration,
    pub max: Duration,
}

impl DelayWindow {
    /// Create a window. `min` and `max` are swapped if given in reverse.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Build a window from millisecond bounds, rejecting `min > max`.
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Result<Self, AppError> {
        if min_ms > max_ms {
            return Err(AppError::ConfigError(format!(
                "delay window min ({min_ms}ms) exceeds max ({max_ms}ms)"
            )));
        }
        Ok(Self {
            min: Duration::from_millis(min_ms),
            max: Duration::from_millis(max_ms),
        })
    }

    /// A window that never waits.
    pub fn zero() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    /// Draw one delay uniformly from the window.
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    /// General pacing default: 100-500ms.
    pub fn general() -> Self {
        Self {
            min: Duration::from_millis(100),
            max: Duration::from_millis(500),
        }
    }

    /// Page-token pacing default: 2-3s.
    pub fn page_token() -> Self {
        Self {
            min: Duration::from_millis(2000),
            max: Duration::from_millis(3000),
        }
    }
}

/// The two pacing bands used by one scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After each location sweep and each detail lookup.
    pub general: DelayWindow,
    /// Before following a page token.
    pub page_token: DelayWindow,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            general: DelayWindow::general(),
            page_token: DelayWindow::page_token(),
        }
    }
}

impl Pacing {
    /// No waiting at all, for tests and local stubs.
    pub fn none() -> Self {
        Self {
            general: DelayWindow::zero(),
            page_token: DelayWindow::zero(),
        }
    }
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Sleep for a random delay drawn from `window`.
pub async fn pace<S: Sleeper>(sleeper: &S, window: &DelayWindow) {
    let delay = window.sample();
    tracing::debug!(delay_ms = %delay.as_millis(), "Pacing");
    sleeper.sleep(delay).await;
}
