pub mod admission;
pub mod aggregate;
pub mod config;
pub mod enrich;
pub mod error;
pub mod executor;
pub mod format;
pub mod grid;
pub mod locations;
pub mod models;
pub mod pipeline;
pub mod places;
pub mod proxy;
pub mod throttle;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use admission::{SessionGate, SessionPermit};
pub use config::ScraperConfig;
pub use error::AppError;
pub use executor::{ResilientExecutor, RetryPolicy};
pub use grid::generate_grid;
pub use locations::LocationMode;
pub use models::{
    ContactSignals, Coordinate, FallbackData, FormattedPlace, RetryLogEntry, ScrapeReport,
    SearchQuery,
};
pub use pipeline::ScrapeService;
pub use proxy::ProxyRotator;
pub use throttle::{DelayWindow, Pacing, TokioSleeper};
pub use traits::{NoBrowser, PageScraper, Sleeper, Transport};
