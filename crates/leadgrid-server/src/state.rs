use leadgrid_client::ReqwestTransport;
use leadgrid_core::{AppError, ScrapeService, ScraperConfig, TokioSleeper};

#[cfg(feature = "browser")]
pub type Scraper = leadgrid_client::BrowserScraper;
#[cfg(not(feature = "browser"))]
pub type Scraper = leadgrid_core::NoBrowser;

pub type Service = ScrapeService<ReqwestTransport, Scraper, TokioSleeper>;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub service: Service,
}

impl AppState {
    pub fn from_config(config: &ScraperConfig) -> Result<Self, AppError> {
        let transport = ReqwestTransport::with_timeout(config.request_timeout)?;
        let service = Service::from_config(config, transport, TokioSleeper, Some(scraper(config)))?;
        Ok(Self { service })
    }
}

#[cfg(feature = "browser")]
fn scraper(config: &ScraperConfig) -> Scraper {
    leadgrid_client::BrowserScraper::with_timeout(config.browser_timeout)
}

#[cfg(not(feature = "browser"))]
fn scraper(config: &ScraperConfig) -> Scraper {
    if config.fallback_scraping {
        tracing::warn!(
            "FALLBACK_SCRAPING_ENABLED is set but this build lacks the `browser` feature; \
             fallback scrapes will report an error"
        );
    }
    leadgrid_core::NoBrowser
}
