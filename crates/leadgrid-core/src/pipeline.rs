use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::admission::SessionGate;
use crate::aggregate::collect_places;
use crate::config::ScraperConfig;
use crate::enrich::enrich_places;
use crate::error::AppError;
use crate::executor::ResilientExecutor;
use crate::format::format_places;
use crate::locations::{LocationMode, resolve_locations};
use crate::models::{RetryLog, ScrapeReport, SearchQuery};
use crate::places::{PlacesEndpoints, PlacesGateway};
use crate::throttle::Pacing;
use crate::traits::{PageScraper, Sleeper, Transport};

/// Orchestrates one scrape: admit → resolve → collect → enrich → format.
///
/// Generic over the outbound transport, the fallback page scraper, and the
/// sleeper so the whole pipeline runs in tests without network, browser, or
/// wall-clock delay. Stages run sequentially within a request; concurrent
/// requests are bounded by the shared [`SessionGate`].
pub struct ScrapeService<T, P, S> {
    gateway: PlacesGateway<T, S>,
    sleeper: S,
    scraper: Option<P>,
    gate: SessionGate,
    pacing: Pacing,
    mode: LocationMode,
    max_results: usize,
}

impl<T, P, S> ScrapeService<T, P, S>
where
    T: Transport,
    P: PageScraper,
    S: Sleeper,
{
    /// Wire a service from configuration.
    ///
    /// `scraper` is only kept when fallback scraping is enabled.
    pub fn from_config(
        config: &ScraperConfig,
        transport: T,
        sleeper: S,
        scraper: Option<P>,
    ) -> Result<Self, AppError> {
        let endpoints = PlacesEndpoints::new(&config.base_url, config.api_key.clone())?;
        let executor = ResilientExecutor::new(
            transport,
            sleeper.clone(),
            config.retry,
            Arc::new(config.proxy_rotator()),
        );

        Ok(Self {
            gateway: PlacesGateway::new(executor, endpoints),
            sleeper,
            scraper: scraper.filter(|_| config.fallback_scraping),
            gate: SessionGate::new(config.max_concurrent_sessions),
            pacing: config.pacing,
            mode: config.location_mode(),
            max_results: config.max_results,
        })
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn mode(&self) -> LocationMode {
        self.mode
    }

    pub fn fallback_enabled(&self) -> bool {
        self.scraper.is_some()
    }

    /// Run a full scrape for `query`.
    ///
    /// Fails fast with [`AppError::InvalidQuery`] or
    /// [`AppError::TooManySessions`] before any upstream call. Once admitted,
    /// per-item failures land in the report's retry log rather than failing
    /// the request.
    pub async fn run(&self, query: &SearchQuery) -> Result<ScrapeReport, AppError> {
        query.validate()?;

        let _permit = self.gate.try_acquire().inspect_err(|_| {
            tracing::warn!(
                limit = self.gate.ceiling(),
                "Rejecting scrape, session limit reached"
            );
        })?;

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "scrape",
            %request_id,
            city = %query.city,
            keyword = %query.keyword
        );

        self.pipeline(query).instrument(span).await
    }

    async fn pipeline(&self, query: &SearchQuery) -> Result<ScrapeReport, AppError> {
        let mut log = RetryLog::new();

        let locations = resolve_locations(&self.gateway, self.mode, query, &mut log).await;
        tracing::info!(locations = locations.len(), "Resolved search locations");

        let places = collect_places(
            &self.gateway,
            &self.sleeper,
            &self.pacing,
            &locations,
            query,
            self.max_results,
            &mut log,
        )
        .await;
        tracing::info!(unique = places.len(), "Collected places, fetching details");

        let records = enrich_places(
            &self.gateway,
            self.scraper.as_ref(),
            &self.sleeper,
            &self.pacing,
            places.into_records(),
            &mut log,
        )
        .await;

        let results = format_places(&records, self.gateway.endpoints());
        tracing::info!(
            total = results.len(),
            retry_logs = log.len(),
            "Scrape complete"
        );

        Ok(ScrapeReport {
            total_results: results.len(),
            results,
            retry_logs: log.into_entries(),
        })
    }
}
