//! Per-place detail lookup and the optional fallback page scrape.

use crate::models::{FallbackData, PlaceRecord, RetryContext, RetryLog};
use crate::places::PlacesGateway;
use crate::throttle::{Pacing, pace};
use crate::traits::{PageScraper, Sleeper, Transport};

/// Run the fallback scraper against `url`, folding failure into the result.
pub async fn scrape_fallback<P: PageScraper>(scraper: &P, url: &str) -> FallbackData {
    tracing::info!(%url, "Running fallback scrape");
    match scraper.scrape(url).await {
        Ok(signals) => {
            tracing::info!(
                %url,
                emails = signals.emails.len(),
                social = signals.social_media.len(),
                "Fallback scrape finished"
            );
            FallbackData::Contacts(signals)
        }
        Err(e) => {
            tracing::error!(%url, error = %e, "Fallback scrape failed");
            FallbackData::Failed {
                error: e.to_string(),
            }
        }
    }
}

/// Attach details (and, when `scraper` is set, fallback contact data) to
/// every record, one place at a time.
///
/// A failed detail lookup is recorded in `log` and the place is kept with its
/// search fields only. The fallback scrape runs for places whose details
/// report a website.
pub async fn enrich_places<T, S, P>(
    gateway: &PlacesGateway<T, S>,
    scraper: Option<&P>,
    sleeper: &S,
    pacing: &Pacing,
    records: Vec<PlaceRecord>,
    log: &mut RetryLog,
) -> Vec<PlaceRecord>
where
    T: Transport,
    S: Sleeper,
    P: PageScraper,
{
    let mut enriched = Vec::with_capacity(records.len());

    for mut record in records {
        match gateway.place_details(record.place_id()).await {
            Ok(details) => record.details = details,
            Err(e) => {
                tracing::error!(
                    place_id = %record.place_id(),
                    error = %e,
                    "Failed to get details after all retries"
                );
                log.record(
                    RetryContext::Place {
                        place_id: record.place_id().to_string(),
                    },
                    &e,
                );
            }
        }

        if let Some(scraper) = scraper
            && let Some(website) = record.website().map(str::to_owned)
        {
            record.fallback = Some(scrape_fallback(scraper, &website).await);
        }

        enriched.push(record);
        pace(sleeper, &pacing.general).await;
    }

    enriched
}
