//! Paginated nearby-search and the identity-keyed dedup map.

use std::collections::HashMap;

use crate::models::{Coordinate, PlaceRecord, PlaceSummary, RetryContext, RetryLog, SearchQuery};
use crate::places::PlacesGateway;
use crate::throttle::{Pacing, pace};
use crate::traits::{Sleeper, Transport};

/// Default ceiling on unique places per scrape.
pub const DEFAULT_MAX_RESULTS: usize = 120;

/// What happened when a search result was offered to the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First sighting; stored as the canonical record.
    Inserted,
    /// Already known; the canonical record is now flagged as a duplicate.
    Duplicate,
    /// New place, but the cap has been reached.
    Full,
    /// The result carried no place id.
    Skipped,
}

/// Insertion-ordered, place-id-keyed record store with a hard size cap.
#[derive(Debug, Clone)]
pub struct PlaceAggregator {
    records: Vec<PlaceRecord>,
    index: HashMap<String, usize>,
    cap: usize,
}

impl PlaceAggregator {
    pub fn new(cap: usize) -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            cap,
        }
    }

    pub fn observe(&mut self, summary: PlaceSummary) -> Observation {
        if summary.place_id.is_empty() {
            return Observation::Skipped;
        }
        if let Some(&i) = self.index.get(&summary.place_id) {
            self.records[i].is_duplicate = true;
            return Observation::Duplicate;
        }
        if self.is_full() {
            return Observation::Full;
        }
        self.index
            .insert(summary.place_id.clone(), self.records.len());
        self.records.push(PlaceRecord::new(summary));
        Observation::Inserted
    }

    pub fn get(&self, place_id: &str) -> Option<&PlaceRecord> {
        self.index.get(place_id).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.cap
    }

    pub fn records(&self) -> &[PlaceRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PlaceRecord> {
        self.records
    }
}

/// Sweep every location with nearby-search, following page tokens, into one
/// deduplicated set.
///
/// A failed page ends pagination for that location only and is recorded in
/// `log`. Once the cap is reached no further pages or locations are fetched.
pub async fn collect_places<T: Transport, S: Sleeper>(
    gateway: &PlacesGateway<T, S>,
    sleeper: &S,
    pacing: &Pacing,
    locations: &[Coordinate],
    query: &SearchQuery,
    max_results: usize,
    log: &mut RetryLog,
) -> PlaceAggregator {
    let mut places = PlaceAggregator::new(max_results);

    for (i, location) in locations.iter().enumerate() {
        if places.is_full() {
            tracing::info!(
                skipped = locations.len() - i,
                "Result cap of {max_results} reached, skipping remaining locations"
            );
            break;
        }

        tracing::info!(lat = location.lat, lng = location.lon, "Searching location");
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = match gateway
                .nearby_search(location, query.radius, &query.keyword, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(
                        lat = location.lat,
                        lng = location.lon,
                        error = %e,
                        "Nearby search failed"
                    );
                    log.record(
                        RetryContext::Location {
                            location: *location,
                        },
                        &e,
                    );
                    break;
                }
            };

            pages += 1;
            let mut inserted = 0usize;
            let mut duplicates = 0usize;
            for summary in page.results {
                match places.observe(summary) {
                    Observation::Inserted => inserted += 1,
                    Observation::Duplicate => duplicates += 1,
                    Observation::Full | Observation::Skipped => {}
                }
            }
            tracing::debug!(page = pages, inserted, duplicates, total = places.len(), "Page merged");

            page_token = page.next_page_token;
            if page_token.is_none() || places.is_full() {
                break;
            }
            pace(sleeper, &pacing.page_token).await;
        }

        pace(sleeper, &pacing.general).await;
    }

    places
}
