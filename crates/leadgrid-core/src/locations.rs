//! Turning a search query into the coordinates to sweep.

use crate::grid::generate_grid;
use crate::models::{Coordinate, RetryContext, RetryLog, SearchQuery};
use crate::places::PlacesGateway;
use crate::traits::{Sleeper, Transport};

/// How search coordinates are derived from a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationMode {
    /// Geocode the city once and search a ring of `points` around it.
    Grid { points: usize },
    /// Geocode each `keyword area city` (or `keyword city`) independently.
    Areas,
}

/// Address strings geocoded in [`LocationMode::Areas`].
pub fn area_queries(query: &SearchQuery) -> Vec<String> {
    let areas: Vec<&str> = query
        .areas
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect();

    if areas.is_empty() {
        vec![format!("{} {}", query.keyword, query.city)]
    } else {
        areas
            .into_iter()
            .map(|area| format!("{} {} {}", query.keyword, area, query.city))
            .collect()
    }
}

/// Resolve the coordinates to search. Geocoding misses and failures are
/// tolerated: the pipeline continues with whatever resolved.
pub async fn resolve_locations<T: Transport, S: Sleeper>(
    gateway: &PlacesGateway<T, S>,
    mode: LocationMode,
    query: &SearchQuery,
    log: &mut RetryLog,
) -> Vec<Coordinate> {
    match mode {
        LocationMode::Grid { points } => {
            tracing::info!(city = %query.city, points, "Grid search enabled, generating grid");
            match gateway.geocode(&query.city).await {
                Ok(Some(center)) => {
                    let grid = generate_grid(center.lat, center.lon, query.radius, points);
                    tracing::info!(points = grid.len(), "Generated grid points");
                    grid
                }
                Ok(None) => {
                    tracing::warn!(city = %query.city, "Could not find location to generate grid");
                    Vec::new()
                }
                Err(e) => {
                    tracing::error!(city = %query.city, error = %e, "Geocoding failed");
                    log.record(
                        RetryContext::Query {
                            query: query.city.clone(),
                        },
                        &e,
                    );
                    Vec::new()
                }
            }
        }
        LocationMode::Areas => {
            let mut locations = Vec::new();
            for address in area_queries(query) {
                match gateway.geocode(&address).await {
                    Ok(Some(location)) => locations.push(location),
                    Ok(None) => {
                        tracing::warn!(query = %address, "Location not found");
                    }
                    Err(e) => {
                        tracing::error!(query = %address, error = %e, "Geocoding failed");
                        log.record(RetryContext::Query { query: address }, &e);
                    }
                }
            }
            locations
        }
    }
}
