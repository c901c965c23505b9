use serde::{Deserialize, Serialize};

use leadgrid_core::models::{
    DEFAULT_RADIUS_METERS, FormattedPlace, RetryLogEntry, ScrapeReport, SearchQuery,
};

// ---------------------------------------------------------------------------
// Scrape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ScrapeRequest {
    /// City to search in, e.g. "Delhi"
    pub city: String,
    /// Search keyword, e.g. "dentist"
    pub keyword: String,
    /// Optional sub-areas of the city, each geocoded separately
    #[serde(default)]
    pub areas: Vec<String>,
    /// Search radius in meters (default 50000)
    pub radius: Option<f64>,
}

impl From<ScrapeRequest> for SearchQuery {
    fn from(req: ScrapeRequest) -> Self {
        SearchQuery::new(req.city, req.keyword)
            .with_areas(req.areas)
            .with_radius(req.radius.unwrap_or(DEFAULT_RADIUS_METERS))
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ScrapeResponse {
    pub total_results: usize,
    #[schema(value_type = Vec<Object>)]
    pub results: Vec<FormattedPlace>,
    #[schema(value_type = Vec<Object>)]
    pub retry_logs: Vec<RetryLogEntry>,
}

impl From<ScrapeReport> for ScrapeResponse {
    fn from(report: ScrapeReport) -> Self {
        Self {
            total_results: report.total_results,
            results: report.results,
            retry_logs: report.retry_logs,
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub active_sessions: usize,
    pub max_sessions: usize,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
