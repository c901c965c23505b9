use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use leadgrid_core::SearchQuery;

use crate::dto::{HealthResponse, ScrapeRequest, ScrapeResponse};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/scrape", post(scrape))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Scrape
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/scrape",
    request_body = ScrapeRequest,
    responses(
        (status = 200, description = "Deduplicated, enriched places", body = ScrapeResponse),
        (status = 400, description = "Invalid query", body = crate::dto::ErrorResponse),
        (status = 429, description = "Too many concurrent scrapes", body = crate::dto::ErrorResponse),
        (status = 500, description = "Scrape failed", body = crate::dto::ErrorResponse),
    ),
    tag = "scrape"
)]
pub async fn scrape(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<ScrapeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = SearchQuery::from(body);
    let report = state.service.run(&query).await?;
    Ok(axum::Json(ScrapeResponse::from(report)))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let gate = state.service.gate();
    axum::Json(HealthResponse {
        status: "ok",
        active_sessions: gate.active(),
        max_sessions: gate.ceiling(),
    })
}
