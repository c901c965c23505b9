use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use leadgrid_core::error::AppError;

use crate::dto::ErrorResponse;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            AppError::TooManySessions { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorResponse {
                    error: self.0.to_string(),
                    details: None,
                },
            ),
            AppError::InvalidQuery(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Invalid query".to_string(),
                    details: Some(msg.clone()),
                },
            ),
            other => {
                tracing::error!(error = %other, "Scrape failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Scrape failed".to_string(),
                        details: Some(other.to_string()),
                    },
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
