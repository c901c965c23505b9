use thiserror::Error;

/// Application-wide error types for leadgrid.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The places API answered, but with a non-OK status envelope.
    #[error("Places API error ({status}): {message}")]
    PlacesApi { status: String, message: String },

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Upstream rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Headless browser launch or page load failed.
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// The inbound search query is unusable.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The admission controller rejected the request.
    #[error("Too many concurrent requests (limit {limit}). Please try again later.")]
    TooManySessions { limit: usize },

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) | AppError::RateLimitExceeded => true,
            AppError::PlacesApi { status, .. } => {
                // INVALID_REQUEST is what a not-yet-valid page token produces.
                matches!(
                    status.as_str(),
                    "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR" | "INVALID_REQUEST"
                )
            }
            AppError::HttpError(msg) => {
                msg.contains("timeout")
                    || msg.contains("connect")
                    || msg.contains("reset")
                    || msg.contains("HTTP 5")
            }
            _ => false,
        }
    }
}
