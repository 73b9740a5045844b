/*
Proxy errors and their HTTP representation.
*/

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

pub const MISSING_CONFIG_MESSAGE: &str =
    "API configuration missing. Please set VO2_API_BASE_URL and VO2_API_KEY environment variables.";
pub const PROXY_FAILURE_MESSAGE: &str = "Failed to proxy request to API";

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Base URL or API key not configured; upstream is never contacted
    #[error("API configuration missing")]
    MissingConfiguration,

    /// Endpoint resolves outside the configured API base
    #[error("Invalid API endpoint: {0}")]
    InvalidEndpoint(String),

    /// Forwarding failed before an upstream response was read
    #[error("Failed to proxy request to API: {0}")]
    Upstream(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ProxyError::MissingConfiguration => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": MISSING_CONFIG_MESSAGE }),
            ),
            ProxyError::InvalidEndpoint(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid API endpoint", "message": message }),
            ),
            ProxyError::Upstream(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": PROXY_FAILURE_MESSAGE, "message": message }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        ProxyError::Upstream(err.to_string())
    }
}
