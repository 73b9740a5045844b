//! Unified error hierarchy for volcast
//!
//! The aggregation and forecast core never fails; errors come from the
//! surrounding configuration, upstream client and proxy layers.

use thiserror::Error;

/// Top-level error type for all volcast operations
#[derive(Debug, Error)]
pub enum VolcastError {
    /// Upstream API errors
    #[error("Upstream API error: {0}")]
    Client(#[from] ClientError),

    /// Input data could not be decoded
    #[error("Invalid input data: {0}")]
    InvalidInput(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors talking to the VO2 metrics API
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base URL or API key not configured
    #[error("API configuration missing: {field}")]
    MissingConfig { field: String },

    /// Base URL or endpoint could not be combined into a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport failure or undecodable body
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("{message}")]
    Status { status: u16, message: String },
}

/// Result type alias for volcast operations
pub type Result<T> = std::result::Result<T, VolcastError>;

impl VolcastError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            VolcastError::Client(ClientError::Transport(err)) => err.is_timeout() || err.is_connect(),
            VolcastError::Client(ClientError::Status { status, .. }) => *status >= 500,
            VolcastError::Io(_) => true,
            _ => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            VolcastError::InvalidInput(_) => ErrorSeverity::Warning,
            VolcastError::Client(ClientError::Status { status, .. }) if *status < 500 => {
                ErrorSeverity::Warning
            }
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            VolcastError::Client(ClientError::MissingConfig { field }) => format!(
                "The metrics API is not configured ({} missing). Set VO2_API_BASE_URL and VO2_API_KEY or add them to the config file.",
                field
            ),
            VolcastError::Client(ClientError::Transport(err)) if err.is_connect() => {
                "Unable to reach the metrics API. Please check the base URL and your connection.".to_string()
            }
            VolcastError::InvalidInput(err) => {
                format!("Volume data is not in the expected format: {}", err)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}
