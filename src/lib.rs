// Library interface for volcast
// The binary and the integration tests both go through these modules

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod forecast;
pub mod logging;
pub mod models;
pub mod proxy;
pub mod report;
pub mod volume;
pub mod week;

// Re-export commonly used types for convenience
pub use models::*;
pub use client::Vo2Client;
pub use config::AppConfig;
pub use error::{ClientError, Result, VolcastError};
pub use forecast::{project, project_from, ForecastParams, ForecastSummary};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use volume::{aggregate, primary_series, CrossTrainingVolume};
pub use week::normalize_week;
