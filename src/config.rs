use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::events::RaceEvent;
use crate::forecast::ForecastParams;
use crate::logging::LogConfig;
use crate::models::Sport;
use crate::volume::unique_sports;

pub const ENV_API_BASE_URL: &str = "VO2_API_BASE_URL";
pub const ENV_API_KEY: &str = "VO2_API_KEY";
pub const ENV_BIND: &str = "VOLCAST_BIND";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Proxy server settings
    pub server: ServerSettings,

    /// VO2 metrics API connection
    pub upstream: UpstreamSettings,

    /// Which sports feed which chart
    pub volume: VolumeSettings,

    /// Default forecast parameters
    pub forecast: ForecastParams,

    pub logging: LogConfig,

    /// Race calendar
    pub events: Vec<RaceEvent>,
}

/// Proxy server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address
    pub bind: SocketAddr,

    /// Timeout for a single upstream request
    pub upstream_timeout_secs: u64,
}

/// Upstream API connection; both values may come from the environment
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    /// Base URL the proxied endpoint is resolved against
    pub base_url: Option<String>,

    /// Key sent as `x-vo2-api-key`; never exposed to clients
    pub api_key: Option<String>,

    /// Activity provider queried by the volume endpoints
    pub provider: String,
}

/// Sports shown on the volume charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSettings {
    /// Athlete whose volume is fetched
    pub athlete_id: Option<Uuid>,

    /// Sub-sports merged into the primary series
    pub primary_sports: Vec<Sport>,

    /// Sports shown on the cross-training chart
    pub cross_training_sports: Vec<Sport>,

    /// How far back the volume query reaches
    pub lookback_months: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            upstream_timeout_secs: 30,
        }
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        UpstreamSettings {
            base_url: None,
            api_key: None,
            provider: "strava".to_string(),
        }
    }
}

impl fmt::Debug for UpstreamSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("provider", &self.provider)
            .finish()
    }
}

impl UpstreamSettings {
    pub fn has_base_url(&self) -> bool {
        self.base_url.as_deref().is_some_and(|url| !url.trim().is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.has_base_url() && self.has_api_key()
    }
}

impl Default for VolumeSettings {
    fn default() -> Self {
        VolumeSettings {
            athlete_id: None,
            primary_sports: vec![Sport::Running, Sport::TrailRunning],
            cross_training_sports: vec![Sport::Elliptical, Sport::Cycling],
            lookback_months: 3,
        }
    }
}

impl VolumeSettings {
    /// Every sport the volume query must request, primary first, without duplicates
    pub fn requested_sports(&self) -> Vec<Sport> {
        let all: Vec<Sport> = self
            .primary_sports
            .iter()
            .chain(&self.cross_training_sports)
            .cloned()
            .collect();
        unique_sports(&all)
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML configuration: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".volcast")
            .join("config.toml")
    }

    /// Load the effective configuration.
    ///
    /// An explicit path must exist; the default path falls back to defaults
    /// when missing. Environment overrides are applied last.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    Self::load_from_file(&default_path)?
                } else {
                    tracing::debug!(path = %default_path.display(), "Config file not found, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override file values with `VO2_API_BASE_URL`, `VO2_API_KEY` and `VOLCAST_BIND`
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(base_url) = non_empty_env(ENV_API_BASE_URL) {
            self.upstream.base_url = Some(base_url);
        }

        if let Some(api_key) = non_empty_env(ENV_API_KEY) {
            self.upstream.api_key = Some(api_key);
        }

        if let Some(bind) = non_empty_env(ENV_BIND) {
            self.server.bind = bind
                .parse()
                .with_context(|| format!("{} is not a socket address: {}", ENV_BIND, bind))?;
        }

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
