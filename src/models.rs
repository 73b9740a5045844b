use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Sport names as reported by the upstream metrics API
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sport {
    Running,
    TrailRunning,
    Cycling,
    Elliptical,
    /// Any sport name the API reports that has no dedicated variant
    Other(String),
}

impl Sport {
    pub fn as_str(&self) -> &str {
        match self {
            Sport::Running => "running",
            Sport::TrailRunning => "trail-running",
            Sport::Cycling => "cycling",
            Sport::Elliptical => "elliptical",
            Sport::Other(name) => name,
        }
    }

    /// Human readable name for chart legends and tables
    pub fn display_name(&self) -> String {
        match self {
            Sport::Running => "Running".to_string(),
            Sport::TrailRunning => "Trail running".to_string(),
            Sport::Cycling => "Cycling".to_string(),
            Sport::Elliptical => "Elliptical".to_string(),
            Sport::Other(name) => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

impl From<String> for Sport {
    fn from(name: String) -> Self {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "running" => Sport::Running,
            "trail-running" => Sport::TrailRunning,
            "cycling" => Sport::Cycling,
            "elliptical" => Sport::Elliptical,
            _ => Sport::Other(name),
        }
    }
}

impl From<Sport> for String {
    fn from(sport: Sport) -> Self {
        sport.as_str().to_string()
    }
}

impl FromStr for Sport {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Sport::from(s.to_string()))
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated activity totals for one sport over one reporting period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPeriodSummary {
    /// ISO week (`2024-W03`) or ISO date (`2024-01-15`)
    pub period: String,

    /// Number of activities recorded in the period
    pub activity_count: u32,

    /// Total distance in meters
    pub total_distance_meters: f64,

    /// Total elapsed time in seconds
    pub total_elapsed_time_seconds: f64,

    /// Total moving time in seconds
    pub total_moving_time_seconds: f64,

    /// Total elevation gain in meters
    pub total_elevation_gain_meters: f64,
}

/// Period summaries grouped by sport, as returned by the volume endpoint
pub type VolumeBySport = BTreeMap<Sport, Vec<ActivityPeriodSummary>>;

/// Body of `GET /athletes/{id}/metrics/volume`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeResponse {
    pub data: VolumeBySport,
    pub frequency: String,
    pub provider: String,
    pub sports: Vec<Sport>,
    pub start_date: String,
    pub user_id: String,
}

/// Running totals since January 1st
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteTotalVolume {
    pub total_distance_meters: f64,
    pub total_moving_time_seconds: f64,
    pub total_elevation_gain_meters: f64,
}

/// Body of `GET /athletes/{id}/metrics/running-ytd-volume`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtdVolume {
    pub athlete_id: String,
    pub volume: AthleteTotalVolume,
}

/// Canonical week identity: a display label and the Monday the week starts on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekKey {
    /// Short label such as `Jan 15`
    pub label: String,

    /// Monday of the ISO week, serialized as `YYYY-MM-DD`
    #[serde(rename = "weekStartISO")]
    pub week_start: NaiveDate,
}

/// Per-sport totals for a single week
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTotals {
    pub moving_seconds: f64,
    pub distance_meters: f64,
    pub elevation_meters: f64,
    pub activity_count: u32,
}

impl WeeklyTotals {
    pub fn add_summary(&mut self, summary: &ActivityPeriodSummary) {
        self.moving_seconds += summary.total_moving_time_seconds;
        self.distance_meters += summary.total_distance_meters;
        self.elevation_meters += summary.total_elevation_gain_meters;
        self.activity_count += summary.activity_count;
    }

    pub fn merge(&mut self, other: &WeeklyTotals) {
        self.moving_seconds += other.moving_seconds;
        self.distance_meters += other.distance_meters;
        self.elevation_meters += other.elevation_meters;
        self.activity_count += other.activity_count;
    }
}

/// One week of the primary sport with week-over-week changes.
///
/// A change of `f64::INFINITY` means the previous week had no volume for that
/// metric; it serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyVolumePoint {
    pub week_label: String,
    #[serde(rename = "weekStartISO")]
    pub week_start: NaiveDate,
    pub time_seconds: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub distance_km: Decimal,
    pub elevation_m: i64,
    pub previous_week_time_change_pct: f64,
    pub previous_week_distance_change_pct: f64,
    pub previous_week_elevation_change_pct: f64,
}

/// One week of a cross-training sport
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossTrainingPoint {
    pub week_label: String,
    #[serde(rename = "weekStartISO")]
    pub week_start: NaiveDate,
    pub moving_hours: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub distance_km: Decimal,
    pub elevation_m: i64,
    pub activity_count: u32,
}

/// Stacked cross-training hours for one week
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewPoint {
    pub week_label: String,
    #[serde(rename = "weekStartISO")]
    pub week_start: NaiveDate,
    pub total_hours: f64,
    pub hours_by_sport: BTreeMap<Sport, f64>,
}

/// A projected week in the mileage forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub week_label: String,
    #[serde(rename = "weekStartISO")]
    pub week_start: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub mileage_km: Decimal,
    pub is_rest_week: bool,
}
