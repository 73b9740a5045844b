use chrono::{Duration, Local, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::ForecastPoint;
use crate::week::format_week_label;

pub const MAX_WEEKS_AHEAD: u32 = 24;
pub const MAX_WEEKLY_INCREASE_PCT: f64 = 50.0;
pub const MAX_REST_FREQUENCY: u32 = 12;

/// Tunable forecast parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastParams {
    /// Number of weeks to project (1-24)
    pub weeks_ahead: u32,

    /// Compounding growth applied to each build week, in percent (0-50)
    pub weekly_increase_pct: f64,

    /// Build weeks between rest weeks (0-12, 0 disables rest weeks)
    pub rest_frequency: u32,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            weeks_ahead: 8,
            weekly_increase_pct: 5.0,
            rest_frequency: 3,
        }
    }
}

impl ForecastParams {
    /// Clamp every parameter into its supported range
    pub fn clamped(&self) -> Self {
        let weekly_increase_pct = if self.weekly_increase_pct.is_nan() {
            0.0
        } else {
            self.weekly_increase_pct.clamp(0.0, MAX_WEEKLY_INCREASE_PCT)
        };

        Self {
            weeks_ahead: self.weeks_ahead.clamp(1, MAX_WEEKS_AHEAD),
            weekly_increase_pct,
            rest_frequency: self.rest_frequency.min(MAX_REST_FREQUENCY),
        }
    }

    /// Whether forecast week `week` (1-based) is a rest week
    pub fn is_rest_week(&self, week: u32) -> bool {
        self.rest_frequency > 0 && week % (self.rest_frequency + 1) == 0
    }
}

/// Project weekly mileage from the latest completed week.
///
/// `last_week_start` is an ISO date; if it does not parse the projection
/// starts from today. See [`project_from`].
pub fn project(baseline_km: f64, last_week_start: &str, params: &ForecastParams) -> Vec<ForecastPoint> {
    let start = NaiveDate::parse_from_str(last_week_start, "%Y-%m-%d").unwrap_or_else(|_| {
        tracing::debug!(last_week_start, "Unparseable forecast start, using today");
        Local::now().date_naive()
    });
    project_from(baseline_km, start, params)
}

/// Project weekly mileage starting the week after `last_week_start`.
///
/// Build weeks compound the previous build week's mileage and are rounded to
/// one decimal. Rest weeks are emitted with zero mileage and leave the
/// compounding chain untouched. A baseline that is not a positive finite
/// number yields no forecast.
pub fn project_from(baseline_km: f64, last_week_start: NaiveDate, params: &ForecastParams) -> Vec<ForecastPoint> {
    if !baseline_km.is_finite() || baseline_km <= 0.0 {
        return Vec::new();
    }
    let Some(baseline) = Decimal::from_f64(baseline_km) else {
        return Vec::new();
    };

    let params = params.clamped();
    let growth = Decimal::ONE
        + Decimal::from_f64(params.weekly_increase_pct).unwrap_or(Decimal::ZERO) / Decimal::ONE_HUNDRED;

    let mut current = baseline;
    let mut points = Vec::with_capacity(params.weeks_ahead as usize);

    for week in 1..=params.weeks_ahead {
        let week_start = last_week_start + Duration::weeks(week as i64);

        if params.is_rest_week(week) {
            points.push(ForecastPoint {
                week_label: format_week_label(week_start),
                week_start,
                mileage_km: Decimal::ZERO,
                is_rest_week: true,
            });
            continue;
        }

        current = (current * growth).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        points.push(ForecastPoint {
            week_label: format_week_label(week_start),
            week_start,
            mileage_km: current,
            is_rest_week: false,
        });
    }

    points
}

/// Aggregate figures over a projected block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    /// Sum of all projected weeks, rest weeks included
    #[serde(with = "rust_decimal::serde::float")]
    pub total_km: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub peak_km: Decimal,

    pub rest_weeks: u32,

    pub weeks: u32,
}

impl ForecastSummary {
    pub fn from_points(points: &[ForecastPoint]) -> Self {
        Self {
            total_km: points.iter().map(|p| p.mileage_km).sum(),
            peak_km: points.iter().map(|p| p.mileage_km).max().unwrap_or(Decimal::ZERO),
            rest_weeks: points.iter().filter(|p| p.is_rest_week).count() as u32,
            weeks: points.len() as u32,
        }
    }
}
