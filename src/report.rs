//! Terminal rendering of volume series and forecasts

use colored::*;
use rust_decimal::Decimal;
use tabled::{settings::Style, Table, Tabled};

use crate::events::{format_distance, RaceCountdown};
use crate::forecast::ForecastSummary;
use crate::models::{ForecastPoint, Sport, WeeklyVolumePoint, YtdVolume};
use crate::volume::CrossTrainingVolume;

/// Week-over-week change for display; `-` when there was no previous volume
pub fn format_change(change_pct: f64) -> String {
    if !change_pct.is_finite() {
        return "-".to_string();
    }
    format!("{:+.1}%", change_pct)
}

/// `1 h 30 min`, `45 min` or `2 h`
pub fn format_hours_minutes(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round() as i64;
    let whole_hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if whole_hours == 0 {
        return format!("{} min", minutes);
    }
    if minutes == 0 {
        return format!("{} h", whole_hours);
    }
    format!("{} h {} min", whole_hours, minutes)
}

fn format_km(km: Decimal) -> String {
    format!("{:.1}", km)
}

fn colorize_change(change_pct: f64) -> String {
    let text = format_change(change_pct);
    if !change_pct.is_finite() {
        text.dimmed().to_string()
    } else if change_pct > 10.0 {
        text.yellow().to_string()
    } else if change_pct < 0.0 {
        text.cyan().to_string()
    } else {
        text.green().to_string()
    }
}

#[derive(Tabled)]
struct PrimaryRow {
    #[tabled(rename = "Week")]
    week: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Distance (km)")]
    distance: String,
    #[tabled(rename = "Δ dist")]
    distance_change: String,
    #[tabled(rename = "Elevation (m)")]
    elevation: String,
    #[tabled(rename = "Δ elev")]
    elevation_change: String,
    #[tabled(rename = "Δ time")]
    time_change: String,
}

pub fn primary_table(points: &[WeeklyVolumePoint]) -> String {
    let rows = points.iter().map(|point| PrimaryRow {
        week: point.week_label.clone(),
        time: format_hours_minutes(point.time_seconds / 3600.0),
        distance: format_km(point.distance_km),
        distance_change: colorize_change(point.previous_week_distance_change_pct),
        elevation: point.elevation_m.to_string(),
        elevation_change: colorize_change(point.previous_week_elevation_change_pct),
        time_change: colorize_change(point.previous_week_time_change_pct),
    });

    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct CrossTrainingRow {
    #[tabled(rename = "Week")]
    week: String,
    #[tabled(rename = "Hours")]
    hours: String,
    #[tabled(rename = "Distance (km)")]
    distance: String,
    #[tabled(rename = "Elevation (m)")]
    elevation: String,
    #[tabled(rename = "Activities")]
    activities: u32,
}

pub fn cross_training_table(volume: &CrossTrainingVolume, sport: &Sport) -> Option<String> {
    let points = volume.series(sport)?;
    if points.is_empty() {
        return None;
    }

    let rows = points.iter().map(|point| CrossTrainingRow {
        week: point.week_label.clone(),
        hours: format_hours_minutes(point.moving_hours),
        distance: format_km(point.distance_km),
        elevation: point.elevation_m.to_string(),
        activities: point.activity_count,
    });

    Some(Table::new(rows).with(Style::rounded()).to_string())
}

#[derive(Tabled)]
struct ForecastRow {
    #[tabled(rename = "Week of")]
    week: String,
    #[tabled(rename = "Mileage (km)")]
    mileage: String,
    #[tabled(rename = "Type")]
    kind: String,
}

pub fn forecast_table(points: &[ForecastPoint]) -> String {
    let rows = points.iter().map(|point| ForecastRow {
        week: point.week_label.clone(),
        mileage: format_km(point.mileage_km),
        kind: if point.is_rest_week {
            "rest".yellow().to_string()
        } else {
            "build".to_string()
        },
    });

    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn forecast_summary_line(summary: &ForecastSummary) -> String {
    format!(
        "{} km over {} weeks, peak {} km, {} rest week(s)",
        format_km(summary.total_km),
        summary.weeks,
        format_km(summary.peak_km),
        summary.rest_weeks
    )
}

pub fn ytd_summary(ytd: &YtdVolume) -> String {
    let km = ytd.volume.total_distance_meters / 1000.0;
    let hours = (ytd.volume.total_moving_time_seconds / 3600.0).floor();
    format!(
        "{} {:.1} km   {} {} m   {} {} hrs",
        "Distance".bold(),
        km,
        "Elevation".bold(),
        ytd.volume.total_elevation_gain_meters.round(),
        "Time".bold(),
        hours
    )
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Race")]
    name: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Countdown")]
    countdown: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Elevation")]
    elevation: String,
}

pub fn events_table(countdowns: &[RaceCountdown<'_>]) -> String {
    let rows = countdowns.iter().map(|countdown| EventRow {
        name: countdown.event.name.clone(),
        date: countdown.event.date.format("%B %-d, %Y").to_string(),
        countdown: countdown.weeks_label(),
        location: countdown.event.location.clone(),
        distance: format_distance(countdown.event.distance_km),
        elevation: format!("{} m", countdown.event.elevation_gain_m),
    });

    Table::new(rows).with(Style::rounded()).to_string()
}
