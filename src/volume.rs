//! Weekly training volume aggregation
//!
//! Turns per-period summaries grouped by sport into week-aligned series:
//! a primary series (optionally merged from several sub-sports) carrying
//! week-over-week changes, and per-sport cross-training series sharing one
//! week domain.

use chrono::{Local, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{
    CrossTrainingPoint, OverviewPoint, Sport, VolumeBySport, WeekKey, WeeklyTotals,
    WeeklyVolumePoint,
};
use crate::week::normalize_week_on;

/// Series for one cross-training sport
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SportSeries {
    pub sport: Sport,
    pub points: Vec<CrossTrainingPoint>,
}

/// Output of a cross-training aggregation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossTrainingVolume {
    /// Stacked hours per week across every tracked sport
    pub overall: Vec<OverviewPoint>,

    /// One series per tracked sport, in tracking order
    pub per_sport: Vec<SportSeries>,
}

impl CrossTrainingVolume {
    pub fn series(&self, sport: &Sport) -> Option<&[CrossTrainingPoint]> {
        self.per_sport
            .iter()
            .find(|series| &series.sport == sport)
            .map(|series| series.points.as_slice())
    }

    /// First tracked sport with any recorded moving time
    pub fn first_sport_with_data(&self) -> Option<&Sport> {
        self.per_sport
            .iter()
            .find(|series| series.points.iter().any(|p| p.moving_hours > 0.0))
            .map(|series| &series.sport)
    }

    pub fn is_empty(&self) -> bool {
        self.overall.is_empty()
    }
}

/// Accumulated totals for one week, one slot per tracked sport
#[derive(Debug, Clone)]
struct WeekBucket {
    label: String,
    totals: Vec<WeeklyTotals>,
}

/// Week buckets keyed (and therefore ordered) by week start
struct WeekTable {
    weeks: BTreeMap<NaiveDate, WeekBucket>,
    sport_count: usize,
}

impl WeekTable {
    fn new(sport_count: usize) -> Self {
        Self {
            weeks: BTreeMap::new(),
            sport_count,
        }
    }

    fn ensure_week(&mut self, key: &WeekKey) -> &mut WeekBucket {
        let sport_count = self.sport_count;
        self.weeks.entry(key.week_start).or_insert_with(|| WeekBucket {
            label: key.label.clone(),
            totals: vec![WeeklyTotals::default(); sport_count],
        })
    }

    fn accumulate(&mut self, volume: &VolumeBySport, sports: &[Sport], today: NaiveDate) {
        for (index, sport) in sports.iter().enumerate() {
            let Some(entries) = volume.get(sport) else {
                continue;
            };

            for entry in entries {
                let key = normalize_week_on(&entry.period, today);
                let bucket = self.ensure_week(&key);
                bucket.totals[index].add_summary(entry);
                bucket.label = key.label;
            }
        }
    }
}

/// Sports in their given order with repeats dropped
pub fn unique_sports(sports: &[Sport]) -> Vec<Sport> {
    let mut unique: Vec<Sport> = Vec::with_capacity(sports.len());
    for sport in sports {
        if !unique.contains(sport) {
            unique.push(sport.clone());
        }
    }
    unique
}

/// Aggregate cross-training sports using today's date for malformed periods.
pub fn aggregate(
    volume: &VolumeBySport,
    tracked_sports: &[Sport],
    reference_weeks: &[WeekKey],
) -> CrossTrainingVolume {
    aggregate_on(volume, tracked_sports, reference_weeks, Local::now().date_naive())
}

/// Aggregate cross-training sports into a shared weekly domain.
///
/// Every week referenced by a tracked sport or by `reference_weeks` appears in
/// every output series; weeks without activity carry zero totals. A tracked
/// sport with no input records produces an empty series.
pub fn aggregate_on(
    volume: &VolumeBySport,
    tracked_sports: &[Sport],
    reference_weeks: &[WeekKey],
    today: NaiveDate,
) -> CrossTrainingVolume {
    let tracked_sports = unique_sports(tracked_sports);
    let mut table = WeekTable::new(tracked_sports.len());
    table.accumulate(volume, &tracked_sports, today);

    for key in reference_weeks {
        table.ensure_week(key);
    }

    let overall = table
        .weeks
        .iter()
        .map(|(week_start, bucket)| {
            let hours_by_sport: BTreeMap<Sport, f64> = tracked_sports
                .iter()
                .zip(&bucket.totals)
                .map(|(sport, totals)| (sport.clone(), seconds_to_hours(totals.moving_seconds)))
                .collect();

            OverviewPoint {
                week_label: bucket.label.clone(),
                week_start: *week_start,
                total_hours: hours_by_sport.values().sum(),
                hours_by_sport,
            }
        })
        .collect();

    let per_sport = tracked_sports
        .iter()
        .enumerate()
        .map(|(index, sport)| {
            let has_input = volume.get(sport).is_some_and(|entries| !entries.is_empty());
            let points = if has_input {
                table
                    .weeks
                    .iter()
                    .map(|(week_start, bucket)| cross_training_point(*week_start, bucket, index))
                    .collect()
            } else {
                Vec::new()
            };

            SportSeries {
                sport: sport.clone(),
                points,
            }
        })
        .collect();

    tracing::debug!(
        sports = tracked_sports.len(),
        weeks = table.weeks.len(),
        "Aggregated cross-training volume"
    );

    CrossTrainingVolume { overall, per_sport }
}

fn cross_training_point(week_start: NaiveDate, bucket: &WeekBucket, index: usize) -> CrossTrainingPoint {
    let totals = &bucket.totals[index];
    CrossTrainingPoint {
        week_label: bucket.label.clone(),
        week_start,
        moving_hours: seconds_to_hours(totals.moving_seconds),
        distance_km: meters_to_km(totals.distance_meters),
        elevation_m: round_meters(totals.elevation_meters),
        activity_count: totals.activity_count,
    }
}

/// Build the primary series using today's date for malformed periods.
pub fn primary_series(volume: &VolumeBySport, primary_sports: &[Sport]) -> Vec<WeeklyVolumePoint> {
    primary_series_on(volume, primary_sports, Local::now().date_naive())
}

/// Build the primary series with week-over-week changes.
///
/// All `primary_sports` are merged into one signal by summing their totals
/// per week. Weeks are ascending; the first week reports zero change.
pub fn primary_series_on(
    volume: &VolumeBySport,
    primary_sports: &[Sport],
    today: NaiveDate,
) -> Vec<WeeklyVolumePoint> {
    let primary_sports = unique_sports(primary_sports);
    let mut table = WeekTable::new(primary_sports.len());
    table.accumulate(volume, &primary_sports, today);

    let merged: Vec<(NaiveDate, String, WeeklyTotals)> = table
        .weeks
        .into_iter()
        .map(|(week_start, bucket)| {
            let mut totals = WeeklyTotals::default();
            for sport_totals in &bucket.totals {
                totals.merge(sport_totals);
            }
            (week_start, bucket.label, totals)
        })
        .collect();

    let mut previous: Option<WeeklyTotals> = None;
    let mut points = Vec::with_capacity(merged.len());

    for (week_start, label, totals) in merged {
        let (time_change, distance_change, elevation_change) = match previous {
            None => (0.0, 0.0, 0.0),
            Some(prev) => (
                percent_change(prev.moving_seconds, totals.moving_seconds),
                percent_change(prev.distance_meters, totals.distance_meters),
                percent_change(prev.elevation_meters, totals.elevation_meters),
            ),
        };

        points.push(WeeklyVolumePoint {
            week_label: label,
            week_start,
            time_seconds: totals.moving_seconds,
            distance_km: meters_to_km(totals.distance_meters),
            elevation_m: round_meters(totals.elevation_meters),
            previous_week_time_change_pct: time_change,
            previous_week_distance_change_pct: distance_change,
            previous_week_elevation_change_pct: elevation_change,
        });
        previous = Some(totals);
    }

    points
}

/// Week keys of a primary series, for aligning other charts to it
pub fn week_keys(points: &[WeeklyVolumePoint]) -> Vec<WeekKey> {
    points
        .iter()
        .map(|point| WeekKey {
            label: point.week_label.clone(),
            week_start: point.week_start,
        })
        .collect()
}

/// Percentage change from `previous` to `current`.
///
/// Returns `f64::INFINITY` when there is no previous volume to compare with.
pub fn percent_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        return f64::INFINITY;
    }
    (current - previous) / previous * 100.0
}

pub fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / 3600.0
}

/// Meters to kilometers, rounded to one decimal
pub fn meters_to_km(meters: f64) -> Decimal {
    Decimal::from_f64(meters)
        .map(|m| (m / Decimal::ONE_THOUSAND).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or(Decimal::ZERO)
}

fn round_meters(meters: f64) -> i64 {
    meters.round() as i64
}
