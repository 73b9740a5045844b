//! Week-key normalization
//!
//! Upstream period identifiers come either as ISO weeks (`2024-W03`) or as
//! calendar dates (`2024-01-17`). Both are mapped onto the Monday that starts
//! the ISO week so series from different sports share one x-axis.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

use crate::models::WeekKey;

/// Short month/day label used on chart axes, e.g. `Mar 3`
pub fn format_week_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Normalize a period identifier using today's date for the fallback key.
pub fn normalize_week(period: &str) -> WeekKey {
    normalize_week_on(period, Local::now().date_naive())
}

/// Normalize a period identifier.
///
/// Never fails: a malformed period yields a key labelled with the raw input
/// and starting on `today`, so one bad record cannot abort a whole pass.
pub fn normalize_week_on(period: &str, today: NaiveDate) -> WeekKey {
    match parse_week_start(period) {
        Some(week_start) => WeekKey {
            label: format_week_label(week_start),
            week_start,
        },
        None => {
            tracing::debug!(period, "Unrecognized period format, using fallback week key");
            WeekKey {
                label: period.to_string(),
                week_start: today,
            }
        }
    }
}

/// Monday of the ISO week identified by `period`, if it parses
pub fn parse_week_start(period: &str) -> Option<NaiveDate> {
    if period.contains("-W") {
        return parse_iso_week(period);
    }

    if is_calendar_date(period) {
        let date = NaiveDate::parse_from_str(period, "%Y-%m-%d").ok()?;
        return Some(monday_of(date));
    }

    None
}

/// Monday of the week containing `date`
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn parse_iso_week(period: &str) -> Option<NaiveDate> {
    let (year_part, week_part) = period.split_once("-W")?;
    if !is_digits(year_part) || !is_digits(week_part) {
        return None;
    }

    let year: i32 = year_part.parse().ok()?;
    let week: u32 = week_part.parse().ok()?;
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// YYYY-MM-DD, digits only; range checks are left to the date parser
fn is_calendar_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
