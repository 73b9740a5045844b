use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of calendar event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    Race,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Race => write!(f, "Race"),
        }
    }
}

/// An upcoming race from the athlete's calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceEvent {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub kind: EventKind,
    pub url: Option<String>,
    pub location: String,
    pub distance_km: f64,
    pub elevation_gain_m: u32,
}

/// A race with its countdown relative to a given day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceCountdown<'a> {
    pub event: &'a RaceEvent,
    pub weeks_until: u32,
}

impl RaceCountdown<'_> {
    pub fn weeks_label(&self) -> String {
        weeks_label(self.weeks_until)
    }
}

/// Whole weeks until `date`, rounded up; zero on race day or after it
pub fn weeks_until(date: NaiveDate, today: NaiveDate) -> u32 {
    let days = (date - today).num_days();
    if days <= 0 {
        return 0;
    }
    ((days + 6) / 7) as u32
}

pub fn weeks_label(weeks: u32) -> String {
    match weeks {
        0 => "This week".to_string(),
        1 => "1 week".to_string(),
        n => format!("{} weeks", n),
    }
}

/// `30 km` for whole distances, one decimal otherwise
pub fn format_distance(distance_km: f64) -> String {
    if distance_km.fract() == 0.0 {
        format!("{} km", distance_km as i64)
    } else {
        format!("{:.1} km", distance_km)
    }
}

/// Races sorted by date with their countdowns.
///
/// Races before `today` are dropped unless `include_past` is set.
pub fn upcoming(events: &[RaceEvent], today: NaiveDate, include_past: bool) -> Vec<RaceCountdown<'_>> {
    let mut countdowns: Vec<RaceCountdown<'_>> = events
        .iter()
        .filter(|event| include_past || event.date >= today)
        .map(|event| RaceCountdown {
            event,
            weeks_until: weeks_until(event.date, today),
        })
        .collect();
    countdowns.sort_by(|a, b| a.event.date.cmp(&b.event.date));
    countdowns
}
