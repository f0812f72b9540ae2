use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Half-open `[start, end)` time range of a tournament.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bounds {
    #[serde(rename = "startsAt", with = "chrono::serde::ts_milliseconds")]
    pub start: DateTime<Utc>,

    #[serde(rename = "finishesAt", with = "chrono::serde::ts_milliseconds")]
    pub end: DateTime<Utc>,
}

impl Bounds {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schedule {
    pub freq: String,

    #[serde(default)]
    pub speed: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Perf {
    pub icon: String,

    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

/// Time control; `limit` is in seconds, `increment` in seconds per move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Clock {
    pub limit: u32,
    pub increment: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: String,

    pub full_name: String,

    #[serde(default)]
    pub rated: bool,

    #[serde(default)]
    pub has_max_rating: bool,

    pub minutes: i64,

    #[serde(flatten)]
    pub bounds: Bounds,

    #[serde(default)]
    pub schedule: Option<Schedule>,

    #[serde(default)]
    pub perf: Option<Perf>,

    #[serde(default)]
    pub clock: Option<Clock>,
}

impl Tournament {
    pub fn new(id: &str, full_name: &str, start: DateTime<Utc>, minutes: i64) -> Self {
        Self {
            id: id.to_string(),
            full_name: full_name.to_string(),
            rated: true,
            has_max_rating: false,
            minutes,
            bounds: Bounds::new(start, start + Duration::minutes(minutes)),
            schedule: None,
            perf: None,
            clock: None,
        }
    }

    pub fn freq(&self) -> Option<&str> {
        self.schedule.as_ref().map(|s| s.freq.as_str())
    }
}

/// Everything one calendar render consumes. Tournaments are expected sorted by
/// start time; nothing here reorders them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarData {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub since: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub to: DateTime<Utc>,

    #[serde(default)]
    pub tournaments: Vec<Tournament>,
}

impl CalendarData {
    #[tracing::instrument(skip(raw), fields(bytes = raw.len()))]
    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let data: CalendarData =
            serde_json::from_str(raw).context("failed to decode calendar json")?;
        debug!(
            since = %data.since,
            to = %data.to,
            tournaments = data.tournaments.len(),
            "decoded calendar data"
        );
        Ok(data)
    }

    /// Reads from `path`, or from stdin when `path` is `None` or `-`.
    #[tracing::instrument]
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let raw = match path {
            Some(p) if p != Path::new("-") => {
                info!(input = %p.display(), "reading calendar data");
                fs::read_to_string(p).with_context(|| format!("failed to read {}", p.display()))?
            }
            _ => {
                info!("reading calendar data from stdin");
                let mut buf = String::new();
                std::io::stdin()
                    .lock()
                    .read_to_string(&mut buf)
                    .context("failed to read stdin")?;
                buf
            }
        };
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Bounds, CalendarData};

    #[test]
    fn touching_ranges_do_not_overlap() {
        let at = |h| Utc.with_ymd_and_hms(2026, 3, 1, h, 0, 0).unwrap();
        let a = Bounds::new(at(10), at(11));
        let b = Bounds::new(at(11), at(12));
        let c = Bounds::new(at(10), at(12));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn decodes_camel_case_payload_with_optional_fields() {
        let raw = r#"{
            "since": 1772323200000,
            "to": 1772409600000,
            "tournaments": [
                {
                    "id": "abc",
                    "fullName": "Hourly Bullet Arena",
                    "rated": true,
                    "minutes": 57,
                    "startsAt": 1772359200000,
                    "finishesAt": 1772362620000,
                    "schedule": { "freq": "hourly", "speed": "bullet" },
                    "perf": { "icon": "T", "key": "bullet" },
                    "clock": { "limit": 60, "increment": 0 }
                },
                {
                    "id": "def",
                    "fullName": "Casual Blitz",
                    "rated": false,
                    "minutes": 30,
                    "startsAt": 1772359200000,
                    "finishesAt": 1772361000000
                }
            ]
        }"#;

        let data = CalendarData::from_json_str(raw).expect("decode");
        assert_eq!(data.tournaments.len(), 2);

        let first = &data.tournaments[0];
        assert_eq!(first.freq(), Some("hourly"));
        assert_eq!((first.bounds.end - first.bounds.start).num_minutes(), 57);
        assert!(!first.has_max_rating);

        let second = &data.tournaments[1];
        assert!(second.schedule.is_none());
        assert!(second.perf.is_none());
        assert!(second.clock.is_none());
    }

    #[test]
    fn rejects_payload_without_range() {
        assert!(CalendarData::from_json_str(r#"{"tournaments": []}"#).is_err());
    }
}
