use chrono::Timelike;
use serde::Serialize;

use crate::days::Day;
use crate::event::Tournament;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Horizontal position of a tournament bar, in percent of one day's track.
/// Values are not clamped: bars of multi-day tournaments run past 100 or
/// start below 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub left: f64,
    pub width: f64,
}

pub fn place(tour: &Tournament, day: &Day) -> Placement {
    let local_start = tour.bounds.start.with_timezone(day.tz());
    let mut left = (local_start.hour() as f64 + local_start.minute() as f64 / 60.0) / 24.0 * 100.0;
    if tour.bounds.start < day.start() {
        left -= 100.0;
    }

    Placement {
        left,
        width: width_of(tour),
    }
}

/// Width from the scheduled duration; inverted bounds or negative durations
/// draw nothing.
pub fn width_of(tour: &Tournament) -> f64 {
    if tour.bounds.end <= tour.bounds.start || tour.minutes <= 0 {
        return 0.0;
    }
    tour.minutes as f64 / MINUTES_PER_DAY * 100.0
}
