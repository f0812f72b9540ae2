use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::config::DEFAULT_GROUP_SIZE;
use crate::datetime::{local_midnight, to_local_date};

/// One calendar day in the display zone, as the instant of its local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Day {
    date: NaiveDate,
    tz: Tz,
}

impl Day {
    pub fn new(date: NaiveDate, tz: Tz) -> Self {
        Self { date, tz }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn tz(&self) -> &Tz {
        &self.tz
    }

    pub fn start(&self) -> DateTime<Utc> {
        local_midnight(self.date, &self.tz).with_timezone(&Utc)
    }

    /// Next local midnight. Equals `start + 24h` unless the zone shifts that day.
    pub fn end(&self) -> DateTime<Utc> {
        match self.date.succ_opt() {
            Some(next) => local_midnight(next, &self.tz).with_timezone(&Utc),
            None => self.start() + Duration::days(1),
        }
    }

    pub fn format(&self, fmt: &str) -> String {
        self.date.format(fmt).to_string()
    }
}

/// Every local calendar day from `since` to `to`, both inclusive.
/// Empty when `to` precedes `since`.
#[tracing::instrument(skip(tz))]
pub fn each_day(since: DateTime<Utc>, to: DateTime<Utc>, tz: &Tz) -> Vec<Day> {
    if to < since {
        debug!("range ends before it starts; no days");
        return vec![];
    }

    let first = to_local_date(since, tz);
    let last = to_local_date(to, tz);

    let days: Vec<Day> = first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| Day::new(date, *tz))
        .collect();

    debug!(count = days.len(), first = %first, last = %last, "enumerated days");
    days
}

/// Splits `days` into consecutive chunks of at most `size`.
pub fn make_groups(days: &[Day], size: usize) -> Vec<Vec<Day>> {
    let size = if size == 0 { DEFAULT_GROUP_SIZE } else { size };
    days.chunks(size).map(<[Day]>::to_vec).collect()
}
