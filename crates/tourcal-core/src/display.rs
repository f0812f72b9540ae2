use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::datetime::{EVENT_START_FORMAT, format_local};
use crate::days::Day;
use crate::event::{Clock, Tournament};

const SHIELD_FREQ: &str = "shield";
const SHIELD_ICON: &str = "5";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryFlag {
    Rated,
    Casual,
    MaxRating,
    /// Started before the day it is drawn on.
    Yesterday,
    Freq(String),
}

impl CategoryFlag {
    pub fn class_name(&self) -> &str {
        match self {
            CategoryFlag::Rated => "rated",
            CategoryFlag::Casual => "casual",
            CategoryFlag::MaxRating => "max-rating",
            CategoryFlag::Yesterday => "yesterday",
            CategoryFlag::Freq(freq) => freq,
        }
    }
}

impl fmt::Display for CategoryFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl Serialize for CategoryFlag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.class_name())
    }
}

pub fn category_flags(tour: &Tournament, day: &Day) -> BTreeSet<CategoryFlag> {
    let mut flags = BTreeSet::new();
    flags.insert(if tour.rated {
        CategoryFlag::Rated
    } else {
        CategoryFlag::Casual
    });
    if tour.has_max_rating {
        flags.insert(CategoryFlag::MaxRating);
    }
    if tour.bounds.start < day.start() {
        flags.insert(CategoryFlag::Yesterday);
    }
    if let Some(freq) = tour.freq() {
        flags.insert(CategoryFlag::Freq(freq.to_string()));
    }
    flags
}

/// Shield tournaments always get the shield glyph; others use their perf icon.
pub fn icon_of(tour: &Tournament) -> Option<String> {
    let perf = tour.perf.as_ref()?;
    if tour.freq() == Some(SHIELD_FREQ) {
        return Some(SHIELD_ICON.to_string());
    }
    Some(perf.icon.clone())
}

/// Initial time in minutes, with the usual fractions for sub-minute limits.
pub fn display_clock_limit(limit_seconds: u32) -> String {
    match limit_seconds {
        15 => "¼".to_string(),
        30 => "½".to_string(),
        45 => "¾".to_string(),
        90 => "1.5".to_string(),
        other => format!("{}", other as f64 / 60.0),
    }
}

pub fn display_clock(clock: &Clock) -> String {
    format!("{}+{}", display_clock_limit(clock.limit), clock.increment)
}

pub fn event_title(tour: &Tournament, day: &Day) -> String {
    format!(
        "{} - {}",
        tour.full_name,
        format_local(tour.bounds.start, day.tz(), EVENT_START_FORMAT)
    )
}

pub fn event_href(tour: &Tournament) -> String {
    format!("/tournament/{}", tour.id)
}

pub fn hour_label(hour: u32) -> String {
    format!("{hour:02}")
}
