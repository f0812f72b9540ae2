use std::collections::BTreeSet;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::DEFAULT_GROUP_SIZE;
use crate::datetime::{LONG_DAY_FORMAT, SHORT_DAY_FORMAT};
use crate::days::{Day, each_day, make_groups};
use crate::display::{CategoryFlag, category_flags, display_clock, event_href, event_title, hour_label, icon_of};
use crate::event::{CalendarData, Tournament};
use crate::geometry::place;
use crate::lanes::{events_on_day, make_lanes};

#[derive(Debug, Clone, Copy)]
pub struct LayoutOptions {
    pub tz: Tz,
    pub group_size: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            tz: chrono_tz::UTC,
            group_size: DEFAULT_GROUP_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarLayout {
    pub groups: Vec<GroupNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupNode {
    pub timeline: Vec<HourMark>,
    pub days: Vec<DayNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourMark {
    pub hour: u32,
    pub label: String,
    pub left: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayNode {
    pub date: NaiveDate,
    pub label: String,
    pub title: String,
    pub lanes: Vec<LaneNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneNode {
    pub events: Vec<EventNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventNode {
    pub id: String,
    pub href: String,
    pub name: String,
    pub title: String,
    pub left: f64,
    pub width: f64,
    pub flags: BTreeSet<CategoryFlag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock: Option<String>,
}

impl CalendarLayout {
    pub fn day_count(&self) -> usize {
        self.groups.iter().map(|g| g.days.len()).sum()
    }
}

#[tracing::instrument(skip_all, fields(tz = %options.tz, group_size = options.group_size))]
pub fn build_layout(data: &CalendarData, options: &LayoutOptions) -> CalendarLayout {
    let days = each_day(data.since, data.to, &options.tz);
    let groups: Vec<GroupNode> = make_groups(&days, options.group_size)
        .iter()
        .map(|group| build_group(&data.tournaments, group))
        .collect();

    let layout = CalendarLayout { groups };
    info!(
        days = layout.day_count(),
        groups = layout.groups.len(),
        tournaments = data.tournaments.len(),
        "built calendar layout"
    );
    layout
}

fn build_group(tournaments: &[Tournament], group: &[Day]) -> GroupNode {
    GroupNode {
        timeline: timeline(),
        days: group.iter().map(|day| build_day(tournaments, day)).collect(),
    }
}

pub fn build_day(tournaments: &[Tournament], day: &Day) -> DayNode {
    let todays = events_on_day(tournaments, day);
    let lanes: Vec<LaneNode> = make_lanes(&todays)
        .into_iter()
        .map(|lane| LaneNode {
            events: lane.into_iter().map(|tour| build_event(tour, day)).collect(),
        })
        .collect();

    debug!(date = %day.date(), tournaments = todays.len(), lanes = lanes.len(), "laid out day");

    DayNode {
        date: day.date(),
        label: day.format(SHORT_DAY_FORMAT),
        title: day.format(LONG_DAY_FORMAT),
        lanes,
    }
}

fn build_event(tour: &Tournament, day: &Day) -> EventNode {
    let placement = place(tour, day);
    EventNode {
        id: tour.id.clone(),
        href: event_href(tour),
        name: tour.full_name.clone(),
        title: event_title(tour, day),
        left: placement.left,
        width: placement.width,
        flags: category_flags(tour, day),
        icon: icon_of(tour),
        clock: tour.clock.as_ref().map(display_clock),
    }
}

/// Hour markers `00`..`23` across the track.
pub fn timeline() -> Vec<HourMark> {
    (0..24)
        .map(|hour| HourMark {
            hour,
            label: hour_label(hour),
            left: hour as f64 / 24.0 * 100.0,
        })
        .collect()
}
