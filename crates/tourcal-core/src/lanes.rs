use tracing::{debug, trace};

use crate::days::Day;
use crate::event::Tournament;

/// Tournaments sharing one horizontal track of a day. Never overlapping.
pub type Lane<'a> = Vec<&'a Tournament>;

/// Tournaments whose bounds intersect the day's `[start, end)` window,
/// in input order.
pub fn events_on_day<'a>(tournaments: &'a [Tournament], day: &Day) -> Vec<&'a Tournament> {
    let (start, end) = (day.start(), day.end());
    tournaments
        .iter()
        .filter(|t| t.bounds.start < end && t.bounds.end > start)
        .collect()
}

pub fn fits_lane(lane: &[&Tournament], tour: &Tournament) -> bool {
    !lane.iter().any(|other| other.bounds.overlaps(&tour.bounds))
}

/// First-fit packing in the given order. Callers pass tournaments sorted by
/// start; the result is not necessarily the fewest possible lanes.
#[tracing::instrument(skip_all, fields(tournaments = tournaments.len()))]
pub fn make_lanes<'a>(tournaments: &[&'a Tournament]) -> Vec<Lane<'a>> {
    let mut lanes: Vec<Lane<'a>> = Vec::new();

    for &tour in tournaments {
        match lanes.iter().position(|lane| fits_lane(lane, tour)) {
            Some(idx) => {
                trace!(id = %tour.id, lane = idx, "joined existing lane");
                lanes[idx].push(tour);
            }
            None => {
                trace!(id = %tour.id, lane = lanes.len(), "opened new lane");
                lanes.push(vec![tour]);
            }
        }
    }

    debug!(lanes = lanes.len(), "packed lanes");
    lanes
}
