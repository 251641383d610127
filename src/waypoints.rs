//! Interval-based insertion point selection.
//!
//! A greedy single pass over the route: one stop shortly after departure,
//! then one every `interval_km` measured from the previous stop, optionally
//! followed by one more on the approach to the destination. This does not
//! search for optimal stop placement.

use crate::error::EngineError;
use crate::haversine::cumulative;
use crate::model::Coordinate;

/// Selects the route points at which to look for a station.
///
/// The returned points are taken from `route` itself, in route order, and no
/// point is returned twice. The first point whose distance from the start
/// reaches `initial_threshold_km` is emitted once. After that, and after every
/// other emission, a counter restarts, and the next point where it reaches
/// `interval_km` is emitted.
///
/// Returns an empty list when the whole route is shorter than
/// `initial_threshold_km`. A non-positive or non-finite `interval_km`
/// disables interval stops.
pub fn select_insertion_points(
    route: &[Coordinate],
    initial_threshold_km: f64,
    interval_km: f64,
) -> Result<Vec<Coordinate>, EngineError> {
    select(route, initial_threshold_km, interval_km, false)
}

/// Like [`select_insertion_points`], plus one stop on the final approach: the
/// first point after the last emitted one whose remaining distance to the
/// destination is within `interval_km`.
///
/// No approach stop is added when interval stops are disabled or the last
/// emitted point is the destination itself.
pub fn select_with_destination_approach(
    route: &[Coordinate],
    initial_threshold_km: f64,
    interval_km: f64,
) -> Result<Vec<Coordinate>, EngineError> {
    select(route, initial_threshold_km, interval_km, true)
}

fn select(
    route: &[Coordinate],
    initial_threshold_km: f64,
    interval_km: f64,
    destination_approach: bool,
) -> Result<Vec<Coordinate>, EngineError> {
    let totals = cumulative(route)?;
    let total = totals.last().copied().unwrap_or(0.0);
    if route.len() < 2 || total < initial_threshold_km {
        return Ok(Vec::new());
    }

    let interval_enabled = interval_km.is_finite() && interval_km > 0.0;
    let mut selected = Vec::new();
    let mut initial_emitted = false;
    let mut since_last = 0.0;
    let mut last_emitted = 0;

    for i in 1..route.len() {
        since_last += totals[i] - totals[i - 1];

        let emit = if !initial_emitted && totals[i] >= initial_threshold_km {
            initial_emitted = true;
            true
        } else {
            interval_enabled && since_last >= interval_km
        };

        if emit {
            selected.push(route[i]);
            since_last = 0.0;
            last_emitted = i;
        }
    }

    if destination_approach && interval_enabled {
        if let Some(i) = (last_emitted + 1..route.len()).find(|&i| total - totals[i] <= interval_km) {
            selected.push(route[i]);
        }
    }

    Ok(selected)
}
