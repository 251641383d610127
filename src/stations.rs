//! Station resolution for selected insertion points.

use rayon::prelude::*;

use crate::model::{Coordinate, Station, StationCategory};
use crate::traits::PoiProvider;

/// Looks up the nearest station for each point and returns the deduplicated,
/// capped list in point order.
///
/// Lookups run in parallel. Points with no nearby station are skipped.
/// Deduplication (exact coordinate equality) happens afterwards in a single
/// pass, so two lookups that land on the same station keep only the first.
pub fn resolve<P>(
    points: &[Coordinate],
    poi: &P,
    category: StationCategory,
    max_stations: usize,
) -> Vec<Station>
where
    P: PoiProvider + Sync,
{
    let found: Vec<Option<Station>> = points
        .par_iter()
        .map(|point| poi.find_nearest(*point, category))
        .collect();

    let looked_up = found.len();
    let mut accepted: Vec<Station> = Vec::new();
    for station in found.into_iter().flatten() {
        if accepted
            .iter()
            .any(|kept| kept.coordinate == station.coordinate)
        {
            continue;
        }
        accepted.push(station);
    }

    tracing::debug!(
        points = looked_up,
        unique = accepted.len(),
        ?category,
        "resolved stations"
    );

    cap_stations(accepted, max_stations)
}

/// Thins `stations` down to `max_stations`, spreading the kept stops along
/// the route instead of truncating.
///
/// The first and last stations are always kept. Interior stations are sampled
/// at a stride of `max(1, interior / (max_stations - 2))` and at most
/// `max_stations - 2` of them are kept.
pub fn cap_stations(stations: Vec<Station>, max_stations: usize) -> Vec<Station> {
    if stations.len() <= max_stations {
        return stations;
    }

    match max_stations {
        0 => Vec::new(),
        1 => stations.into_iter().take(1).collect(),
        _ => {
            let keep_interior = max_stations - 2;
            let last = stations.len() - 1;
            let interior = &stations[1..last];
            let stride = if keep_interior == 0 {
                1
            } else {
                (interior.len() / keep_interior).max(1)
            };

            let mut kept = Vec::with_capacity(max_stations);
            kept.push(stations[0].clone());
            kept.extend(
                interior
                    .iter()
                    .step_by(stride)
                    .take(keep_interior)
                    .cloned(),
            );
            kept.push(stations[last].clone());
            kept
        }
    }
}
