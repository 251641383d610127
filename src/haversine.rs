//! Great-circle distance accumulation along a route.
//!
//! Uses the spherical haversine formula throughout. Less precise than an
//! ellipsoidal geodesic but consistent, which is all interval selection needs.

use crate::error::EngineError;
use crate::model::Coordinate;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate haversine distance between two points in kilometers.
fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Distance in kilometers between two coordinates.
pub fn segment_distance(a: &Coordinate, b: &Coordinate) -> Result<f64, EngineError> {
    a.validate()?;
    b.validate()?;
    Ok(haversine_km(a.lat_lng(), b.lat_lng()))
}

/// Running distance totals, one per coordinate. Entry 0 is always 0.
pub fn cumulative(route: &[Coordinate]) -> Result<Vec<f64>, EngineError> {
    let mut totals = Vec::with_capacity(route.len());
    let Some(first) = route.first() else {
        return Ok(totals);
    };
    first.validate()?;
    totals.push(0.0);

    let mut running = 0.0;
    for pair in route.windows(2) {
        running += segment_distance(&pair[0], &pair[1])?;
        totals.push(running);
    }

    Ok(totals)
}

/// Total length of a route in kilometers; zero for empty or single-point routes.
pub fn total_distance(route: &[Coordinate]) -> Result<f64, EngineError> {
    Ok(cumulative(route)?.last().copied().unwrap_or(0.0))
}
