//! Collaborator interfaces the engine consumes.
//!
//! These are intentionally minimal. Implementations own their transport,
//! timeouts and retries, and must normalize any failure to `None`.

use crate::model::{Coordinate, Station, StationCategory};

/// Point-to-point routing.
pub trait DirectionsProvider {
    /// Encoded flexible-polyline geometry for the route, or `None` if no
    /// route was found.
    fn route(&self, origin: Coordinate, destination: Coordinate) -> Option<String>;
}

/// Nearest point-of-interest lookup.
pub trait PoiProvider {
    /// Nearest station of `category` around `at`, or `None` when nothing
    /// matches within the provider's search radius.
    fn find_nearest(&self, at: Coordinate, category: StationCategory) -> Option<Station>;
}

/// Place-name resolution, used upstream of the engine.
pub trait GeocodingProvider {
    fn geocode(&self, place: &str) -> Option<Coordinate>;
}
