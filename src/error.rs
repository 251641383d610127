//! Engine error taxonomy.
//!
//! Transient provider failures (timeouts, non-2xx responses) are not part of
//! this taxonomy: adapters normalize them to `None` before they reach the engine.

use thiserror::Error;

use crate::model::Coordinate;
use crate::polyline::DecodeError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("malformed polyline encoding: {0}")]
    MalformedEncoding(#[from] DecodeError),

    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Neither the station-routed path nor the direct fallback produced a route.
    #[error("no route available from {origin} to {destination}")]
    RouteUnavailable {
        origin: Coordinate,
        destination: Coordinate,
    },

    #[error("at least two waypoints are required, got {0}")]
    InsufficientWaypoints(usize),
}
