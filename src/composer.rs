//! Multi-leg route composition.

use rayon::prelude::*;

use crate::error::EngineError;
use crate::model::Coordinate;
use crate::polyline::{decode, Polyline};
use crate::traits::DirectionsProvider;

/// A single point-to-point request between adjacent waypoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteLeg {
    pub origin: Coordinate,
    pub destination: Coordinate,
}

impl RouteLeg {
    /// Requests and decodes this leg. `Ok(None)` means the provider found no
    /// route; geometry that decodes to no points counts as no route too.
    fn fetch<D>(&self, directions: &D) -> Result<Option<Polyline>, EngineError>
    where
        D: DirectionsProvider + ?Sized,
    {
        match directions.route(self.origin, self.destination) {
            Some(encoded) => {
                let route = decode(&encoded)?;
                Ok((!route.is_empty()).then_some(route))
            }
            None => Ok(None),
        }
    }
}

/// Outcome of a composition, including whether the direct fallback was used.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub route: Polyline,
    pub used_fallback: bool,
}

/// Legs between every consecutive pair of waypoints.
pub fn legs(waypoints: &[Coordinate]) -> Vec<RouteLeg> {
    waypoints
        .windows(2)
        .map(|pair| RouteLeg {
            origin: pair[0],
            destination: pair[1],
        })
        .collect()
}

/// Routes through every waypoint and concatenates the legs in order.
///
/// If any leg has no route, all legs are discarded and a single direct route
/// from the first to the last waypoint is requested instead. A partial route is
/// never returned.
pub fn compose<D>(waypoints: &[Coordinate], directions: &D) -> Result<Polyline, EngineError>
where
    D: DirectionsProvider + Sync,
{
    compose_with_outcome(waypoints, directions).map(|composition| composition.route)
}

/// Like [`compose`], but also reports whether the direct fallback was taken.
pub fn compose_with_outcome<D>(
    waypoints: &[Coordinate],
    directions: &D,
) -> Result<Composition, EngineError>
where
    D: DirectionsProvider + Sync,
{
    let (origin, destination) = endpoints(waypoints)?;
    if let Some(route) = route_legs(waypoints, directions)? {
        return Ok(Composition {
            route,
            used_fallback: false,
        });
    }

    let direct = RouteLeg {
        origin,
        destination,
    };
    match direct.fetch(directions)? {
        Some(route) => Ok(Composition {
            route,
            used_fallback: true,
        }),
        None => Err(EngineError::RouteUnavailable {
            origin,
            destination,
        }),
    }
}

/// Like [`compose_with_outcome`], but falls back to an already fetched
/// `direct` route instead of requesting it again.
pub fn compose_with_direct<D>(
    waypoints: &[Coordinate],
    directions: &D,
    direct: Polyline,
) -> Result<Composition, EngineError>
where
    D: DirectionsProvider + Sync,
{
    endpoints(waypoints)?;
    Ok(match route_legs(waypoints, directions)? {
        Some(route) => Composition {
            route,
            used_fallback: false,
        },
        None => Composition {
            route: direct,
            used_fallback: true,
        },
    })
}

fn endpoints(waypoints: &[Coordinate]) -> Result<(Coordinate, Coordinate), EngineError> {
    match waypoints {
        [first, .., last] => Ok((*first, *last)),
        _ => Err(EngineError::InsufficientWaypoints(waypoints.len())),
    }
}

/// Routes every leg; `None` when at least one leg has no route.
fn route_legs<D>(waypoints: &[Coordinate], directions: &D) -> Result<Option<Polyline>, EngineError>
where
    D: DirectionsProvider + Sync,
{
    let legs = legs(waypoints);
    // Ordered collect keeps waypoint order regardless of completion order.
    let fetched = legs
        .par_iter()
        .map(|leg| leg.fetch(directions))
        .collect::<Result<Vec<_>, _>>()?;

    let missing = fetched.iter().filter(|leg| leg.is_none()).count();
    if missing == 0 {
        return Ok(Some(fetched.into_iter().flatten().collect()));
    }

    tracing::warn!(
        legs = legs.len(),
        missing,
        origin = %waypoints[0],
        destination = %waypoints[waypoints.len() - 1],
        "leg routing failed, falling back to direct route"
    );
    Ok(None)
}
