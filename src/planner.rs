//! Route planning with refuelling/recharging stops.
//!
//! Ties the codec, selector, resolver and composer together behind the two
//! engine entry points, [`decode_route`] and [`plan_route_with_stops`].

use serde::{Deserialize, Serialize};

use crate::composer::compose_with_direct;
use crate::error::EngineError;
use crate::haversine::total_distance;
use crate::model::{Coordinate, Station, StationCategory};
use crate::polyline::{decode, Polyline};
use crate::stations::resolve;
use crate::traits::{DirectionsProvider, PoiProvider};
use crate::waypoints::{select_insertion_points, select_with_destination_approach};

/// How far apart interval stops are placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalPolicy {
    /// A fixed distance in kilometers.
    Fixed(f64),
    /// A fraction of the direct route's total length.
    FractionOfTotal(f64),
}

impl IntervalPolicy {
    pub fn interval_km(&self, total_km: f64) -> f64 {
        match *self {
            IntervalPolicy::Fixed(km) => km,
            IntervalPolicy::FractionOfTotal(fraction) => total_km * fraction,
        }
    }
}

/// Vehicle drive trains with their own stop policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveTrain {
    Diesel,
    Electric,
    Hydrogen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOptions {
    /// Kind of station to look for.
    pub category: StationCategory,
    /// Distance from the origin at which the first stop is placed.
    pub initial_threshold_km: f64,
    /// Spacing of subsequent stops.
    pub interval: IntervalPolicy,
    /// Upper bound on stations in the final plan.
    pub max_stations: usize,
    /// When set and at least the direct route's length, no stops are planned.
    pub vehicle_range_km: Option<f64>,
    /// Add one more stop once the destination is within one interval.
    #[serde(default)]
    pub destination_approach: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self::for_drive_train(DriveTrain::Diesel)
    }
}

impl PlanOptions {
    pub fn for_drive_train(drive_train: DriveTrain) -> Self {
        match drive_train {
            DriveTrain::Diesel => Self {
                category: StationCategory::FuelStation,
                initial_threshold_km: 5.0,
                interval: IntervalPolicy::FractionOfTotal(0.25),
                max_stations: 6,
                vehicle_range_km: None,
                destination_approach: true,
            },
            DriveTrain::Electric => Self {
                category: StationCategory::ChargingStation,
                initial_threshold_km: 5.0,
                interval: IntervalPolicy::Fixed(120.0),
                max_stations: 4,
                vehicle_range_km: None,
                destination_approach: false,
            },
            DriveTrain::Hydrogen => Self {
                category: StationCategory::HydrogenStation,
                initial_threshold_km: 5.0,
                interval: IntervalPolicy::Fixed(150.0),
                max_stations: 2,
                vehicle_range_km: None,
                destination_approach: false,
            },
        }
    }

    pub fn with_vehicle_range(mut self, range_km: f64) -> Self {
        self.vehicle_range_km = Some(range_km);
        self
    }
}

/// The engine's output for one origin/destination pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResult {
    pub composite_route: Polyline,
    pub stations: Vec<Station>,
    pub total_geodesic_distance_km: f64,
    /// The station-routed legs failed and `composite_route` is the direct route.
    pub used_fallback: bool,
}

/// Decodes wire geometry from a directions service.
pub fn decode_route(encoded: &str) -> Result<Polyline, EngineError> {
    Ok(decode(encoded)?)
}

/// Plans a route from `origin` to `destination` with stops along the way.
///
/// The direct route is fetched first to measure the trip and pick insertion
/// points. Stations found near those points become intermediate waypoints,
/// and the final route is composed leg by leg through them. If any leg fails,
/// the direct route fetched up front is returned instead.
pub fn plan_route_with_stops<D, P>(
    origin: Coordinate,
    destination: Coordinate,
    options: &PlanOptions,
    directions: &D,
    poi: &P,
) -> Result<EngineResult, EngineError>
where
    D: DirectionsProvider + Sync,
    P: PoiProvider + Sync,
{
    origin.validate()?;
    destination.validate()?;

    let direct = match directions.route(origin, destination) {
        Some(encoded) => decode(&encoded)?,
        None => Polyline::default(),
    };
    if direct.len() < 2 {
        return Err(EngineError::RouteUnavailable {
            origin,
            destination,
        });
    }
    let direct_km = total_distance(direct.points())?;

    if let Some(range_km) = options.vehicle_range_km {
        if range_km >= direct_km {
            tracing::info!(range_km, direct_km, "range sufficient, planning direct route");
            return Ok(direct_result(direct, direct_km));
        }
    }

    let interval_km = options.interval.interval_km(direct_km);
    let select = if options.destination_approach {
        select_with_destination_approach
    } else {
        select_insertion_points
    };
    let points = select(direct.points(), options.initial_threshold_km, interval_km)?;
    let stations = resolve(&points, poi, options.category, options.max_stations);

    tracing::info!(
        direct_km,
        interval_km,
        candidates = points.len(),
        stations = stations.len(),
        category = ?options.category,
        "selected stations"
    );

    if stations.is_empty() {
        return Ok(direct_result(direct, direct_km));
    }

    let mut waypoints = Vec::with_capacity(stations.len() + 2);
    waypoints.push(origin);
    waypoints.extend(stations.iter().map(|station| station.coordinate));
    waypoints.push(destination);

    let composition = compose_with_direct(&waypoints, directions, direct)?;
    let total_geodesic_distance_km = total_distance(composition.route.points())?;

    Ok(EngineResult {
        composite_route: composition.route,
        stations,
        total_geodesic_distance_km,
        used_fallback: composition.used_fallback,
    })
}

fn direct_result(route: Polyline, total_km: f64) -> EngineResult {
    EngineResult {
        composite_route: route,
        stations: Vec::new(),
        total_geodesic_distance_km: total_km,
        used_fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_policy() {
        assert_eq!(IntervalPolicy::Fixed(120.0).interval_km(1000.0), 120.0);
        assert_eq!(IntervalPolicy::FractionOfTotal(0.25).interval_km(400.0), 100.0);
    }

    #[test]
    fn test_drive_train_profiles() {
        let electric = PlanOptions::for_drive_train(DriveTrain::Electric);
        assert_eq!(electric.category, StationCategory::ChargingStation);
        assert_eq!(electric.interval, IntervalPolicy::Fixed(120.0));
        assert_eq!(electric.max_stations, 4);

        let diesel = PlanOptions::default();
        assert_eq!(diesel.category, StationCategory::FuelStation);
        assert_eq!(diesel.interval, IntervalPolicy::FractionOfTotal(0.25));
        assert_eq!(diesel.initial_threshold_km, 5.0);
        assert!(diesel.destination_approach);
        assert!(!electric.destination_approach);
    }

    #[test]
    fn test_with_vehicle_range() {
        let options = PlanOptions::for_drive_train(DriveTrain::Hydrogen).with_vehicle_range(500.0);
        assert_eq!(options.vehicle_range_km, Some(500.0));
    }

    #[test]
    fn test_decode_route_wraps_decode_errors() {
        assert!(decode_route("").unwrap().is_empty());
        assert!(matches!(
            decode_route("BF*"),
            Err(EngineError::MalformedEncoding(_))
        ));
    }
}
