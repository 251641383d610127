//! Test fixtures for route-stops.
//!
//! Provides:
//! - A reference flexible-polyline encoder (the library only decodes)
//! - Scripted directions and POI providers that record their calls
//! - Builders for straight-line test routes

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use route_stops::model::{Coordinate, Station, StationCategory};
use route_stops::traits::{DirectionsProvider, PoiProvider};

// ============================================================================
// Reference encoder
// ============================================================================

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

fn encode_unsigned(mut value: u64, out: &mut String) {
    while value > 0x1F {
        out.push(ALPHABET[((value & 0x1F) | 0x20) as usize] as char);
        value >>= 5;
    }
    out.push(ALPHABET[value as usize] as char);
}

fn encode_signed(value: i64, out: &mut String) {
    let zigzag = if value < 0 {
        !(value << 1) as u64
    } else {
        (value << 1) as u64
    };
    encode_unsigned(zigzag, out);
}

/// Encodes points with an explicit header. `third_dim` is the 3-bit kind;
/// when non-zero each point's altitude is encoded at `third_dim_precision`.
pub fn encode_with_header(
    points: &[Coordinate],
    precision: u8,
    third_dim: u8,
    third_dim_precision: u8,
) -> String {
    let mut out = String::new();
    encode_unsigned(1, &mut out);
    encode_unsigned(
        u64::from(precision) | u64::from(third_dim) << 4 | u64::from(third_dim_precision) << 7,
        &mut out,
    );

    let factor = 10f64.powi(i32::from(precision));
    let factor_z = 10f64.powi(i32::from(third_dim_precision));
    let (mut last_lat, mut last_lng, mut last_z) = (0i64, 0i64, 0i64);

    for point in points {
        let lat = (point.latitude * factor).round() as i64;
        let lng = (point.longitude * factor).round() as i64;
        encode_signed(lat - last_lat, &mut out);
        encode_signed(lng - last_lng, &mut out);
        last_lat = lat;
        last_lng = lng;

        if third_dim != 0 {
            let z = (point.altitude.unwrap_or(0.0) * factor_z).round() as i64;
            encode_signed(z - last_z, &mut out);
            last_z = z;
        }
    }

    out
}

/// Two-dimensional encoding at precision 5, the common HERE default.
pub fn encode(points: &[Coordinate]) -> String {
    encode_with_header(points, 5, 0, 0)
}

// ============================================================================
// Route builders
// ============================================================================

pub fn coord(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).expect("valid test coordinate")
}

/// `steps + 1` evenly spaced points from `from` to `to`, endpoints included.
pub fn straight_route(from: Coordinate, to: Coordinate, steps: usize) -> Vec<Coordinate> {
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            coord(
                from.latitude + (to.latitude - from.latitude) * t,
                from.longitude + (to.longitude - from.longitude) * t,
            )
        })
        .collect()
}

/// Decoded coordinates compare equal to the originals within this tolerance
/// at precision 5.
pub const PRECISION_5_TOLERANCE: f64 = 0.5e-5 + 1e-12;

pub fn close(a: &Coordinate, b: &Coordinate) -> bool {
    (a.latitude - b.latitude).abs() <= PRECISION_5_TOLERANCE
        && (a.longitude - b.longitude).abs() <= PRECISION_5_TOLERANCE
}

// ============================================================================
// Scripted providers
// ============================================================================

/// Directions provider answering from a fixed table of encoded routes.
///
/// Endpoints are matched within encoding tolerance, since waypoints may come
/// back from a decode.
#[derive(Default)]
pub struct ScriptedDirections {
    routes: Vec<(Coordinate, Coordinate, String, Duration)>,
    calls: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl ScriptedDirections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `points` (encoded) for `origin -> destination`.
    pub fn with_route(self, origin: Coordinate, destination: Coordinate, points: &[Coordinate]) -> Self {
        self.with_encoded(origin, destination, encode(points))
    }

    pub fn with_encoded(
        mut self,
        origin: Coordinate,
        destination: Coordinate,
        encoded: impl Into<String>,
    ) -> Self {
        self.routes
            .push((origin, destination, encoded.into(), Duration::ZERO));
        self
    }

    /// Like [`with_route`](Self::with_route), answering only after `delay`.
    pub fn with_delayed_route(
        mut self,
        origin: Coordinate,
        destination: Coordinate,
        points: &[Coordinate],
        delay: Duration,
    ) -> Self {
        self.routes.push((origin, destination, encode(points), delay));
        self
    }

    pub fn calls(&self) -> Vec<(Coordinate, Coordinate)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_called(&self, origin: &Coordinate, destination: &Coordinate) -> bool {
        self.calls()
            .iter()
            .any(|(o, d)| close(o, origin) && close(d, destination))
    }
}

impl DirectionsProvider for ScriptedDirections {
    fn route(&self, origin: Coordinate, destination: Coordinate) -> Option<String> {
        self.calls.lock().unwrap().push((origin, destination));
        let (_, _, encoded, delay) = self
            .routes
            .iter()
            .find(|(o, d, _, _)| close(o, &origin) && close(d, &destination))?;
        std::thread::sleep(*delay);
        Some(encoded.clone())
    }
}

/// POI provider answering from a fixed table of lookup point -> station.
#[derive(Default)]
pub struct ScriptedPoi {
    stations: Vec<(Coordinate, Station, Duration)>,
    calls: Mutex<Vec<(Coordinate, StationCategory)>>,
}

impl ScriptedPoi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_station(self, near: Coordinate, station: Station) -> Self {
        self.with_delayed_station(near, station, Duration::ZERO)
    }

    pub fn with_delayed_station(mut self, near: Coordinate, station: Station, delay: Duration) -> Self {
        self.stations.push((near, station, delay));
        self
    }

    pub fn calls(&self) -> Vec<(Coordinate, StationCategory)> {
        self.calls.lock().unwrap().clone()
    }
}

impl PoiProvider for ScriptedPoi {
    fn find_nearest(&self, at: Coordinate, category: StationCategory) -> Option<Station> {
        self.calls.lock().unwrap().push((at, category));
        let (_, station, delay) = self.stations.iter().find(|(near, _, _)| close(near, &at))?;
        std::thread::sleep(*delay);
        Some(station.clone())
    }
}
