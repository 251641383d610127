//! Domain value types shared by the codec, selector, resolver and composer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A geographic position in decimal degrees.
///
/// `altitude` is only populated when the source geometry declares a third
/// dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl Coordinate {
    /// Creates a validated two-dimensional coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, EngineError> {
        let coordinate = Self {
            latitude,
            longitude,
            altitude: None,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn with_altitude(self, altitude: f64) -> Self {
        Self {
            altitude: Some(altitude),
            ..self
        }
    }

    /// Checks that latitude and longitude are finite and within range.
    pub fn validate(&self) -> Result<(), EngineError> {
        let latitude_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let longitude_ok =
            self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        let altitude_ok = self.altitude.is_none_or(f64::is_finite);

        if latitude_ok && longitude_ok && altitude_ok {
            Ok(())
        } else {
            Err(EngineError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// (lat, lng) tuple, the form the distance math works on.
    pub fn lat_lng(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Renders as `lat,lng`, the query form routing services expect.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A refuelling or recharging stop returned by a POI provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub coordinate: Coordinate,
    pub label: Option<String>,
}

impl Station {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            label: None,
        }
    }

    pub fn labelled(coordinate: Coordinate, label: impl Into<String>) -> Self {
        Self {
            coordinate,
            label: Some(label.into()),
        }
    }
}

/// Kind of stop a drive train needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationCategory {
    FuelStation,
    ChargingStation,
    HydrogenStation,
}

impl StationCategory {
    /// Free-text search query used against POI discovery services.
    pub fn search_query(&self) -> &'static str {
        match self {
            StationCategory::FuelStation => "fuel station",
            StationCategory::ChargingStation => "ev charging station",
            StationCategory::HydrogenStation => "hydrogen fuel station",
        }
    }
}
