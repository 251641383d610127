//! HERE HTTP adapters for routing, POI discovery and geocoding.
//!
//! Every failure (transport, status, body, invalid position) is logged and
//! normalized to `None` here, so the engine only ever sees "no result".

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{Coordinate, Station, StationCategory};
use crate::traits::{DirectionsProvider, GeocodingProvider, PoiProvider};

#[derive(Debug, Clone)]
pub struct HereConfig {
    pub router_url: String,
    pub discover_url: String,
    pub geocode_url: String,
    pub api_key: String,
    pub transport_mode: String,
    pub timeout_secs: u64,
    /// Candidates requested per discover call; the closest one wins.
    pub discover_limit: u32,
}

impl Default for HereConfig {
    fn default() -> Self {
        Self {
            router_url: "https://router.hereapi.com".to_string(),
            discover_url: "https://discover.search.hereapi.com".to_string(),
            geocode_url: "https://geocode.search.hereapi.com".to_string(),
            api_key: String::new(),
            transport_mode: "car".to_string(),
            timeout_secs: 15,
            discover_limit: 5,
        }
    }
}

impl HereConfig {
    /// Default endpoints with the key taken from `HERE_API_KEY`.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("HERE_API_KEY").ok().filter(|key| !key.is_empty())?;
        Some(Self {
            api_key,
            ..Self::default()
        })
    }

    /// Points all three services at one base URL (a proxy or a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.router_url = base_url.clone();
        self.discover_url = base_url.clone();
        self.geocode_url = base_url;
        self
    }
}

#[derive(Error, Debug)]
pub enum HereError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response contained no result")]
    NoResult,

    #[error("response contained an invalid position ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },
}

#[derive(Debug, Clone)]
pub struct HereClient {
    config: HereConfig,
    client: reqwest::blocking::Client,
}

impl HereClient {
    pub fn new(config: HereConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn fetch_route(&self, origin: Coordinate, destination: Coordinate) -> Result<String, HereError> {
        let url = format!("{}/v8/routes", self.config.router_url);
        let origin_param = origin.to_string();
        let destination_param = destination.to_string();
        tracing::debug!(%origin, %destination, "requesting HERE route");

        let body = self
            .client
            .get(url)
            .query(&[
                ("transportMode", self.config.transport_mode.as_str()),
                ("origin", origin_param.as_str()),
                ("destination", destination_param.as_str()),
                ("return", "polyline"),
                ("apikey", self.config.api_key.as_str()),
            ])
            .send()?
            .error_for_status()?
            .json::<RoutesResponse>()?;

        body.routes
            .into_iter()
            .next()
            .and_then(|route| route.sections.into_iter().next())
            .and_then(|section| section.polyline)
            .filter(|polyline| !polyline.is_empty())
            .ok_or(HereError::NoResult)
    }

    fn fetch_nearest(&self, at: Coordinate, category: StationCategory) -> Result<Station, HereError> {
        let url = format!("{}/v1/discover", self.config.discover_url);
        let at_param = at.to_string();
        let limit_param = self.config.discover_limit.to_string();
        tracing::debug!(%at, ?category, "requesting HERE discover");

        let body = self
            .client
            .get(url)
            .query(&[
                ("q", category.search_query()),
                ("at", at_param.as_str()),
                ("limit", limit_param.as_str()),
                ("apiKey", self.config.api_key.as_str()),
            ])
            .send()?
            .error_for_status()?
            .json::<DiscoverResponse>()?;

        // Items without a position are skipped rather than failing the lookup.
        let closest = body
            .items
            .into_iter()
            .filter(|item| item.position.is_some())
            .min_by(|a, b| {
                let a = a.distance.unwrap_or(f64::INFINITY);
                let b = b.distance.unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            })
            .ok_or(HereError::NoResult)?;

        let coordinate = closest
            .position
            .ok_or(HereError::NoResult)?
            .to_coordinate()?;
        Ok(Station {
            coordinate,
            label: closest.title,
        })
    }

    fn fetch_geocode(&self, place: &str) -> Result<Coordinate, HereError> {
        let url = format!("{}/v1/geocode", self.config.geocode_url);
        tracing::debug!(place, "requesting HERE geocode");

        let body = self
            .client
            .get(url)
            .query(&[("q", place), ("apiKey", self.config.api_key.as_str())])
            .send()?
            .error_for_status()?
            .json::<GeocodeResponse>()?;

        body.items
            .into_iter()
            .find_map(|item| item.position)
            .ok_or(HereError::NoResult)?
            .to_coordinate()
    }
}

impl DirectionsProvider for HereClient {
    fn route(&self, origin: Coordinate, destination: Coordinate) -> Option<String> {
        self.fetch_route(origin, destination)
            .inspect_err(|err| tracing::warn!(%origin, %destination, %err, "HERE route failed"))
            .ok()
    }
}

impl PoiProvider for HereClient {
    fn find_nearest(&self, at: Coordinate, category: StationCategory) -> Option<Station> {
        self.fetch_nearest(at, category)
            .inspect_err(|err| tracing::warn!(%at, ?category, %err, "HERE discover failed"))
            .ok()
    }
}

impl GeocodingProvider for HereClient {
    fn geocode(&self, place: &str) -> Option<Coordinate> {
        self.fetch_geocode(place)
            .inspect_err(|err| tracing::warn!(place, %err, "HERE geocode failed"))
            .ok()
    }
}

#[derive(Debug, Deserialize)]
struct RoutesResponse {
    #[serde(default)]
    routes: Vec<RouteBody>,
}

#[derive(Debug, Deserialize)]
struct RouteBody {
    #[serde(default)]
    sections: Vec<SectionBody>,
}

#[derive(Debug, Deserialize)]
struct SectionBody {
    polyline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    items: Vec<DiscoverItem>,
}

#[derive(Debug, Deserialize)]
struct DiscoverItem {
    title: Option<String>,
    position: Option<Position>,
    distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    items: Vec<GeocodeItem>,
}

#[derive(Debug, Deserialize)]
struct GeocodeItem {
    position: Option<Position>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Position {
    lat: f64,
    lng: f64,
}

impl Position {
    fn to_coordinate(self) -> Result<Coordinate, HereError> {
        Coordinate::new(self.lat, self.lng).map_err(|_| HereError::InvalidCoordinate {
            lat: self.lat,
            lng: self.lng,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HereConfig::default();
        assert_eq!(config.transport_mode, "car");
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.discover_limit, 5);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_with_base_url_overrides_all_services() {
        let config = HereConfig::default().with_base_url("http://127.0.0.1:8080");
        assert_eq!(config.router_url, "http://127.0.0.1:8080");
        assert_eq!(config.discover_url, "http://127.0.0.1:8080");
        assert_eq!(config.geocode_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_position_validation() {
        let valid = Position { lat: 51.5, lng: -0.12 };
        assert_eq!(valid.to_coordinate().unwrap().lat_lng(), (51.5, -0.12));

        let invalid = Position { lat: 123.0, lng: 0.0 };
        assert!(matches!(
            invalid.to_coordinate(),
            Err(HereError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_routes_response_shape() {
        let body: RoutesResponse = serde_json::from_str(
            r#"{"routes":[{"sections":[{"polyline":"BFoz5xJ67i1B1B7PzIhaxL7Y"}]}]}"#,
        )
        .unwrap();
        assert_eq!(
            body.routes[0].sections[0].polyline.as_deref(),
            Some("BFoz5xJ67i1B1B7PzIhaxL7Y")
        );
    }

    #[test]
    fn test_discover_response_tolerates_missing_fields() {
        let body: DiscoverResponse = serde_json::from_str(
            r#"{"items":[{"title":"Shell","position":{"lat":51.5,"lng":-0.1},"distance":420},{"title":"No position"}]}"#,
        )
        .unwrap();
        assert_eq!(body.items.len(), 2);
        assert_eq!(body.items[0].distance, Some(420.0));
        assert!(body.items[1].position.is_none());

        let empty: GeocodeResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_unreachable_service_is_none() {
        let config = HereConfig {
            timeout_secs: 1,
            ..HereConfig::default().with_base_url("http://127.0.0.1:9")
        };
        let client = HereClient::new(config).expect("build HERE client");
        let origin = Coordinate::new(51.5, -0.12).unwrap();
        let destination = Coordinate::new(52.48, -1.89).unwrap();

        assert!(client.route(origin, destination).is_none());
        assert!(client.find_nearest(origin, StationCategory::FuelStation).is_none());
        assert!(client.geocode("London").is_none());
    }
}
