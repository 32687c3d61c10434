//! OSRM HTTP adapter for road distances, durations and path geometry.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::model::GeoPoint;
use crate::traits::{RoadLeg, RoutingProvider};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    /// Timeout for point-to-point queries.
    pub timeout_secs: u64,
    /// Timeout for the multi-stop geometry query.
    pub geometry_timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 5,
            geometry_timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// `{base_url}/route/v1/{profile}/{lng,lat;lng,lat;...}`
    pub fn route_url(&self, points: &[GeoPoint]) -> String {
        let coords = points
            .iter()
            .map(|point| format!("{:.6},{:.6}", point.lng, point.lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        )
    }

    fn fetch(
        &self,
        points: &[GeoPoint],
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<OsrmRoute, ProviderError> {
        let body = self
            .client
            .get(self.route_url(points))
            .query(query)
            .timeout(timeout)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<RouteResponse>())?;

        body.into_first_route()
    }
}

impl RoutingProvider for OsrmClient {
    fn leg(&self, from: GeoPoint, to: GeoPoint) -> Result<RoadLeg, ProviderError> {
        let route = self.fetch(
            &[from, to],
            &[("overview", "false")],
            Duration::from_secs(self.config.timeout_secs),
        )?;
        debug!(from = %from.key(), to = %to.key(), distance_m = route.distance, "osrm leg");

        Ok(RoadLeg {
            distance_m: route.distance,
            duration_s: route.duration,
        })
    }

    fn path_geometry(&self, points: &[GeoPoint]) -> Result<Vec<GeoPoint>, ProviderError> {
        let route = self.fetch(
            points,
            &[("overview", "full"), ("geometries", "geojson")],
            Duration::from_secs(self.config.geometry_timeout_secs),
        )?;

        route
            .geometry
            .map(GeoJsonLine::into_points)
            .ok_or_else(|| ProviderError::Malformed("route has no geometry".to_string()))
    }
}

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// `"Ok"` on success; `"NoRoute"`, `"InvalidQuery"` and friends otherwise.
    pub code: String,

    pub message: Option<String>,

    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

impl RouteResponse {
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }

    fn into_first_route(self) -> Result<OsrmRoute, ProviderError> {
        if !self.is_ok() {
            return Err(ProviderError::NoRoute { code: self.code });
        }
        self.routes
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NoRoute { code: "Empty".to_string() })
    }
}

#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
    pub geometry: Option<GeoJsonLine>,
}

/// GeoJSON LineString with `[lng, lat]` positions.
#[derive(Debug, Deserialize)]
pub struct GeoJsonLine {
    pub coordinates: Vec<[f64; 2]>,
}

impl GeoJsonLine {
    pub fn into_points(self) -> Vec<GeoPoint> {
        self.coordinates
            .into_iter()
            .map(|[lng, lat]| GeoPoint::new(lat, lng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_url_uses_lng_lat_order() {
        let client = OsrmClient::new(OsrmConfig {
            base_url: "http://localhost:5000/".to_string(),
            ..OsrmConfig::default()
        })
        .expect("build client");

        let url = client.route_url(&[GeoPoint::new(56.95, 24.1), GeoPoint::new(56.96, 24.2)]);
        assert_eq!(
            url,
            "http://localhost:5000/route/v1/driving/24.100000,56.950000;24.200000,56.960000"
        );
    }

    #[test]
    fn test_deserialize_leg_response() {
        let json = r#"{
            "code": "Ok",
            "routes": [{"distance": 2345.6, "duration": 301.2, "weight": 301.2}],
            "waypoints": []
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialize");
        let route = response.into_first_route().expect("first route");
        assert_eq!(route.distance, 2345.6);
        assert_eq!(route.duration, 301.2);
        assert!(route.geometry.is_none());
    }

    #[test]
    fn test_deserialize_geometry_flips_axes() {
        let json = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 10.0,
                "duration": 2.0,
                "geometry": {"type": "LineString", "coordinates": [[24.1, 56.95], [24.2, 56.96]]}
            }]
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialize");
        let route = response.into_first_route().expect("first route");
        let points = route.geometry.expect("geometry").into_points();
        assert_eq!(points, vec![GeoPoint::new(56.95, 24.1), GeoPoint::new(56.96, 24.2)]);
    }

    #[test]
    fn test_non_ok_code_is_no_route() {
        let json = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialize");
        assert!(!response.is_ok());
        assert_eq!(
            response.into_first_route().map(|route| route.distance),
            Err(ProviderError::NoRoute { code: "NoRoute".to_string() })
        );
    }
}
