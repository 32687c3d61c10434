//! Nominatim HTTP adapter for free-text address search.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ProviderError;
use crate::model::GeoPoint;
use crate::traits::GeocodingProvider;

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Nominatim's usage policy rejects requests without an identifying agent.
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "CourierOptimizationApp/1.0".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl GeocodingProvider for NominatimClient {
    fn search(&self, query: &str) -> Result<Option<GeoPoint>, ProviderError> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));

        let places = self
            .client
            .get(url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<Vec<Place>>())?;

        first_point(places)
    }
}

/// One search hit. Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
pub struct Place {
    pub lat: String,
    pub lon: String,
    pub display_name: Option<String>,
}

impl Place {
    pub fn point(&self) -> Result<GeoPoint, ProviderError> {
        let lat = self.lat.trim().parse::<f64>();
        let lng = self.lon.trim().parse::<f64>();
        match (lat, lng) {
            (Ok(lat), Ok(lng)) => Ok(GeoPoint::new(lat, lng)),
            _ => Err(ProviderError::Malformed(format!(
                "unparsable coordinates {:?},{:?}",
                self.lat, self.lon
            ))),
        }
    }
}

fn first_point(places: Vec<Place>) -> Result<Option<GeoPoint>, ProviderError> {
    places.first().map(Place::point).transpose()
}
