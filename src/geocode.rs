//! Address to coordinate resolution with caching and deterministic fallback.
//!
//! [`GeoResolver::resolve`] never fails. When the provider is unreachable,
//! answers with an error, or finds nothing, the address is hashed onto a
//! stable point in a small box around the configured reference point, so
//! the same input always lands on the same coordinates.

use std::thread;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::cache::{CacheStore, MemoryCache};
use crate::model::GeoPoint;
use crate::traits::GeocodingProvider;

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// City used when a caller does not name one.
    pub default_city: String,
    /// Appended to every provider query; empty to omit.
    pub country: String,
    /// `(spelling, replacement)` pairs applied to the city before querying.
    /// Each spelling is also stripped out of the address itself.
    pub city_aliases: Vec<(String, String)>,
    /// Center of the pseudo-geocode box.
    pub reference_point: GeoPoint,
    /// Side length of the pseudo-geocode box in degrees.
    pub fallback_spread_deg: f64,
    /// Sleep after each successful provider call.
    pub rate_limit_pause: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            default_city: "Rīga".to_string(),
            country: "Latvia".to_string(),
            city_aliases: vec![("Rīga".to_string(), "Riga".to_string())],
            reference_point: GeoPoint::new(56.9496, 24.1052),
            fallback_spread_deg: 0.08,
            rate_limit_pause: Duration::from_secs(1),
        }
    }
}

pub struct GeoResolver<G> {
    provider: G,
    cache: Box<dyn CacheStore<GeoPoint>>,
    config: GeocoderConfig,
}

impl<G: GeocodingProvider> GeoResolver<G> {
    pub fn new(provider: G, config: GeocoderConfig) -> Self {
        Self::with_cache(provider, config, Box::new(MemoryCache::new()))
    }

    pub fn with_cache(
        provider: G,
        config: GeocoderConfig,
        cache: Box<dyn CacheStore<GeoPoint>>,
    ) -> Self {
        Self {
            provider,
            cache,
            config,
        }
    }

    pub fn default_city(&self) -> &str {
        &self.config.default_city
    }

    /// Resolve `address` within `city` (or the default city).
    pub fn resolve(&self, address: &str, city: Option<&str>) -> GeoPoint {
        let city = city.unwrap_or(self.config.default_city.as_str());

        if address.trim().is_empty() {
            warn!(city, reason = "empty_address", "geocode fallback");
            return self.pseudo_geocode("default", city);
        }

        let key = cache_key(city, address);
        if let Some(point) = self.cache.get(&key) {
            debug!(address, "geocode cache hit");
            return point;
        }

        let Some(query) = self.query_for(address, city) else {
            warn!(address, reason = "empty_after_normalization", "geocode fallback");
            return self.pseudo_geocode(address, city);
        };

        match self.provider.search(&query) {
            Ok(Some(point)) => {
                debug!(address, query = %query, lat = point.lat, lng = point.lng, "geocoded");
                self.cache.insert(key, point);
                if !self.config.rate_limit_pause.is_zero() {
                    thread::sleep(self.config.rate_limit_pause);
                }
                point
            }
            Ok(None) => {
                warn!(address, query = %query, reason = "no_results", "geocode fallback");
                self.pseudo_geocode(address, city)
            }
            Err(err) => {
                warn!(address, query = %query, reason = err.reason(), error = %err, "geocode fallback");
                self.pseudo_geocode(address, city)
            }
        }
    }

    /// Stable pseudo-random point for `(city, address)`; cached like a real hit.
    pub fn pseudo_geocode(&self, address: &str, city: &str) -> GeoPoint {
        let key = cache_key(city, address);
        if let Some(point) = self.cache.get(&key) {
            return point;
        }

        let digest = Sha256::digest(key.as_bytes());
        let unit = |bytes: [u8; 4]| f64::from(u32::from_be_bytes(bytes)) / 4_294_967_296.0;
        let u1 = unit([digest[0], digest[1], digest[2], digest[3]]);
        let u2 = unit([digest[4], digest[5], digest[6], digest[7]]);

        let base = self.config.reference_point;
        let spread = self.config.fallback_spread_deg;
        let point = GeoPoint::new(base.lat + (u1 - 0.5) * spread, base.lng + (u2 - 0.5) * spread);

        self.cache.insert(key, point);
        point
    }

    /// Provider query text, or `None` if nothing is left of the address.
    pub fn query_for(&self, address: &str, city: &str) -> Option<String> {
        let spellings = std::iter::once(city)
            .chain(self.config.city_aliases.iter().map(|(from, _)| from.as_str()));
        let normalized = spellings
            .filter(|s| !s.is_empty())
            .fold(address.trim(), strip_city_token);
        if normalized.is_empty() {
            return None;
        }

        let city = self
            .config
            .city_aliases
            .iter()
            .fold(city.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to));

        Some(if self.config.country.is_empty() {
            format!("{normalized}, {city}")
        } else {
            format!("{normalized}, {city}, {}", self.config.country)
        })
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

/// Drop `city` when it is the whole address, a leading `"{city},"` or a
/// trailing `", {city}"`. Street names containing the city are left alone.
fn strip_city_token<'a>(address: &'a str, city: &str) -> &'a str {
    if address == city {
        return "";
    }
    let mut rest = address;
    if let Some(tail) = rest.strip_prefix(city).and_then(|t| t.strip_prefix(',')) {
        rest = tail.trim_start();
    }
    if let Some(head) = rest.strip_suffix(city).and_then(|h| h.trim_end().strip_suffix(',')) {
        rest = head.trim_end();
    }
    rest
}

/// Case-insensitive, trimmed `city:address`.
pub fn cache_key(city: &str, address: &str) -> String {
    format!("{city}:{address}").to_lowercase().trim().to_string()
}
