//! Road distance and travel time between coordinate pairs.
//!
//! Every lookup consults its cache before the routing provider. Keys are
//! directional (`a -> b` and `b -> a` are separate entries) because road
//! networks are not symmetric. A single leg query answers both distance and
//! time, and fills both caches; each cache still refetches on its own miss.

use tracing::{debug, warn};

use crate::cache::{CacheStore, MemoryCache};
use crate::haversine::{haversine_km, HaversineEstimator, DEFAULT_SPEED_KMH};
use crate::model::GeoPoint;
use crate::polyline::Polyline;
use crate::traits::RoutingProvider;

#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Speed assumed when estimating time from straight-line distance.
    pub fallback_speed_kmh: f64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            fallback_speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

pub struct DistanceOracle<R> {
    provider: R,
    distances: Box<dyn CacheStore<f64>>,
    times: Box<dyn CacheStore<u32>>,
    estimator: HaversineEstimator,
}

impl<R: RoutingProvider> DistanceOracle<R> {
    pub fn new(provider: R, config: OracleConfig) -> Self {
        Self::with_caches(
            provider,
            config,
            Box::new(MemoryCache::new()),
            Box::new(MemoryCache::new()),
        )
    }

    pub fn with_caches(
        provider: R,
        config: OracleConfig,
        distances: Box<dyn CacheStore<f64>>,
        times: Box<dyn CacheStore<u32>>,
    ) -> Self {
        Self {
            provider,
            distances,
            times,
            estimator: HaversineEstimator::new(config.fallback_speed_kmh),
        }
    }

    /// Driving distance in kilometers, or great-circle distance on failure.
    pub fn road_distance_km(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        let key = pair_key(from, to);
        if let Some(km) = self.distances.get(&key) {
            return km;
        }
        self.fetch_leg(from, to, key).0
    }

    /// Driving time in whole minutes, or a speed-based estimate on failure.
    pub fn road_time_minutes(&self, from: GeoPoint, to: GeoPoint) -> u32 {
        let key = pair_key(from, to);
        if let Some(minutes) = self.times.get(&key) {
            return minutes;
        }
        self.fetch_leg(from, to, key).1
    }

    /// One provider call for the pair; fills both caches.
    fn fetch_leg(&self, from: GeoPoint, to: GeoPoint, key: String) -> (f64, u32) {
        let (km, minutes) = match self.provider.leg(from, to) {
            Ok(leg) => (leg.distance_m / 1000.0, (leg.duration_s / 60.0) as u32),
            Err(err) => {
                let km = haversine_km(from, to);
                let minutes = self.estimator.km_to_minutes(km);
                warn!(pair = %key, reason = err.reason(), error = %err, km, minutes, "leg fallback");
                (km, minutes)
            }
        };

        self.distances.insert(key.clone(), km);
        self.times.insert(key, minutes);
        (km, minutes)
    }

    /// Driving path through `stops` in order; straight segments on failure.
    pub fn full_route_geometry(&self, stops: &[GeoPoint]) -> Polyline {
        if stops.len() < 2 {
            return Polyline::default();
        }

        match self.provider.path_geometry(stops) {
            Ok(points) if !points.is_empty() => {
                debug!(stops = stops.len(), points = points.len(), "route geometry");
                Polyline::new(points)
            }
            Ok(_) => {
                warn!(stops = stops.len(), reason = "empty_geometry", "geometry fallback");
                Polyline::new(stops.to_vec())
            }
            Err(err) => {
                warn!(stops = stops.len(), reason = err.reason(), error = %err, "geometry fallback");
                Polyline::new(stops.to_vec())
            }
        }
    }

    pub fn clear_caches(&self) {
        self.distances.clear();
        self.times.clear();
    }

    /// `(distance entries, time entries)`
    pub fn cached_entries(&self) -> (usize, usize) {
        (self.distances.len(), self.times.len())
    }
}

/// `a.lat,a.lng-b.lat,b.lng`, each rounded to 6 decimals.
pub fn pair_key(from: GeoPoint, to: GeoPoint) -> String {
    format!("{}-{}", from.key(), to.key())
}
