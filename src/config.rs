//! Aggregate configuration for a [`Dispatcher`](crate::dispatch::Dispatcher).
//!
//! Every field has a working default. [`DispatchConfig::from_env`] overrides
//! a few of them from `DISPATCH_*` variables:
//!
//! | Variable | Field |
//! |---|---|
//! | `DISPATCH_OSRM_URL` | `osrm.base_url` |
//! | `DISPATCH_NOMINATIM_URL` | `nominatim.base_url` |
//! | `DISPATCH_DEFAULT_CITY` | `geocoder.default_city` |
//! | `DISPATCH_FALLBACK_SPEED_KMH` | `oracle.fallback_speed_kmh` |
//! | `DISPATCH_GEOCODE_PAUSE_MS` | `geocoder.rate_limit_pause` |

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::distance::OracleConfig;
use crate::geocode::GeocoderConfig;
use crate::nominatim::NominatimConfig;
use crate::osrm::OsrmConfig;
use crate::solver::RouteOptions;
use crate::suitability::WorkloadPolicy;

#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    pub osrm: OsrmConfig,
    pub nominatim: NominatimConfig,
    pub geocoder: GeocoderConfig,
    pub oracle: OracleConfig,
    pub route: RouteOptions,
    pub workload: WorkloadPolicy,
}

impl DispatchConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = non_empty(lookup("DISPATCH_OSRM_URL")) {
            config.osrm.base_url = url;
        }
        if let Some(url) = non_empty(lookup("DISPATCH_NOMINATIM_URL")) {
            config.nominatim.base_url = url;
        }
        if let Some(city) = non_empty(lookup("DISPATCH_DEFAULT_CITY")) {
            config.geocoder.default_city = city;
        }
        if let Some(speed) = parsed::<f64>(&lookup, "DISPATCH_FALLBACK_SPEED_KMH") {
            if speed > 0.0 {
                config.oracle.fallback_speed_kmh = speed;
            } else {
                warn!(var = "DISPATCH_FALLBACK_SPEED_KMH", speed, "speed must be positive, ignoring");
            }
        }
        if let Some(ms) = parsed::<u64>(&lookup, "DISPATCH_GEOCODE_PAUSE_MS") {
            config.geocoder.rate_limit_pause = Duration::from_millis(ms);
        }

        config
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = non_empty(lookup(name))?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "unparsable value, keeping default");
            None
        }
    }
}
