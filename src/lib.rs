//! courier-dispatch core
//!
//! Geocoding, road distances, route sequencing and courier assignment for a
//! last-mile delivery service. Storage is reached through the traits in
//! [`traits`]; the geocoding and routing providers default to Nominatim and
//! OSRM and degrade to deterministic offline estimates when unreachable.

pub mod assign;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod distance;
pub mod error;
pub mod geocode;
pub mod haversine;
pub mod model;
pub mod nominatim;
pub mod osrm;
pub mod polyline;
pub mod solver;
pub mod suitability;
pub mod traits;
pub mod zone;

pub use dispatch::Dispatcher;
pub use error::{DispatchError, ProviderError, StoreError};
