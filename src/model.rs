//! Typed records for orders, couriers, vehicles, zones and routes.
//!
//! Optional columns are modeled as `Option`, never as sentinel values.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::traits::Id;

pub type OrderId = i64;
pub type CourierId = i64;
pub type VehicleId = i64;
pub type ZoneId = i64;
pub type RouteId = i64;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Cache key fragment: both axes rounded to 6 decimals.
    pub fn key(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }
}

/// A delivery point handed to the route builder.
///
/// Created per request from order records and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop<I: Id> {
    pub id: I,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
    pub size: f64,
    pub weight: f64,
}

impl<I: Id> Stop<I> {
    pub fn at(id: I, location: GeoPoint) -> Self {
        Self {
            id,
            address: None,
            location: Some(location),
            size: 0.0,
            weight: 0.0,
        }
    }

    pub fn with_address(id: I, address: impl Into<String>) -> Self {
        Self {
            id,
            address: Some(address.into()),
            location: None,
            size: 0.0,
            weight: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    UnderReview,
    Assigned,
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub address: Option<String>,
    pub size: f64,
    pub weight: f64,
    pub status: Option<OrderStatus>,
    pub delivery_date: Option<Date>,
}

impl Order {
    /// Pending orders have no route yet or are explicitly under review.
    pub fn is_pending(&self) -> bool {
        matches!(self.status, None | Some(OrderStatus::UnderReview))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Courier,
    Dispatcher,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Courier {
    pub id: CourierId,
    pub username: String,
    pub role: Role,
    pub zone_id: Option<ZoneId>,
}

/// One vehicle per courier by convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub plate_number: Option<String>,
    pub max_size: f64,
    pub max_weight: f64,
    pub courier_id: CourierId,
}

/// A rectangular service area. Any missing bound makes the zone match nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub min_lat: Option<f64>,
    pub max_lat: Option<f64>,
    pub min_lng: Option<f64>,
    pub max_lng: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Zone {
    /// All four bounds, or `None` when the zone is incomplete.
    pub fn bounds(&self) -> Option<ZoneBounds> {
        Some(ZoneBounds {
            min_lat: self.min_lat?,
            max_lat: self.max_lat?,
            min_lng: self.min_lng?,
            max_lng: self.max_lng?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    HandedToCourier,
    UnderReview,
}

/// A persisted route as read back from the route store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub id: RouteId,
    pub courier_id: CourierId,
    pub order_count: usize,
    pub distance_m: u64,
    pub estimated_time_minutes: Option<u32>,
    pub status: RouteStatus,
    pub delivery_date: Option<Date>,
}

/// Values for a route about to be created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRoute {
    pub courier_id: CourierId,
    pub order_count: usize,
    pub distance_m: u64,
    /// Delivery addresses in visiting order.
    pub visiting_order: Vec<String>,
    pub order_ids: Vec<OrderId>,
    pub status: RouteStatus,
    pub eta_minutes: u32,
    pub delivery_date: Option<Date>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(status: Option<OrderStatus>) -> Order {
        Order {
            id: 1,
            address: Some("Brīvības iela 1".into()),
            size: 1.0,
            weight: 1.0,
            status,
            delivery_date: None,
        }
    }

    #[test]
    fn test_pending_statuses() {
        assert!(order(None).is_pending());
        assert!(order(Some(OrderStatus::UnderReview)).is_pending());
        assert!(!order(Some(OrderStatus::Assigned)).is_pending());
        assert!(!order(Some(OrderStatus::Delivered)).is_pending());
    }

    #[test]
    fn test_incomplete_zone_has_no_bounds() {
        let zone = Zone {
            id: 1,
            name: "Centre".into(),
            min_lat: Some(56.9),
            max_lat: None,
            min_lng: Some(24.0),
            max_lng: Some(24.2),
        };
        assert!(zone.bounds().is_none());
    }

    #[test]
    fn test_point_key_rounds_to_six_decimals() {
        let point = GeoPoint::new(56.94961234, 24.1);
        assert_eq!(point.key(), "56.949612,24.100000");
    }
}
