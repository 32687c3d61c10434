//! Seams to the collaborators the dispatch core does not own.
//!
//! Persistence is reached through the four store traits, and the outside
//! world through the geocoding and routing provider traits. Concrete apps
//! implement the stores for their own database; the crate ships HTTP
//! providers for Nominatim and OSRM.

use std::fmt::Debug;
use std::hash::Hash;

use jiff::civil::Date;

use crate::error::{ProviderError, StoreError};
use crate::model::{
    Courier, CourierId, GeoPoint, NewRoute, Order, OrderId, OrderStatus, Role, RouteId,
    RouteRecord, Vehicle, Zone, ZoneId,
};

/// Unique identifier for routed stops.
pub trait Id: Clone + Eq + Hash + Debug {}

impl<T> Id for T where T: Clone + Eq + Hash + Debug {}

pub trait OrderStore {
    fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Orders with no route yet or explicitly under review.
    fn list_pending_orders(&self) -> Result<Vec<Order>, StoreError>;

    fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<(), StoreError>;

    fn update_delivery_date(&self, id: OrderId, date: Date) -> Result<(), StoreError>;
}

pub trait CourierStore {
    fn get_courier(&self, id: CourierId) -> Result<Option<Courier>, StoreError>;

    fn list_couriers(&self, role: Role) -> Result<Vec<Courier>, StoreError>;

    fn vehicle_for_courier(&self, id: CourierId) -> Result<Option<Vehicle>, StoreError>;
}

pub trait ZoneStore {
    fn get_zone(&self, id: ZoneId) -> Result<Option<Zone>, StoreError>;

    fn list_zones(&self) -> Result<Vec<Zone>, StoreError>;
}

pub trait RouteStore {
    fn create_route(&self, route: &NewRoute) -> Result<RouteId, StoreError>;

    /// The courier's active routes, used for workload accounting.
    fn routes_for_courier(&self, id: CourierId) -> Result<Vec<RouteRecord>, StoreError>;
}

/// Everything the dispatch engines read and write.
pub trait DispatchStore: OrderStore + CourierStore + ZoneStore + RouteStore {}

impl<T> DispatchStore for T where T: OrderStore + CourierStore + ZoneStore + RouteStore {}

/// Free-text address search. The first hit wins; no hit is `Ok(None)`.
pub trait GeocodingProvider {
    fn search(&self, query: &str) -> Result<Option<GeoPoint>, ProviderError>;
}

impl<T: GeocodingProvider + ?Sized> GeocodingProvider for &T {
    fn search(&self, query: &str) -> Result<Option<GeoPoint>, ProviderError> {
        (**self).search(query)
    }
}

/// Shortest driving path between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadLeg {
    pub distance_m: f64,
    pub duration_s: f64,
}

pub trait RoutingProvider {
    fn leg(&self, from: GeoPoint, to: GeoPoint) -> Result<RoadLeg, ProviderError>;

    /// Full driving path through `points` in the given order.
    fn path_geometry(&self, points: &[GeoPoint]) -> Result<Vec<GeoPoint>, ProviderError>;
}

impl<T: RoutingProvider + ?Sized> RoutingProvider for &T {
    fn leg(&self, from: GeoPoint, to: GeoPoint) -> Result<RoadLeg, ProviderError> {
        (**self).leg(from, to)
    }

    fn path_geometry(&self, points: &[GeoPoint]) -> Result<Vec<GeoPoint>, ProviderError> {
        (**self).path_geometry(points)
    }
}
