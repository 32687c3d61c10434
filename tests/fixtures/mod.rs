//! Test fixtures for courier-dispatch.
//!
//! Provides:
//! - Real Rīga locations and zones (from OpenStreetMap)
//! - An in-memory store implementing every store trait
//! - Geocoding and routing providers that never touch the network

#![allow(dead_code)]

pub mod riga_locations;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use courier_dispatch::distance::{DistanceOracle, OracleConfig};
use courier_dispatch::geocode::{GeoResolver, GeocoderConfig};
use courier_dispatch::haversine::haversine_km;
use courier_dispatch::model::{
    Courier, CourierId, GeoPoint, NewRoute, Order, OrderId, OrderStatus, Role, RouteId,
    RouteRecord, Vehicle, Zone, ZoneId,
};
use courier_dispatch::traits::{
    CourierStore, GeocodingProvider, OrderStore, RoadLeg, RouteStore, RoutingProvider, ZoneStore,
};
use courier_dispatch::{Dispatcher, ProviderError, StoreError};
use jiff::civil::Date;
use parking_lot::Mutex;

pub use riga_locations::*;

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
struct State {
    orders: BTreeMap<OrderId, Order>,
    couriers: Vec<Courier>,
    vehicles: Vec<Vehicle>,
    zones: Vec<Zone>,
    routes: Vec<RouteRecord>,
    created: Vec<NewRoute>,
    failing_routes: HashSet<CourierId>,
    failing_status: HashSet<OrderId>,
}

/// Store backed by plain collections. Couriers and zones keep insertion order.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(self, order: Order) -> Self {
        self.state.lock().orders.insert(order.id, order);
        self
    }

    pub fn with_courier(self, id: CourierId, username: &str, zone_id: Option<ZoneId>) -> Self {
        self.state.lock().couriers.push(Courier {
            id,
            username: username.to_string(),
            role: Role::Courier,
            zone_id,
        });
        self
    }

    pub fn with_dispatcher_user(self, id: CourierId, username: &str) -> Self {
        self.state.lock().couriers.push(Courier {
            id,
            username: username.to_string(),
            role: Role::Dispatcher,
            zone_id: None,
        });
        self
    }

    pub fn with_vehicle(self, courier_id: CourierId, max_size: f64, max_weight: f64) -> Self {
        let mut state = self.state.lock();
        let id = state.vehicles.len() as i64 + 100;
        state.vehicles.push(Vehicle {
            id,
            plate_number: Some(format!("AB-{id}")),
            max_size,
            max_weight,
            courier_id,
        });
        drop(state);
        self
    }

    pub fn with_zone(self, zone: Zone) -> Self {
        self.state.lock().zones.push(zone);
        self
    }

    /// Existing active route worth `minutes` (or unestimated when `None`).
    pub fn with_route(self, courier_id: CourierId, minutes: Option<u32>) -> Self {
        let mut state = self.state.lock();
        let id = state.routes.len() as i64 + 1;
        state.routes.push(RouteRecord {
            id,
            courier_id,
            order_count: 1,
            distance_m: 5_000,
            estimated_time_minutes: minutes,
            status: courier_dispatch::model::RouteStatus::HandedToCourier,
            delivery_date: None,
        });
        drop(state);
        self
    }

    /// Make `create_route` fail for this courier.
    pub fn failing_routes_for(self, courier_id: CourierId) -> Self {
        self.state.lock().failing_routes.insert(courier_id);
        self
    }

    /// Make `update_status` fail for this order.
    pub fn failing_status_for(self, order_id: OrderId) -> Self {
        self.state.lock().failing_status.insert(order_id);
        self
    }

    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.state.lock().orders.get(&id).cloned()
    }

    pub fn created_routes(&self) -> Vec<NewRoute> {
        self.state.lock().created.clone()
    }
}

impl OrderStore for InMemoryStore {
    fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.state.lock().orders.get(&id).cloned())
    }

    fn list_pending_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .state
            .lock()
            .orders
            .values()
            .filter(|order| order.is_pending())
            .cloned()
            .collect())
    }

    fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        if state.failing_status.contains(&id) {
            return Err(StoreError::Backend("status update rejected".to_string()));
        }
        let order = state
            .orders
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "order", id })?;
        order.status = Some(status);
        Ok(())
    }

    fn update_delivery_date(&self, id: OrderId, date: Date) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let order = state
            .orders
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "order", id })?;
        order.delivery_date = Some(date);
        Ok(())
    }
}

impl CourierStore for InMemoryStore {
    fn get_courier(&self, id: CourierId) -> Result<Option<Courier>, StoreError> {
        Ok(self.state.lock().couriers.iter().find(|c| c.id == id).cloned())
    }

    fn list_couriers(&self, role: Role) -> Result<Vec<Courier>, StoreError> {
        Ok(self
            .state
            .lock()
            .couriers
            .iter()
            .filter(|c| c.role == role)
            .cloned()
            .collect())
    }

    fn vehicle_for_courier(&self, id: CourierId) -> Result<Option<Vehicle>, StoreError> {
        Ok(self
            .state
            .lock()
            .vehicles
            .iter()
            .find(|v| v.courier_id == id)
            .cloned())
    }
}

impl ZoneStore for InMemoryStore {
    fn get_zone(&self, id: ZoneId) -> Result<Option<Zone>, StoreError> {
        Ok(self.state.lock().zones.iter().find(|z| z.id == id).cloned())
    }

    fn list_zones(&self) -> Result<Vec<Zone>, StoreError> {
        Ok(self.state.lock().zones.clone())
    }
}

impl RouteStore for InMemoryStore {
    fn create_route(&self, route: &NewRoute) -> Result<RouteId, StoreError> {
        let mut state = self.state.lock();
        if state.failing_routes.contains(&route.courier_id) {
            return Err(StoreError::Backend("connection reset".to_string()));
        }

        let id = state.routes.len() as i64 + 1;
        state.routes.push(RouteRecord {
            id,
            courier_id: route.courier_id,
            order_count: route.order_count,
            distance_m: route.distance_m,
            estimated_time_minutes: Some(route.eta_minutes),
            status: route.status,
            delivery_date: route.delivery_date,
        });
        state.created.push(route.clone());
        Ok(id)
    }

    fn routes_for_courier(&self, id: CourierId) -> Result<Vec<RouteRecord>, StoreError> {
        Ok(self
            .state
            .lock()
            .routes
            .iter()
            .filter(|r| r.courier_id == id)
            .cloned()
            .collect())
    }
}

pub fn order(id: OrderId, address: &str, size: f64, weight: f64) -> Order {
    Order {
        id,
        address: Some(address.to_string()),
        size,
        weight,
        status: None,
        delivery_date: None,
    }
}

pub fn order_without_address(id: OrderId, size: f64, weight: f64) -> Order {
    Order {
        id,
        address: None,
        size,
        weight,
        status: None,
        delivery_date: None,
    }
}

// ============================================================================
// Providers
// ============================================================================

/// Answers for known addresses; everything else finds nothing.
#[derive(Default)]
pub struct MapGeocoder {
    places: Vec<(String, GeoPoint)>,
    queries: Mutex<Vec<String>>,
}

impl MapGeocoder {
    pub fn new(locations: &[Location]) -> Self {
        Self {
            places: locations
                .iter()
                .map(|loc| (loc.address.to_string(), loc.point()))
                .collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn riga() -> Self {
        Self::new(&all_locations())
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().len()
    }
}

impl GeocodingProvider for MapGeocoder {
    fn search(&self, query: &str) -> Result<Option<GeoPoint>, ProviderError> {
        self.queries.lock().push(query.to_string());
        Ok(self
            .places
            .iter()
            .find(|(address, _)| query.starts_with(&format!("{address},")))
            .map(|(_, point)| *point))
    }
}

/// Geocoder whose every call times out.
pub struct FailingGeocoder;

impl GeocodingProvider for FailingGeocoder {
    fn search(&self, _query: &str) -> Result<Option<GeoPoint>, ProviderError> {
        Err(ProviderError::Timeout)
    }
}

/// Router whose every call times out.
pub struct FailingRouter;

impl RoutingProvider for FailingRouter {
    fn leg(&self, _from: GeoPoint, _to: GeoPoint) -> Result<RoadLeg, ProviderError> {
        Err(ProviderError::Timeout)
    }

    fn path_geometry(&self, _points: &[GeoPoint]) -> Result<Vec<GeoPoint>, ProviderError> {
        Err(ProviderError::Timeout)
    }
}

/// Router answering with great-circle legs at 36 km/h, counting calls per pair.
#[derive(Default)]
pub struct StraightLineRouter {
    legs: Mutex<HashMap<String, usize>>,
    geometry_calls: Mutex<usize>,
}

impl StraightLineRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leg_calls(&self) -> usize {
        self.legs.lock().values().sum()
    }

    /// Highest number of calls made for any single directed pair.
    pub fn max_calls_per_pair(&self) -> usize {
        self.legs.lock().values().copied().max().unwrap_or(0)
    }

    pub fn geometry_calls(&self) -> usize {
        *self.geometry_calls.lock()
    }
}

impl RoutingProvider for StraightLineRouter {
    fn leg(&self, from: GeoPoint, to: GeoPoint) -> Result<RoadLeg, ProviderError> {
        *self
            .legs
            .lock()
            .entry(format!("{}-{}", from.key(), to.key()))
            .or_default() += 1;

        let distance_m = haversine_km(from, to) * 1000.0;
        Ok(RoadLeg {
            distance_m,
            duration_s: distance_m / 10.0,
        })
    }

    fn path_geometry(&self, points: &[GeoPoint]) -> Result<Vec<GeoPoint>, ProviderError> {
        *self.geometry_calls.lock() += 1;
        Ok(points.to_vec())
    }
}

// ============================================================================
// Wiring
// ============================================================================

/// Default geocoder config without the rate-limit pause.
pub fn geocoder_config() -> GeocoderConfig {
    GeocoderConfig {
        rate_limit_pause: Duration::ZERO,
        ..GeocoderConfig::default()
    }
}

pub fn resolver<G: GeocodingProvider>(provider: G) -> GeoResolver<G> {
    GeoResolver::new(provider, geocoder_config())
}

pub fn oracle<R: RoutingProvider>(provider: R) -> DistanceOracle<R> {
    DistanceOracle::new(provider, OracleConfig::default())
}

/// Dispatcher over `store` with the Rīga geocoder and straight-line routing.
pub fn dispatcher(
    store: InMemoryStore,
) -> Dispatcher<InMemoryStore, MapGeocoder, StraightLineRouter> {
    Dispatcher::new(
        store,
        resolver(MapGeocoder::riga()),
        oracle(StraightLineRouter::new()),
    )
}
