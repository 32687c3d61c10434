//! Greedy assignment of pending orders to couriers.
//!
//! Couriers are visited in ascending id order. Each takes, in a single
//! left-to-right scan, every still-unclaimed order that fits in what is left
//! of their vehicle, and gets one nearest-neighbor route over them. Nothing
//! is rolled back: a route created for one courier stands even if a later
//! courier fails.

use std::collections::HashSet;

use jiff::civil::Date;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::distance::DistanceOracle;
use crate::error::{DispatchError, StoreError};
use crate::geocode::GeoResolver;
use crate::model::{
    Courier, CourierId, GeoPoint, NewRoute, Order, OrderId, OrderStatus, Role, RouteId,
    RouteStatus, Stop, Vehicle, Zone,
};
use crate::solver::{RouteBuilder, RouteOptions, RouteResult};
use crate::traits::{DispatchStore, GeocodingProvider, RoutingProvider};
use crate::zone;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourierAssignment {
    pub courier_id: CourierId,
    pub courier_name: String,
    pub route_id: RouteId,
    /// In visiting order.
    pub order_ids: Vec<OrderId>,
    pub orders_count: usize,
    pub distance_km: f64,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentSummary {
    pub success: bool,
    pub routes_created: usize,
    pub orders_assigned: usize,
    pub unassigned_order_ids: Vec<OrderId>,
    pub details: Vec<CourierAssignment>,
    pub message: String,
}

pub struct AutoAssignEngine<'a, S, G, R> {
    store: &'a S,
    geocoder: &'a GeoResolver<G>,
    oracle: &'a DistanceOracle<R>,
    options: RouteOptions,
}

impl<'a, S, G, R> AutoAssignEngine<'a, S, G, R>
where
    S: DispatchStore,
    G: GeocodingProvider,
    R: RoutingProvider,
{
    pub fn new(
        store: &'a S,
        geocoder: &'a GeoResolver<G>,
        oracle: &'a DistanceOracle<R>,
        options: RouteOptions,
    ) -> Self {
        Self {
            store,
            geocoder,
            oracle,
            options,
        }
    }

    /// Distribute every pending order over the couriers.
    ///
    /// Only failing to list orders or couriers is an error; per-courier
    /// failures are logged and the pass moves on.
    pub fn assign_all(&self, city: Option<&str>) -> Result<AssignmentSummary, DispatchError> {
        let mut pending = self.store.list_pending_orders()?;
        pending.retain(Order::is_pending);
        pending.sort_by_key(|order| order.id);

        if pending.is_empty() {
            return Ok(AssignmentSummary {
                success: true,
                routes_created: 0,
                orders_assigned: 0,
                unassigned_order_ids: Vec::new(),
                details: Vec::new(),
                message: "No pending orders to assign".to_string(),
            });
        }
        let pending_ids = pending.iter().map(|order| order.id).collect::<Vec<_>>();
        info!(count = pending.len(), ids = ?pending_ids, "pending orders");

        let mut couriers = self.store.list_couriers(Role::Courier)?;
        if couriers.is_empty() {
            return Ok(AssignmentSummary {
                success: false,
                routes_created: 0,
                orders_assigned: 0,
                unassigned_order_ids: pending_ids,
                details: Vec::new(),
                message: "No couriers available".to_string(),
            });
        }
        couriers.sort_by_key(|courier| courier.id);

        let mut claimed: HashSet<OrderId> = HashSet::new();
        let mut details = Vec::new();

        for courier in &couriers {
            let vehicle = match self.store.vehicle_for_courier(courier.id) {
                Ok(Some(vehicle)) => vehicle,
                Ok(None) => {
                    info!(courier = courier.id, username = %courier.username, "no vehicle, skipping");
                    continue;
                }
                Err(err) => {
                    error!(courier = courier.id, error = %err, "vehicle lookup failed, skipping");
                    continue;
                }
            };

            let available = pending
                .iter()
                .filter(|order| !claimed.contains(&order.id))
                .collect::<Vec<_>>();
            if available.is_empty() {
                info!("every pending order is claimed");
                break;
            }

            let zone = self.courier_zone(courier);
            let selected = self.select_orders(&available, &vehicle, zone.as_ref(), city);
            if selected.is_empty() {
                info!(courier = courier.id, username = %courier.username, "no orders fit");
                continue;
            }

            match self.create_courier_route(courier, &selected, city, None) {
                Ok(assignment) => {
                    claimed.extend(assignment.order_ids.iter().copied());
                    info!(
                        courier = courier.id,
                        route = assignment.route_id,
                        orders = assignment.orders_count,
                        claimed = claimed.len(),
                        "route created"
                    );
                    details.push(assignment);
                }
                Err(err) => {
                    error!(courier = courier.id, username = %courier.username, error = %err, "route creation failed");
                }
            }
        }

        let unassigned_order_ids = pending_ids
            .into_iter()
            .filter(|id| !claimed.contains(id))
            .collect::<Vec<_>>();

        Ok(AssignmentSummary {
            success: true,
            routes_created: details.len(),
            orders_assigned: claimed.len(),
            message: format!(
                "Created {} routes, assigned {} orders, {} unassigned",
                details.len(),
                claimed.len(),
                unassigned_order_ids.len()
            ),
            unassigned_order_ids,
            details,
        })
    }

    /// Route the given orders for one courier, whatever their capacity.
    ///
    /// Orders are sequenced in ascending id before routing. Unlike
    /// [`assign_all`](Self::assign_all), a failure to persist the route is
    /// returned to the caller.
    pub fn assign_to_courier(
        &self,
        order_ids: &[OrderId],
        courier_id: CourierId,
        city: Option<&str>,
        delivery_date: Option<Date>,
    ) -> Result<CourierAssignment, DispatchError> {
        if order_ids.is_empty() {
            return Err(DispatchError::Validation("order_ids must not be empty".to_string()));
        }

        let courier = self
            .store
            .get_courier(courier_id)?
            .ok_or(DispatchError::CourierNotFound(courier_id))?;

        let mut orders = Vec::with_capacity(order_ids.len());
        for &id in order_ids {
            let order = self.store.get_order(id)?.ok_or(DispatchError::OrderNotFound(id))?;
            orders.push(order);
        }
        orders.sort_by_key(|order| order.id);

        let selected = orders.iter().map(|order| (order, None)).collect::<Vec<_>>();
        self.create_courier_route(&courier, &selected, city, delivery_date)
    }

    fn courier_zone(&self, courier: &Courier) -> Option<Zone> {
        let id = courier.zone_id?;
        match self.store.get_zone(id) {
            Ok(zone) => zone,
            Err(err) => {
                warn!(courier = courier.id, zone = id, error = %err, "zone lookup failed");
                None
            }
        }
    }

    /// Single greedy scan: take each order that still fits, never backtrack.
    ///
    /// Orders without an address are skipped. Orders outside the courier's
    /// zone are still taken, with a warning.
    fn select_orders<'o>(
        &self,
        candidates: &[&'o Order],
        vehicle: &Vehicle,
        zone: Option<&Zone>,
        city: Option<&str>,
    ) -> Vec<(&'o Order, Option<GeoPoint>)> {
        let mut selected = Vec::new();
        let mut size = 0.0;
        let mut weight = 0.0;

        for &order in candidates {
            let Some(address) = order.address.as_deref() else {
                warn!(order = order.id, "order has no address, skipping");
                continue;
            };
            let point = self.geocoder.resolve(address, city);

            if size + order.size > vehicle.max_size {
                info!(order = order.id, needed = size + order.size, capacity = vehicle.max_size, "size limit");
                continue;
            }
            if weight + order.weight > vehicle.max_weight {
                info!(order = order.id, needed = weight + order.weight, capacity = vehicle.max_weight, "weight limit");
                continue;
            }

            if let Some(zone) = zone {
                if !zone::contains(point, Some(zone)) {
                    warn!(
                        order = order.id,
                        lat = point.lat,
                        lng = point.lng,
                        zone = %zone.name,
                        "order outside courier zone, including anyway"
                    );
                }
            }

            size += order.size;
            weight += order.weight;
            selected.push((order, Some(point)));
        }

        selected
    }

    fn create_courier_route(
        &self,
        courier: &Courier,
        orders: &[(&Order, Option<GeoPoint>)],
        city: Option<&str>,
        delivery_date: Option<Date>,
    ) -> Result<CourierAssignment, DispatchError> {
        let stops = orders
            .iter()
            .map(|&(order, point)| Stop {
                id: order.id,
                address: order.address.clone(),
                location: point,
                size: order.size,
                weight: order.weight,
            })
            .collect::<Vec<_>>();

        let route = RouteBuilder::new(self.geocoder, self.oracle, self.options.clone())
            .compute_route(&stops, None, city)?;

        let new_route = new_route_for(courier.id, &route, orders, delivery_date);
        let route_id = self.store.create_route(&new_route).inspect_err(|err| {
            error!(courier = courier.id, attempted = ?new_route, error = %err, "failed to save route");
        })?;

        for &id in &new_route.order_ids {
            if let Err(err) = self.mark_assigned(id, delivery_date) {
                error!(order = id, route = route_id, error = %err, "failed to update order");
            }
        }

        Ok(CourierAssignment {
            courier_id: courier.id,
            courier_name: courier.username.clone(),
            route_id,
            orders_count: new_route.order_ids.len(),
            order_ids: new_route.order_ids,
            distance_km: route.total_distance_km,
            duration_minutes: route.total_time_minutes,
        })
    }

    fn mark_assigned(&self, id: OrderId, delivery_date: Option<Date>) -> Result<(), StoreError> {
        self.store.update_status(id, OrderStatus::Assigned)?;
        if let Some(date) = delivery_date {
            self.store.update_delivery_date(id, date)?;
        }
        Ok(())
    }
}

fn new_route_for(
    courier_id: CourierId,
    route: &RouteResult<OrderId>,
    orders: &[(&Order, Option<GeoPoint>)],
    delivery_date: Option<Date>,
) -> NewRoute {
    let address_of = |id: &OrderId| {
        orders
            .iter()
            .find(|(order, _)| order.id == *id)
            .and_then(|(order, _)| order.address.clone())
            .unwrap_or_default()
    };

    NewRoute {
        courier_id,
        order_count: route.visiting_order.len(),
        distance_m: (route.total_distance_km * 1000.0) as u64,
        visiting_order: route.visiting_order.iter().map(address_of).collect(),
        order_ids: route.visiting_order.clone(),
        status: RouteStatus::HandedToCourier,
        eta_minutes: route.total_time_minutes,
        delivery_date,
    }
}
