//! Which couriers can take a given set of orders.
//!
//! A courier qualifies when they have a vehicle large enough for the whole
//! set, every geocoded order lies in their zone (when the zone is complete),
//! and the new route keeps them within the daily workload cap. Couriers are
//! checked in parallel; the result keeps the store's courier order.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{DispatchError, StoreError};
use crate::geocode::GeoResolver;
use crate::model::{
    Courier, CourierId, GeoPoint, OrderId, Role, RouteRecord, Vehicle, VehicleId, Zone, ZoneId,
};
use crate::solver::round_to;
use crate::traits::{DispatchStore, GeocodingProvider};
use crate::zone;

#[derive(Debug, Clone)]
pub struct WorkloadPolicy {
    pub max_hours_per_day: f64,
    /// Rough cost of a new route per order it carries.
    pub hours_per_new_order: f64,
    /// Charged for existing routes without a time estimate.
    pub hours_per_unestimated_route: f64,
}

impl Default for WorkloadPolicy {
    fn default() -> Self {
        Self {
            max_hours_per_day: 8.0,
            hours_per_new_order: 0.5,
            hours_per_unestimated_route: 1.5,
        }
    }
}

impl WorkloadPolicy {
    pub fn route_hours(&self, route: &RouteRecord) -> f64 {
        match route.estimated_time_minutes {
            Some(minutes) if minutes > 0 => f64::from(minutes) / 60.0,
            _ => self.hours_per_unestimated_route,
        }
    }

    pub fn current_hours(&self, routes: &[RouteRecord]) -> f64 {
        routes.iter().map(|route| self.route_hours(route)).sum()
    }

    pub fn new_route_hours(&self, order_count: usize) -> f64 {
        order_count as f64 * self.hours_per_new_order
    }

    /// Landing exactly on the cap is allowed.
    pub fn exceeds_cap(&self, total_hours: f64) -> bool {
        total_hours > self.max_hours_per_day
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub plate_number: Option<String>,
    pub max_size: f64,
    pub max_weight: f64,
}

impl From<&Vehicle> for VehicleSnapshot {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id,
            plate_number: vehicle.plate_number.clone(),
            max_size: vehicle.max_size,
            max_weight: vehicle.max_weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuitabilityRecord {
    pub courier_id: CourierId,
    pub username: String,
    pub zone_id: Option<ZoneId>,
    pub zone_name: String,
    pub vehicle: VehicleSnapshot,
    pub current_routes: usize,
    pub current_hours: f64,
    pub estimated_new_hours: f64,
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourierStatus {
    pub courier_id: CourierId,
    pub username: String,
    pub vehicle: Option<VehicleSnapshot>,
    pub routes_today: usize,
    pub estimated_hours: f64,
}

/// Why a courier was left out.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    NoVehicle,
    OverCapacity { size: f64, weight: f64 },
    OutsideZone { zone: String, point: GeoPoint },
    Overloaded { total_hours: f64 },
}

#[derive(Debug)]
enum Verdict {
    Suitable(SuitabilityRecord),
    Rejected(Rejection),
}

/// Aggregate requirements of the order set.
#[derive(Debug, Clone)]
struct Demand {
    size: f64,
    weight: f64,
    /// Orders found in the store; unknown ids add no workload.
    order_count: usize,
    /// Geocoded delivery points; orders without an address are absent.
    points: Vec<GeoPoint>,
}

pub struct CourierSuitabilityEngine<'a, S, G> {
    store: &'a S,
    geocoder: &'a GeoResolver<G>,
    policy: WorkloadPolicy,
}

impl<'a, S, G> CourierSuitabilityEngine<'a, S, G>
where
    S: DispatchStore + Sync,
    G: GeocodingProvider,
{
    pub fn new(store: &'a S, geocoder: &'a GeoResolver<G>, policy: WorkloadPolicy) -> Self {
        Self {
            store,
            geocoder,
            policy,
        }
    }

    /// Couriers able to take every order in `order_ids` on one route.
    ///
    /// Unknown order ids are ignored; an empty or fully unknown set yields
    /// no couriers. A store failure while checking one courier skips that
    /// courier.
    pub fn find_suitable(
        &self,
        order_ids: &[OrderId],
        city: Option<&str>,
    ) -> Result<Vec<SuitabilityRecord>, DispatchError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut orders = Vec::with_capacity(order_ids.len());
        for &id in order_ids {
            if let Some(order) = self.store.get_order(id)? {
                orders.push(order);
            }
        }
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let demand = Demand {
            size: orders.iter().map(|order| order.size).sum(),
            weight: orders.iter().map(|order| order.weight).sum(),
            order_count: orders.len(),
            points: orders
                .iter()
                .filter_map(|order| order.address.as_deref())
                .map(|address| self.geocoder.resolve(address, city))
                .collect(),
        };

        let couriers = self.store.list_couriers(Role::Courier)?;
        let store = self.store;
        let policy = &self.policy;

        let verdicts = couriers
            .par_iter()
            .map(|courier| (courier, assess(store, policy, courier, &demand)))
            .collect::<Vec<_>>();

        let mut suitable = Vec::new();
        for (courier, verdict) in verdicts {
            match verdict {
                Ok(Verdict::Suitable(record)) => {
                    info!(courier = courier.id, username = %courier.username, "courier suitable");
                    suitable.push(record);
                }
                Ok(Verdict::Rejected(reason)) => {
                    info!(courier = courier.id, username = %courier.username, ?reason, "courier skipped");
                }
                Err(err) => {
                    error!(courier = courier.id, error = %err, "courier check failed");
                }
            }
        }

        Ok(suitable)
    }

    /// Vehicle and workload snapshot for one courier.
    pub fn status(&self, courier_id: CourierId) -> Result<CourierStatus, DispatchError> {
        let courier = self
            .store
            .get_courier(courier_id)?
            .ok_or(DispatchError::CourierNotFound(courier_id))?;
        let vehicle = self.store.vehicle_for_courier(courier_id)?;
        let routes = self.store.routes_for_courier(courier_id)?;

        Ok(CourierStatus {
            courier_id,
            username: courier.username,
            vehicle: vehicle.as_ref().map(VehicleSnapshot::from),
            routes_today: routes.len(),
            estimated_hours: round_to(self.policy.current_hours(&routes), 1),
        })
    }
}

fn assess<S: DispatchStore>(
    store: &S,
    policy: &WorkloadPolicy,
    courier: &Courier,
    demand: &Demand,
) -> Result<Verdict, StoreError> {
    let Some(vehicle) = store.vehicle_for_courier(courier.id)? else {
        return Ok(Verdict::Rejected(Rejection::NoVehicle));
    };

    if demand.size > vehicle.max_size || demand.weight > vehicle.max_weight {
        return Ok(Verdict::Rejected(Rejection::OverCapacity {
            size: demand.size,
            weight: demand.weight,
        }));
    }

    let zone: Option<Zone> = match courier.zone_id {
        Some(id) => store.get_zone(id)?,
        None => None,
    };
    if let Some(zone) = zone.as_ref().filter(|zone| zone.bounds().is_some()) {
        let outside = demand
            .points
            .iter()
            .find(|point| !zone::contains(**point, Some(zone)));
        if let Some(&point) = outside {
            return Ok(Verdict::Rejected(Rejection::OutsideZone {
                zone: zone.name.clone(),
                point,
            }));
        }
    }

    let routes = store.routes_for_courier(courier.id)?;
    let current_hours = policy.current_hours(&routes);
    let new_hours = policy.new_route_hours(demand.order_count);
    let total_hours = current_hours + new_hours;
    if policy.exceeds_cap(total_hours) {
        return Ok(Verdict::Rejected(Rejection::Overloaded { total_hours }));
    }

    let zone_name = match (courier.zone_id, &zone) {
        (None, _) => "No zone".to_string(),
        (Some(_), Some(zone)) => zone.name.clone(),
        (Some(_), None) => "Unknown".to_string(),
    };

    Ok(Verdict::Suitable(SuitabilityRecord {
        courier_id: courier.id,
        username: courier.username.clone(),
        zone_id: courier.zone_id,
        zone_name,
        vehicle: VehicleSnapshot::from(&vehicle),
        current_routes: routes.len(),
        current_hours: round_to(current_hours, 1),
        estimated_new_hours: round_to(new_hours, 1),
        total_hours: round_to(total_hours, 1),
    }))
}
