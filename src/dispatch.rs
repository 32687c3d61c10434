//! Entry point tying the store, geocoder and distance oracle together.
//!
//! Input validation happens here; the engines behind it assume well-formed
//! requests.

use jiff::civil::Date;
use serde::Serialize;
use tracing::info;

use crate::assign::{AssignmentSummary, AutoAssignEngine, CourierAssignment};
use crate::config::DispatchConfig;
use crate::distance::DistanceOracle;
use crate::error::DispatchError;
use crate::geocode::GeoResolver;
use crate::model::{CourierId, GeoPoint, OrderId, Stop, ZoneId};
use crate::nominatim::NominatimClient;
use crate::osrm::OsrmClient;
use crate::solver::{RouteBuilder, RouteOptions, RouteResult};
use crate::suitability::{CourierStatus, CourierSuitabilityEngine, SuitabilityRecord, WorkloadPolicy};
use crate::traits::{DispatchStore, GeocodingProvider, Id, RoutingProvider};
use crate::zone;

pub const UNKNOWN_ZONE: &str = "Unknown Zone";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderZoneInfo {
    pub order_id: OrderId,
    pub address: Option<String>,
    pub location: GeoPoint,
    pub zone_id: Option<ZoneId>,
    pub zone_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub id: ZoneId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderZoneReport {
    pub orders: Vec<OrderZoneInfo>,
    /// Distinct matched zones, in order of first appearance.
    pub zones_involved: Vec<ZoneSummary>,
}

pub struct Dispatcher<S, G, R> {
    store: S,
    geocoder: GeoResolver<G>,
    oracle: DistanceOracle<R>,
    route_options: RouteOptions,
    workload: WorkloadPolicy,
}

impl<S> Dispatcher<S, NominatimClient, OsrmClient>
where
    S: DispatchStore + Sync,
{
    /// Dispatcher backed by the Nominatim and OSRM HTTP services.
    pub fn from_config(store: S, config: DispatchConfig) -> Result<Self, DispatchError> {
        let geocoder = GeoResolver::new(NominatimClient::new(config.nominatim)?, config.geocoder);
        let oracle = DistanceOracle::new(OsrmClient::new(config.osrm)?, config.oracle);

        Ok(Self {
            store,
            geocoder,
            oracle,
            route_options: config.route,
            workload: config.workload,
        })
    }
}

impl<S, G, R> Dispatcher<S, G, R>
where
    S: DispatchStore + Sync,
    G: GeocodingProvider,
    R: RoutingProvider,
{
    pub fn new(store: S, geocoder: GeoResolver<G>, oracle: DistanceOracle<R>) -> Self {
        Self {
            store,
            geocoder,
            oracle,
            route_options: RouteOptions::default(),
            workload: WorkloadPolicy::default(),
        }
    }

    pub fn with_route_options(mut self, options: RouteOptions) -> Self {
        self.route_options = options;
        self
    }

    pub fn with_workload_policy(mut self, policy: WorkloadPolicy) -> Self {
        self.workload = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn geocoder(&self) -> &GeoResolver<G> {
        &self.geocoder
    }

    pub fn oracle(&self) -> &DistanceOracle<R> {
        &self.oracle
    }

    pub fn compute_route<I: Id>(
        &self,
        stops: &[Stop<I>],
        start: Option<&Stop<I>>,
        city: Option<&str>,
    ) -> Result<RouteResult<I>, DispatchError> {
        self.route_builder().compute_route(stops, start, city)
    }

    pub fn find_suitable_couriers(
        &self,
        order_ids: &[OrderId],
        city: Option<&str>,
    ) -> Result<Vec<SuitabilityRecord>, DispatchError> {
        require_ids(order_ids)?;
        self.suitability().find_suitable(order_ids, city)
    }

    pub fn courier_status(&self, courier_id: CourierId) -> Result<CourierStatus, DispatchError> {
        self.suitability().status(courier_id)
    }

    pub fn assign_all_pending_orders(
        &self,
        city: Option<&str>,
    ) -> Result<AssignmentSummary, DispatchError> {
        let summary = self.auto_assign().assign_all(city)?;
        info!(
            routes = summary.routes_created,
            assigned = summary.orders_assigned,
            unassigned = summary.unassigned_order_ids.len(),
            "auto-assign finished"
        );
        Ok(summary)
    }

    pub fn assign_orders_to_courier(
        &self,
        order_ids: &[OrderId],
        courier_id: CourierId,
        city: Option<&str>,
        delivery_date: Option<Date>,
    ) -> Result<CourierAssignment, DispatchError> {
        require_ids(order_ids)?;
        self.auto_assign()
            .assign_to_courier(order_ids, courier_id, city, delivery_date)
    }

    /// Zone membership of each known order. Unknown ids are skipped.
    pub fn order_zones(
        &self,
        order_ids: &[OrderId],
        city: Option<&str>,
    ) -> Result<OrderZoneReport, DispatchError> {
        require_ids(order_ids)?;
        let zones = self.store.list_zones()?;

        let mut orders = Vec::with_capacity(order_ids.len());
        let mut zones_involved: Vec<ZoneSummary> = Vec::new();
        for &id in order_ids {
            let Some(order) = self.store.get_order(id)? else {
                continue;
            };
            let location = self
                .geocoder
                .resolve(order.address.as_deref().unwrap_or_default(), city);

            let matched = zone::zone_for_point(location, &zones);
            if let Some(zone) = matched {
                if !zones_involved.iter().any(|seen| seen.id == zone.id) {
                    zones_involved.push(ZoneSummary {
                        id: zone.id,
                        name: zone.name.clone(),
                    });
                }
            }

            orders.push(OrderZoneInfo {
                order_id: order.id,
                address: order.address,
                location,
                zone_id: matched.map(|zone| zone.id),
                zone_name: matched.map_or_else(|| UNKNOWN_ZONE.to_string(), |zone| zone.name.clone()),
            });
        }

        Ok(OrderZoneReport {
            orders,
            zones_involved,
        })
    }

    /// Forget every cached geocode, distance and travel time.
    pub fn clear_caches(&self) {
        self.geocoder.clear_cache();
        self.oracle.clear_caches();
    }

    fn route_builder(&self) -> RouteBuilder<'_, G, R> {
        RouteBuilder::new(&self.geocoder, &self.oracle, self.route_options.clone())
    }

    fn suitability(&self) -> CourierSuitabilityEngine<'_, S, G> {
        CourierSuitabilityEngine::new(&self.store, &self.geocoder, self.workload.clone())
    }

    fn auto_assign(&self) -> AutoAssignEngine<'_, S, G, R> {
        AutoAssignEngine::new(
            &self.store,
            &self.geocoder,
            &self.oracle,
            self.route_options.clone(),
        )
    }
}

fn require_ids(order_ids: &[OrderId]) -> Result<(), DispatchError> {
    if order_ids.is_empty() {
        return Err(DispatchError::Validation("order_ids must not be empty".to_string()));
    }
    Ok(())
}
