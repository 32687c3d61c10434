//! Route construction: multi-start nearest neighbor over road distances.
//!
//! Without a fixed start every stop is tried as the first stop and the
//! shortest traversal wins (first found on ties), so one route costs
//! O(n³) distance lookups. The oracle caches every pair, so repeated pairs
//! within a computation never go back to the network.

use serde::Serialize;
use tracing::debug;

use crate::distance::DistanceOracle;
use crate::error::DispatchError;
use crate::geocode::GeoResolver;
use crate::haversine::path_length_km;
use crate::model::{GeoPoint, Stop};
use crate::polyline::Polyline;
use crate::traits::{GeocodingProvider, Id, RoutingProvider};

#[derive(Debug, Clone)]
pub struct RouteOptions {
    /// Fetch the full driving path for the chosen order.
    pub include_geometry: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            include_geometry: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult<I> {
    pub visiting_order: Vec<I>,
    /// Rounded to 3 decimals.
    pub total_distance_km: f64,
    pub total_time_minutes: u32,
    /// Stop coordinates in visiting order.
    pub ordered_points: Vec<GeoPoint>,
    pub geometry: Option<Polyline>,
}

impl<I> RouteResult<I> {
    pub fn empty() -> Self {
        Self {
            visiting_order: Vec::new(),
            total_distance_km: 0.0,
            total_time_minutes: 0,
            ordered_points: Vec::new(),
            geometry: None,
        }
    }
}

#[derive(Debug, Clone)]
struct Located<'s, I> {
    id: &'s I,
    point: GeoPoint,
}

#[derive(Debug)]
struct Traversal<I> {
    order: Vec<I>,
    points: Vec<GeoPoint>,
    distance_km: f64,
    time_minutes: u32,
}

pub struct RouteBuilder<'a, G, R> {
    geocoder: &'a GeoResolver<G>,
    oracle: &'a DistanceOracle<R>,
    options: RouteOptions,
}

impl<'a, G, R> RouteBuilder<'a, G, R>
where
    G: GeocodingProvider,
    R: RoutingProvider,
{
    pub fn new(
        geocoder: &'a GeoResolver<G>,
        oracle: &'a DistanceOracle<R>,
        options: RouteOptions,
    ) -> Self {
        Self {
            geocoder,
            oracle,
            options,
        }
    }

    /// Order `stops` into a route, optionally from a fixed `start`.
    ///
    /// Stops without coordinates are geocoded within `city`. A stop with
    /// neither coordinates nor an address fails the whole computation.
    pub fn compute_route<I: Id>(
        &self,
        stops: &[Stop<I>],
        start: Option<&Stop<I>>,
        city: Option<&str>,
    ) -> Result<RouteResult<I>, DispatchError> {
        if stops.is_empty() {
            return Ok(RouteResult::empty());
        }

        let located = stops
            .iter()
            .map(|stop| {
                Ok(Located {
                    id: &stop.id,
                    point: self.locate(stop, city)?,
                })
            })
            .collect::<Result<Vec<_>, DispatchError>>()?;

        let best = match start {
            Some(start) => {
                let start = Located {
                    id: &start.id,
                    point: self.locate(start, city)?,
                };
                self.traverse(&start, &located)
            }
            None => {
                let mut best: Option<Traversal<I>> = None;
                for start in &located {
                    let candidate = self.traverse(start, &located);
                    debug!(start = ?start.id, km = candidate.distance_km, "nearest neighbor pass");
                    if best.as_ref().is_none_or(|b| candidate.distance_km < b.distance_km) {
                        best = Some(candidate);
                    }
                }
                match best {
                    Some(best) => best,
                    None => return Ok(RouteResult::empty()),
                }
            }
        };

        let geometry = (self.options.include_geometry && best.points.len() >= 2)
            .then(|| self.oracle.full_route_geometry(&best.points));

        Ok(RouteResult {
            visiting_order: best.order,
            total_distance_km: best.distance_km,
            total_time_minutes: best.time_minutes,
            ordered_points: best.points,
            geometry,
        })
    }

    fn locate<I: Id>(&self, stop: &Stop<I>, city: Option<&str>) -> Result<GeoPoint, DispatchError> {
        if let Some(point) = stop.location {
            return Ok(point);
        }
        match &stop.address {
            Some(address) => Ok(self.geocoder.resolve(address, city)),
            None => Err(DispatchError::MissingCoordinates {
                stop: format!("{:?}", stop.id),
            }),
        }
    }

    /// One greedy pass: always drive to the closest remaining stop.
    fn traverse<I: Id>(&self, start: &Located<'_, I>, stops: &[Located<'_, I>]) -> Traversal<I> {
        let mut current = start.point;
        let mut order = vec![start.id.clone()];
        let mut points = vec![start.point];
        let mut distance_km = 0.0;
        let mut time_minutes = 0;

        let mut remaining = stops
            .iter()
            .filter(|stop| stop.id != start.id)
            .collect::<Vec<_>>();

        while let Some(first) = remaining.first() {
            let mut best_idx = 0;
            let mut best_km = self.oracle.road_distance_km(current, first.point);
            for (idx, candidate) in remaining.iter().enumerate().skip(1) {
                let km = self.oracle.road_distance_km(current, candidate.point);
                if km < best_km {
                    best_km = km;
                    best_idx = idx;
                }
            }

            let next = remaining.remove(best_idx);
            distance_km += best_km;
            time_minutes += self.oracle.road_time_minutes(current, next.point);
            current = next.point;
            order.push(next.id.clone());
            points.push(next.point);
        }

        Traversal {
            order,
            points,
            distance_km: round_to(distance_km, 3),
            time_minutes,
        }
    }
}

/// 2-opt refinement over a fixed permutation using straight-line length.
///
/// Reverses segments `[i, j)` and keeps the first reversal that strictly
/// shortens the route, scanning on from there until a full sweep finds no
/// improvement. Orders shorter than four stops are returned unchanged.
///
/// # Panics
///
/// Panics if `order` holds an index outside `coordinates`.
pub fn two_opt(order: &[usize], coordinates: &[GeoPoint]) -> Vec<usize> {
    let mut order = order.to_vec();
    if order.len() < 4 {
        return order;
    }

    let mut best = route_length_km(&order, coordinates);
    let mut improved = true;
    while improved {
        improved = false;
        for i in 1..order.len() - 2 {
            for j in i + 1..order.len() {
                if j - i == 1 {
                    continue;
                }
                let mut candidate = order.clone();
                candidate[i..j].reverse();
                let length = route_length_km(&candidate, coordinates);
                if length < best {
                    order = candidate;
                    best = length;
                    improved = true;
                }
            }
        }
    }

    order
}

fn route_length_km(order: &[usize], coordinates: &[GeoPoint]) -> f64 {
    let points = order.iter().map(|&idx| coordinates[idx]).collect::<Vec<_>>();
    path_length_km(&points)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
