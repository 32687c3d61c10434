//! Rectangular service-area matching.

use crate::model::{GeoPoint, Zone};

/// Whether `point` lies inside `zone`, bounds inclusive.
///
/// No zone means no restriction and always matches. A zone missing any of
/// its four bounds matches nothing.
pub fn contains(point: GeoPoint, zone: Option<&Zone>) -> bool {
    let Some(zone) = zone else {
        return true;
    };
    let Some(bounds) = zone.bounds() else {
        return false;
    };

    (bounds.min_lat..=bounds.max_lat).contains(&point.lat)
        && (bounds.min_lng..=bounds.max_lng).contains(&point.lng)
}

/// First zone, in the given order, that contains `point`.
pub fn zone_for_point(point: GeoPoint, zones: &[Zone]) -> Option<&Zone> {
    zones.iter().find(|zone| contains(point, Some(zone)))
}
