//! Real Rīga locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. Addresses are the street
//! addresses the geocoder fixtures answer for.

use courier_dispatch::model::{GeoPoint, Zone};

/// A named location with its street address and coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub address: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, address: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            name,
            address,
            lat,
            lng,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

// ============================================================================
// Old Town and Centre
// ============================================================================

pub const CENTRE: &[Location] = &[
    Location::new("Riga Cathedral", "Doma laukums 1", 56.9490, 24.1044),
    Location::new("Freedom Monument", "Brīvības bulvāris 1", 56.9515, 24.1133),
    Location::new("Central Station", "Stacijas laukums 2", 56.9470, 24.1197),
    Location::new("Central Market", "Nēģu iela 7", 56.9436, 24.1147),
    Location::new("Latvian National Opera", "Aspazijas bulvāris 3", 56.9497, 24.1157),
];

// ============================================================================
// Outer neighbourhoods
// ============================================================================

pub const MEZAPARKS: Location = Location::new("Mežaparks Great Bandstand", "Kokneses prospekts 1", 57.0018, 24.1446);
pub const NATIONAL_LIBRARY: Location = Location::new("National Library", "Mūkusalas iela 3", 56.9486, 24.0964);
pub const AGENSKALNS_MARKET: Location = Location::new("Āgenskalns Market", "Nometņu iela 64", 56.9392, 24.0777);
pub const IMANTA: Location = Location::new("Imanta", "Kurzemes prospekts 1", 56.9560, 23.9870);
pub const PURVCIEMS: Location = Location::new("Purvciems", "Dzelzavas iela 51", 56.9580, 24.2005);

/// Every fixture location, centre first.
pub fn all_locations() -> Vec<Location> {
    let mut all = CENTRE.to_vec();
    all.extend([MEZAPARKS, NATIONAL_LIBRARY, AGENSKALNS_MARKET, IMANTA, PURVCIEMS]);
    all
}

// ============================================================================
// Zones
// ============================================================================

/// Old Town and the boulevards. Holds every [`CENTRE`] location.
pub fn centre_zone() -> Zone {
    Zone {
        id: 1,
        name: "Centrs".to_string(),
        min_lat: Some(56.935),
        max_lat: Some(56.960),
        min_lng: Some(24.100),
        max_lng: Some(24.130),
    }
}

/// Northern districts. Holds [`MEZAPARKS`].
pub fn north_zone() -> Zone {
    Zone {
        id: 2,
        name: "Ziemeļi".to_string(),
        min_lat: Some(56.970),
        max_lat: Some(57.050),
        min_lng: Some(24.100),
        max_lng: Some(24.250),
    }
}
