//! # Nearby Facilities
//!
//! Great-circle distances and the "closest first" ordering used by the
//! facility finder.
//!
//! ```text
//! a = sin²(Δφ/2) + cos φ1 · cos φ2 · sin²(Δλ/2)
//! d = 2R · atan2(√a, √(1−a))          R = 6371 km
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::Facility;

/// Mean earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Where the finder centres when the user's location is unknown
    /// (San Francisco).
    pub const DEFAULT_ORIGIN: Coordinates = Coordinates {
        latitude: 37.7749,
        longitude: -122.4194,
    };

    /// Validated constructor: latitude in [-90, 90], longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> CoreResult<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if !valid {
            return Err(CoreError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }

        Ok(Coordinates {
            latitude,
            longitude,
        })
    }

    /// Coordinates of a facility, if it registered a usable location.
    pub fn of(facility: &Facility) -> Option<Self> {
        match (facility.latitude, facility.longitude) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng).ok(),
            _ => None,
        }
    }
}

/// Haversine distance in kilometres.
///
/// ```rust
/// use vital_core::geo::{haversine_km, Coordinates};
///
/// let here = Coordinates::DEFAULT_ORIGIN;
/// assert_eq!(haversine_km(here, here), 0.0);
/// ```
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// A facility together with its distance from the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyFacility<'a> {
    pub facility: &'a Facility,
    pub distance_km: f64,
}

/// Facilities with a known location, closest first.
///
/// Facilities without coordinates are left out. Equal distances keep their
/// input order.
pub fn nearest_first(facilities: &[Facility], origin: Coordinates) -> Vec<NearbyFacility<'_>> {
    let mut nearby: Vec<NearbyFacility<'_>> = facilities
        .iter()
        .filter_map(|facility| {
            Coordinates::of(facility).map(|at| NearbyFacility {
                facility,
                distance_km: haversine_km(origin, at),
            })
        })
        .collect();

    nearby.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });
    nearby
}
