//! # Nearby Facilities
//!
//! Lists registered facilities closest first from a given point.

use serde::Serialize;

use vital_client::ApiClient;
use vital_core::geo::{nearest_first, Coordinates};
use vital_core::Facility;

use crate::error::UserError;

/// A facility and how far away it is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRow {
    pub facility: Facility,
    pub distance_km: f64,
}

/// Where to measure from. Both coordinates or neither; neither means the
/// default origin.
pub fn origin(latitude: Option<f64>, longitude: Option<f64>) -> Result<Coordinates, UserError> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)?),
        (None, None) => Ok(Coordinates::DEFAULT_ORIGIN),
        _ => Err(UserError::validation(
            "Give both --lat and --lon, or neither",
        )),
    }
}

/// Fetches all facilities and returns the closest `limit` with coordinates.
pub async fn nearby(
    api: &ApiClient,
    from: Coordinates,
    limit: usize,
) -> Result<Vec<NearbyRow>, UserError> {
    let facilities = api.list_facilities().await?;
    Ok(rank(&facilities, from, limit))
}

fn rank(facilities: &[Facility], from: Coordinates, limit: usize) -> Vec<NearbyRow> {
    nearest_first(facilities, from)
        .into_iter()
        .take(limit)
        .map(|near| NearbyRow {
            facility: near.facility.clone(),
            distance_km: near.distance_km,
        })
        .collect()
}
