use std::collections::HashSet;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::proximity::{nearby, rank_by_distance, Nearby};
use crate::entities::vehicle::VehicleSnapshot;
use crate::error::{AppError, AppResult};
use crate::utils::geo::GeoPoint;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TrackingQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub q: Option<String>,
}

impl TrackingQuery {
    /// The rider's location, if the client sent one.
    fn rider(&self) -> AppResult<Option<GeoPoint>> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Ok(Some(GeoPoint::new(lat, lng)))
            }
            (None, None) => Ok(None),
            _ => Err(AppError::BadRequest(
                "lat and lng must be given together as numbers".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    #[serde(flatten)]
    pub vehicle: VehicleSnapshot,
    pub distance_km: Option<f64>,
}

impl From<Nearby<VehicleSnapshot>> for VehicleResponse {
    fn from(n: Nearby<VehicleSnapshot>) -> Self {
        Self {
            vehicle: n.item,
            distance_km: Some(n.distance_km),
        }
    }
}

impl From<VehicleSnapshot> for VehicleResponse {
    fn from(vehicle: VehicleSnapshot) -> Self {
        Self {
            vehicle,
            distance_km: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub located: bool,
    pub radius_km: Option<f64>,
    pub vehicles: Vec<VehicleResponse>,
}

/// List every vehicle, closest first when the rider's location is known
pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<TrackingQuery>,
) -> AppResult<Json<Vec<VehicleResponse>>> {
    let rider = query.rider()?;
    let mut vehicles = state.vehicles.current_positions(rider);

    if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let matching: HashSet<String> = state
            .catalog
            .search(q)
            .into_iter()
            .map(|r| r.id.clone())
            .collect();
        vehicles.retain(|v| matching.contains(&v.route_id));
    }

    let responses = match rider {
        Some(origin) => rank_by_distance(origin, &vehicles)
            .into_iter()
            .map(VehicleResponse::from)
            .collect(),
        None => vehicles.into_iter().map(VehicleResponse::from).collect(),
    };

    Ok(Json(responses))
}

/// Vehicles within a radius of the rider.
///
/// Without a location there is nothing to measure from, so the first few
/// vehicles are returned unfiltered instead.
pub async fn nearby_vehicles(
    State(state): State<AppState>,
    Query(query): Query<TrackingQuery>,
) -> AppResult<Json<NearbyResponse>> {
    let rider = query.rider()?;
    let radius_km = query.radius_km.unwrap_or(state.config.nearby_radius_km);
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(AppError::BadRequest(
            "radius_km must be greater than zero".to_string(),
        ));
    }

    let vehicles = state.vehicles.current_positions(rider);

    let response = match rider {
        Some(origin) => NearbyResponse {
            located: true,
            radius_km: Some(radius_km),
            vehicles: nearby(origin, &vehicles, radius_km)
                .into_iter()
                .map(VehicleResponse::from)
                .collect(),
        },
        None => NearbyResponse {
            located: false,
            radius_km: None,
            vehicles: vehicles
                .into_iter()
                .take(state.config.fallback_vehicle_count)
                .map(VehicleResponse::from)
                .collect(),
        },
    };

    Ok(Json(response))
}
