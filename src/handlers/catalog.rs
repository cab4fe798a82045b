use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::fare::FareClass;
use crate::domain::itinerary::destinations_after;
use crate::entities::route::Route;
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    #[serde(flatten)]
    pub route: Arc<Route>,
    pub fare_class: FareClass,
    pub bookable: bool,
}

impl From<Arc<Route>> for RouteResponse {
    fn from(route: Arc<Route>) -> Self {
        Self {
            fare_class: FareClass::for_route(&route.id),
            bookable: route.is_bookable(),
            route,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DestinationsQuery {
    pub pickup: String,
}

#[derive(Debug, Serialize)]
pub struct DestinationsResponse {
    pub route_id: String,
    pub pickup: String,
    pub destinations: Vec<String>,
}

pub(crate) fn find_route(state: &AppState, route_id: &str) -> AppResult<Arc<Route>> {
    state
        .catalog
        .get(route_id)
        .ok_or_else(|| AppError::NotFound(format!("Route {} not found", route_id)))
}

/// List routes, optionally filtered by route number, name or stop
pub async fn list_routes(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<RouteResponse>>> {
    let routes = state
        .catalog
        .search(query.q.as_deref().unwrap_or_default())
        .into_iter()
        .map(RouteResponse::from)
        .collect();

    Ok(Json(routes))
}

/// Get route details
pub async fn get_route(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> AppResult<Json<RouteResponse>> {
    Ok(Json(find_route(&state, &route_id)?.into()))
}

/// Stops that can be booked as a destination from `pickup`
pub async fn list_destinations(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
    Query(query): Query<DestinationsQuery>,
) -> AppResult<Json<DestinationsResponse>> {
    let route = find_route(&state, &route_id)?;
    let destinations = destinations_after(&route.stops, &query.pickup)?.to_vec();

    Ok(Json(DestinationsResponse {
        route_id: route.id.clone(),
        pickup: query.pickup,
        destinations,
    }))
}
