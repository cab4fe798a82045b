use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::domain::fare::{quote, FareQuote, MIN_PASSENGERS};
use crate::domain::itinerary::validate_pair;
use crate::error::AppResult;
use crate::handlers::catalog::find_route;
use crate::AppState;

fn default_passengers() -> u32 {
    MIN_PASSENGERS
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub route_id: String,
    pub pickup: String,
    pub destination: String,
    #[serde(default = "default_passengers")]
    pub passengers: u32,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub route_id: String,
    pub pickup: String,
    pub destination: String,
    pub pickup_index: usize,
    pub destination_index: usize,
    #[serde(flatten)]
    pub quote: FareQuote,
}

/// Price a trip without opening a booking
pub async fn quote_fare(
    State(state): State<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> AppResult<Json<QuoteResponse>> {
    let route = find_route(&state, &payload.route_id)?;
    let pair = validate_pair(&route.stops, &payload.pickup, &payload.destination)?;
    let fare = quote(
        &route.id,
        pair.pickup_index,
        pair.destination_index,
        payload.passengers,
    )?;

    tracing::debug!(
        route_id = %route.id,
        stops = fare.stops_travelled,
        total = %fare.total_fare,
        "Fare quoted"
    );

    Ok(Json(QuoteResponse {
        route_id: payload.route_id,
        pickup: payload.pickup,
        destination: payload.destination,
        pickup_index: pair.pickup_index,
        destination_index: pair.destination_index,
        quote: fare,
    }))
}
