use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{bookings, catalog, fares, tracking};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Route catalog and fares
    let catalog_routes = Router::new()
        .route("/routes", get(catalog::list_routes))
        .route("/routes/{id}", get(catalog::get_route))
        .route("/routes/{id}/destinations", get(catalog::list_destinations))
        .route("/fares/quote", post(fares::quote_fare));

    // Live tracking
    let tracking_routes = Router::new()
        .route("/", get(tracking::list_vehicles))
        .route("/nearby", get(tracking::nearby_vehicles));

    // Booking flow
    let booking_routes = Router::new()
        .route("/", post(bookings::create_booking))
        .route(
            "/{id}",
            get(bookings::get_booking).delete(bookings::discard_booking),
        )
        .route("/{id}/events", post(bookings::apply_event))
        .route("/{id}/payment", post(bookings::pay_booking));

    Router::new()
        .nest("/api", catalog_routes)
        .nest("/api/vehicles", tracking_routes)
        .nest("/api/bookings", booking_routes)
        .with_state(state)
}
