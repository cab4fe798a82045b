use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::booking::{BookingError, BookingEvent, BookingState, Transition};
use crate::entities::payment::{PaymentMethod, PaymentRequest};
use crate::error::{AppError, AppResult};
use crate::handlers::catalog::find_route;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateBookingRequest {
    /// Start with this route already chosen
    pub route_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingEventRequest {
    SelectRoute { route_id: String },
    SelectPickup { stop: String },
    SelectDestination { stop: String },
    SelectDeparture { time: String },
    SetPassengers { count: u32 },
    ChoosePaymentMethod { method: PaymentMethod },
    BackToBooking,
    Reset,
}

#[derive(Debug, Serialize)]
pub struct Rejection {
    pub code: &'static str,
    pub message: String,
}

impl From<&BookingError> for Rejection {
    fn from(err: &BookingError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub state: BookingState,
    pub rejection: Option<Rejection>,
}

impl BookingResponse {
    fn from_transition(id: Uuid, transition: Transition) -> Self {
        Self {
            id,
            rejection: transition.rejection.as_ref().map(Rejection::from),
            state: transition.state,
        }
    }
}

/// Open a booking session
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<BookingResponse>> {
    let mut booking = BookingState::new();

    if let Some(route_id) = payload.route_id {
        let route = find_route(&state, &route_id)?;
        let transition = booking.apply(BookingEvent::SelectRoute(route));
        if let Some(err) = transition.rejection {
            return Err(err.into());
        }
        booking = transition.state;
    }

    let id = state.bookings.create(booking.clone()).await;

    Ok(Json(BookingResponse {
        id,
        state: booking,
        rejection: None,
    }))
}

/// Get the current state of a booking
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let booking = state.bookings.get(booking_id).await?;

    Ok(Json(BookingResponse {
        id: booking_id,
        state: booking,
        rejection: None,
    }))
}

/// Apply one step of the booking flow.
///
/// A rejected step still answers 200: the state may have been reset (for
/// example a destination that no longer follows the pickup is cleared) and
/// the client needs to see it.
pub async fn apply_event(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<BookingEventRequest>,
) -> AppResult<Json<BookingResponse>> {
    let event = match payload {
        BookingEventRequest::SelectRoute { route_id } => {
            BookingEvent::SelectRoute(find_route(&state, &route_id)?)
        }
        BookingEventRequest::SelectPickup { stop } => BookingEvent::SelectPickup(stop),
        BookingEventRequest::SelectDestination { stop } => BookingEvent::SelectDestination(stop),
        BookingEventRequest::SelectDeparture { time } => BookingEvent::SelectDeparture(time),
        BookingEventRequest::SetPassengers { count } => BookingEvent::SetPassengers(count),
        BookingEventRequest::ChoosePaymentMethod { method } => {
            BookingEvent::ChoosePaymentMethod(method)
        }
        BookingEventRequest::BackToBooking => BookingEvent::BackToBooking,
        BookingEventRequest::Reset => BookingEvent::Reset,
    };

    let transition = state.bookings.apply(booking_id, event).await?;

    Ok(Json(BookingResponse::from_transition(booking_id, transition)))
}

/// Charge the quoted fare with the chosen payment method
pub async fn pay_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let booking = state.bookings.get(booking_id).await?;

    let BookingState::PaymentMethodChosen { trip, method } = &booking else {
        return Err(AppError::Conflict(format!(
            "Booking is {} and cannot be paid",
            booking.step()
        )));
    };

    let request = PaymentRequest {
        booking_id,
        method: *method,
        amount: trip.quote.total_fare,
    };

    // The session lock is not held while the provider works
    let receipt = state.payments.authorize(request).await?;

    let transition = state
        .bookings
        .apply(
            booking_id,
            BookingEvent::PaymentSettled {
                booking_id,
                receipt,
            },
        )
        .await?;
    if let Some(err) = transition.rejection {
        tracing::warn!(booking_id = %booking_id, error = %err, "Booking changed during payment");
        return Err(err.into());
    }

    tracing::info!(booking_id = %booking_id, "Booking paid");
    Ok(Json(BookingResponse::from_transition(booking_id, transition)))
}

/// Discard a booking session
pub async fn discard_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    state.bookings.remove(booking_id).await?;

    Ok(Json(serde_json::json!({ "message": "Booking discarded" })))
}
