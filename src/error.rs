use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::booking::BookingError;
use crate::domain::fare::FareError;
use crate::domain::itinerary::{InvalidPairReason, ItineraryError};
use crate::services::payment::PaymentError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Payment failed: {0}")]
    Payment(#[from] PaymentError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Payment(err) => (StatusCode::PAYMENT_REQUIRED, err.to_string()),
            AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<InvalidPairReason> for AppError {
    fn from(err: InvalidPairReason) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<FareError> for AppError {
    fn from(err: FareError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<ItineraryError> for AppError {
    fn from(err: ItineraryError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::AlreadySettled
            | BookingError::OutOfOrder { .. }
            | BookingError::AmountMismatch { .. }
            | BookingError::MethodMismatch { .. }
            | BookingError::ForeignReceipt { .. } => AppError::Conflict(err.to_string()),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::payment::PaymentMethod;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::from(InvalidPairReason::PickupNotFound), StatusCode::BAD_REQUEST),
            (AppError::from(BookingError::AlreadySettled), StatusCode::CONFLICT),
            (
                AppError::from(BookingError::MethodMismatch {
                    paid: PaymentMethod::Card,
                    chosen: PaymentMethod::Upi,
                }),
                StatusCode::CONFLICT,
            ),
            (AppError::Internal("db".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
