use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::payment::{PaymentReceipt, PaymentRequest};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Payment declined: {0}")]
    Declined(String),
}

/// Something that can take money for a booking.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn authorize(&self, request: PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}

/// Waits a fixed delay and then approves every charge.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PaymentProvider for SimulatedGateway {
    #[tracing::instrument(skip(self), fields(booking_id = %request.booking_id))]
    async fn authorize(&self, request: PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        tokio::time::sleep(self.delay).await;

        let receipt = PaymentReceipt {
            reference: Uuid::new_v4(),
            booking_id: request.booking_id,
            method: request.method,
            amount: request.amount,
            settled_at: Utc::now(),
        };
        tracing::info!(
            reference = %receipt.reference,
            amount = %receipt.amount,
            "Payment approved"
        );

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fare::Money;
    use crate::entities::payment::PaymentMethod;

    #[tokio::test]
    async fn test_simulated_gateway_always_approves() {
        let gateway = SimulatedGateway::new(Duration::from_millis(5));
        let booking_id = Uuid::new_v4();

        let receipt = gateway
            .authorize(PaymentRequest {
                booking_id,
                method: PaymentMethod::Card,
                amount: Money::from_major(90),
            })
            .await
            .unwrap();

        assert_eq!(receipt.booking_id, booking_id);
        assert_eq!(receipt.amount, Money::from_major(90));
        assert_eq!(receipt.method, PaymentMethod::Card);
    }

    #[tokio::test]
    async fn test_simulated_gateway_waits_for_delay() {
        let gateway = SimulatedGateway::new(Duration::from_millis(50));
        let started = std::time::Instant::now();

        gateway
            .authorize(PaymentRequest {
                booking_id: Uuid::new_v4(),
                method: PaymentMethod::Upi,
                amount: Money::from_major(13),
            })
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
