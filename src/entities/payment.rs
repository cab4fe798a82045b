use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::fare::Money;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Upi,
    NetBanking,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    pub booking_id: Uuid,
    pub method: PaymentMethod,
    pub amount: Money,
}

/// Proof that a payment provider accepted a charge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaymentReceipt {
    pub reference: Uuid,
    pub booking_id: Uuid,
    pub method: PaymentMethod,
    pub amount: Money,
    pub settled_at: DateTime<Utc>,
}
