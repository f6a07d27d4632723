//! Payment Model

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::order::{PaymentMethod, PaymentStatus};

/// State of a payment record (money side of an order)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Pending,
    Successful,
    Failed,
    Refunded,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Pending => "pending",
            PaymentState::Successful => "successful",
            PaymentState::Failed => "failed",
            PaymentState::Refunded => "refunded",
        }
    }

    /// The payment state mirroring a given order payment status.
    /// Used to keep Payment.status synchronized on every order update.
    pub fn mirror_of(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Paid => PaymentState::Successful,
            PaymentStatus::Failed => PaymentState::Failed,
            PaymentStatus::Refunded => PaymentState::Refunded,
            PaymentStatus::Unpaid | PaymentStatus::Pending => PaymentState::Pending,
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment record (one per order; find-or-create is idempotent)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order: RecordId,
    /// Generated identifier, e.g. "PAY-9A41C0B7"
    pub payment_id: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub status: PaymentState,
    /// Gateway transaction reference
    pub reference: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
