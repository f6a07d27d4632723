//! Order Model
//!
//! Orders own their line items (price snapshots) and share a lifetime with a
//! single Payment record, tracked separately so a failed payment can be
//! retried without touching the order.

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::payment::Payment;

pub type OrderId = RecordId;

// =============================================================================
// Enums
// =============================================================================

/// Fulfillment progress of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Delivered => "delivered",
        }
    }

    /// Exhaustive transition table:
    /// pending → processing | cancelled;
    /// processing → completed | cancelled | delivered;
    /// completed / cancelled / delivered are terminal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Cancelled)
                | (Processing, Completed)
                | (Processing, Cancelled)
                | (Processing, Delivered)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Delivered
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Money movement state of an order (independent of fulfillment status)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fulfillment channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMethod {
    Delivery,
    DineIn,
    Pickup,
    Courier,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Delivery => "delivery",
            DeliveryMethod::DineIn => "dine-in",
            DeliveryMethod::Pickup => "pickup",
            DeliveryMethod::Courier => "courier",
        }
    }

    /// Delivery and courier orders ship to an address
    pub fn requires_address(self) -> bool {
        matches!(self, DeliveryMethod::Delivery | DeliveryMethod::Courier)
    }

    pub fn is_dine_in(self) -> bool {
        matches!(self, DeliveryMethod::DineIn)
    }

    /// Cash is only accepted when the customer is physically present
    pub fn allows_cash(self) -> bool {
        matches!(self, DeliveryMethod::DineIn | DeliveryMethod::Pickup)
    }
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted payment methods
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Paystack,
    Flutterwave,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Paystack => "paystack",
            PaymentMethod::Flutterwave => "flutterwave",
        }
    }

    pub fn is_cash(self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Entities
// =============================================================================

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    /// Human-readable order code, e.g. "ORD-8F3KQ2PD"
    pub code: String,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub address: Option<RecordId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub dining_table: Option<RecordId>,
    /// Admin who last handled the order
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub admin: Option<RecordId>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    /// Invariant: total = subtotal + delivery_fee
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub delivery_method: DeliveryMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub cancelled_by_customer: bool,
    pub customer_cancelled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub payment_verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Order line item with its price snapshot
///
/// `price`/`discounted_price` are frozen at order time; catalog changes
/// never propagate back into existing orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    /// Product title snapshot for display
    pub title: String,
    pub quantity: i64,
    pub price: Decimal,
    pub discounted_price: Option<Decimal>,
    /// Invariant: line_total = quantity × (discounted_price ?? price)
    pub line_total: Decimal,
}

// =============================================================================
// API Request Types
// =============================================================================

/// One cart line in a create-order request
#[derive(Debug, Clone, Deserialize)]
pub struct CartLine {
    /// Product id as "product:xxx"
    pub id: String,
    pub quantity: i64,
}

/// Create order payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    pub address_id: Option<String>,
    pub table_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub delivery_method: DeliveryMethod,
    pub products: Vec<CartLine>,
}

/// Admin update payload (subset of fields)
#[derive(Debug, Clone, Deserialize)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub address_id: Option<String>,
}

// =============================================================================
// API Response Types
// =============================================================================

/// Full order detail: order + line items + payment record
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment: Option<Payment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_from_pending() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn transition_table_from_processing() {
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn terminal_states_allow_nothing() {
        for terminal in [
            OrderStatus::Completed,
            OrderStatus::Cancelled,
            OrderStatus::Delivered,
        ] {
            assert!(terminal.is_terminal());
            for next in [
                OrderStatus::Pending,
                OrderStatus::Processing,
                OrderStatus::Completed,
                OrderStatus::Cancelled,
                OrderStatus::Delivered,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn delivery_method_rules() {
        assert!(DeliveryMethod::Delivery.requires_address());
        assert!(DeliveryMethod::Courier.requires_address());
        assert!(!DeliveryMethod::DineIn.requires_address());
        assert!(DeliveryMethod::DineIn.allows_cash());
        assert!(DeliveryMethod::Pickup.allows_cash());
        assert!(!DeliveryMethod::Delivery.allows_cash());
        assert!(!DeliveryMethod::Courier.allows_cash());
    }

    #[test]
    fn delivery_method_serde_uses_kebab_case() {
        let m: DeliveryMethod = serde_json::from_str("\"dine-in\"").unwrap();
        assert_eq!(m, DeliveryMethod::DineIn);
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"dine-in\"");
        assert!(serde_json::from_str::<DeliveryMethod>("\"drone\"").is_err());
    }
}
