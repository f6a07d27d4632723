//! Payment Verification Service
//!
//! Records payment attempts against an order and reconciles gateway
//! verification results into order state. Every gateway failure (network
//! error, missing configuration, short amount) collapses into the same
//! caller-visible "failed" outcome; internal diagnostics go to the logs
//! only, never to the client.

pub mod flutterwave;
pub mod paystack;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use crate::auth::CurrentUser;
use crate::db::models::{
    Order, OrderStatus, Payment, PaymentMethod, PaymentState, PaymentStatus, Settings,
};
use crate::db::repository::order::TransitionWrite;
use crate::db::repository::{OrderRepository, PaymentRepository, SettingRepository};
use crate::utils::{AppError, AppResult, random_code};

/// Amount tolerance when matching a payment against an order total
pub const AMOUNT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Supported verification gateways
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gateway {
    Paystack,
    Flutterwave,
    Cash,
}

impl Gateway {
    fn as_payment_method(self) -> PaymentMethod {
        match self {
            Gateway::Paystack => PaymentMethod::Paystack,
            Gateway::Flutterwave => PaymentMethod::Flutterwave,
            Gateway::Cash => PaymentMethod::Cash,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gateway::Paystack => "paystack",
            Gateway::Flutterwave => "flutterwave",
            Gateway::Cash => "cash",
        }
    }
}

/// Internal gateway failure taxonomy; log-only, collapsed for callers
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway is disabled")]
    Disabled,
    #[error("gateway credentials not configured")]
    NotConfigured,
    #[error("gateway HTTP error: {0}")]
    Http(String),
    #[error("gateway rejected the request: {0}")]
    Rejected(String),
}

/// Normalized gateway transaction-lookup result (amount in major units)
#[derive(Debug, Clone)]
pub struct GatewayTransaction {
    pub success: bool,
    pub amount: Decimal,
    pub gateway_status: String,
}

/// Gateway checkout initialization result
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub payment_url: Option<String>,
}

/// Outcome of a verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    Failed,
}

// =============================================================================
// API Request/Response Types
// =============================================================================

/// POST /api/payments/initiate payload
#[derive(Debug, Deserialize)]
pub struct InitiatePaymentRequest {
    pub order_id: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
}

/// POST /api/payments/verify payload
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    pub reference: String,
    pub gateway: Gateway,
}

/// PATCH /api/payments/:id payload (admin maintenance)
#[derive(Debug, Deserialize)]
pub struct PaymentAdminUpdate {
    pub status: PaymentState,
    pub reference: Option<String>,
}

/// Initiation result: payment record + optional hosted checkout URL
#[derive(Debug, Serialize)]
pub struct InitiateOutcome {
    pub payment: Payment,
    pub payment_url: Option<String>,
}

// =============================================================================
// Service
// =============================================================================

#[derive(Clone)]
pub struct PaymentService {
    db: Surreal<Db>,
    http: reqwest::Client,
}

impl PaymentService {
    pub fn new(db: Surreal<Db>, http: reqwest::Client) -> Self {
        Self { db, http }
    }

    fn payments(&self) -> PaymentRepository {
        PaymentRepository::new(self.db.clone())
    }

    fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.db.clone())
    }

    async fn settings(&self) -> AppResult<Settings> {
        Ok(SettingRepository::new(self.db.clone()).get().await?)
    }

    /// Load an order, enforcing owner-or-admin access
    async fn load_order(&self, actor: &CurrentUser, order_id: &str) -> AppResult<Order> {
        let order = self
            .orders()
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;
        let user_id = actor.record_id().map_err(AppError::invalid_token)?;
        if !actor.is_admin() && order.user != user_id {
            return Err(AppError::forbidden(
                "You do not have permission to pay for this order",
            ));
        }
        Ok(order)
    }

    // =========================================================================
    // initiate
    // =========================================================================

    /// Record (or reuse) the order's payment and, for online methods, open a
    /// gateway checkout session. The amount must match the order total
    /// within the tolerance; a mismatch is rejected, never corrected.
    pub async fn initiate(
        &self,
        actor: &CurrentUser,
        req: InitiatePaymentRequest,
    ) -> AppResult<InitiateOutcome> {
        let order = self.load_order(actor, &req.order_id).await?;
        let order_record = order
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Order record id missing"))?;

        if (req.amount - order.total).abs() > AMOUNT_TOLERANCE {
            let mut errors = std::collections::BTreeMap::new();
            errors.insert(
                "amount".to_string(),
                "Payment amount does not match order total".to_string(),
            );
            return Err(AppError::FieldErrors(errors));
        }

        // Find-or-create keeps payment one-to-one with the order
        let payment = self
            .payments()
            .find_or_create(
                &order_record,
                &random_code("PAY", 12),
                order.total,
                req.payment_method,
            )
            .await?;

        match req.payment_method {
            PaymentMethod::Cash => {
                // No external call; money arrives in person
                let mut pending = payment.clone();
                pending.status = PaymentState::Pending;
                self.write_outcome(order, pending, PaymentStatus::Pending, None)
                    .await?;
                let payment = self
                    .payments()
                    .find_by_order(&order_record)
                    .await?
                    .unwrap_or(payment);
                Ok(InitiateOutcome {
                    payment,
                    payment_url: None,
                })
            }
            PaymentMethod::Card => {
                // Card collection happens client-side against the configured
                // gateway; nothing to initialize server-side
                Ok(InitiateOutcome {
                    payment,
                    payment_url: None,
                })
            }
            PaymentMethod::Paystack | PaymentMethod::Flutterwave => {
                let session = self
                    .open_checkout(actor, &order, &payment, req.payment_method)
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            order = %order_record,
                            method = %req.payment_method,
                            error = %e,
                            "Payment initiation failed"
                        );
                        AppError::business_rule("Payment initiation failed")
                    })?;
                Ok(InitiateOutcome {
                    payment,
                    payment_url: session.payment_url,
                })
            }
        }
    }

    async fn open_checkout(
        &self,
        actor: &CurrentUser,
        order: &Order,
        payment: &Payment,
        method: PaymentMethod,
    ) -> Result<CheckoutSession, GatewayError> {
        let settings = self
            .settings()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        match method {
            PaymentMethod::Paystack => {
                let secret = gateway_secret(&settings, "paystack")?;
                paystack::initialize_transaction(
                    &self.http,
                    &secret,
                    &actor.email,
                    order.total,
                    &payment.payment_id,
                )
                .await
            }
            PaymentMethod::Flutterwave => {
                let secret = gateway_secret(&settings, "flutterwave")?;
                let redirect_url = settings
                    .company_info
                    .website
                    .clone()
                    .unwrap_or_else(|| "https://savora.local/payments/callback".to_string());
                flutterwave::initialize_transaction(
                    &self.http,
                    &secret,
                    &actor.email,
                    order.total,
                    &settings.general.currency,
                    &payment.payment_id,
                    &redirect_url,
                )
                .await
            }
            _ => Ok(CheckoutSession { payment_url: None }),
        }
    }

    // =========================================================================
    // verify
    // =========================================================================

    /// Verify a gateway transaction reference against the order.
    ///
    /// Gateway network errors, missing configuration and short amounts all
    /// collapse to [`VerifyOutcome::Failed`], never a server error.
    pub async fn verify(
        &self,
        actor: &CurrentUser,
        req: VerifyPaymentRequest,
    ) -> AppResult<VerifyOutcome> {
        let order = self.load_order(actor, &req.order_id).await?;
        let order_record = order
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Order record id missing"))?;

        let payment = self
            .payments()
            .find_or_create(
                &order_record,
                &random_code("PAY", 12),
                order.total,
                req.gateway.as_payment_method(),
            )
            .await?;

        let verified = match req.gateway {
            // Cash payments are verified on the spot
            Gateway::Cash => true,
            Gateway::Paystack | Gateway::Flutterwave => {
                match self
                    .verify_with_gateway(req.gateway, &req.reference, &order)
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!(
                            order = %order_record,
                            reference = %req.reference,
                            gateway = req.gateway.as_str(),
                            error = %e,
                            "Payment verification failed"
                        );
                        false
                    }
                }
            }
        };

        if verified {
            let mut payment = payment;
            payment.status = PaymentState::Successful;
            payment.reference = Some(req.reference.clone());
            payment.verified_at = Some(Utc::now());
            self.write_outcome(order, payment, PaymentStatus::Paid, Some(Utc::now()))
                .await?;
            tracing::info!(
                order = %order_record,
                gateway = req.gateway.as_str(),
                "Payment verified"
            );
            Ok(VerifyOutcome::Verified)
        } else {
            let mut payment = payment;
            payment.status = PaymentState::Failed;
            self.write_outcome(order, payment, PaymentStatus::Failed, None)
                .await?;
            Ok(VerifyOutcome::Failed)
        }
    }

    /// Call the gateway's transaction-lookup endpoint and compare amounts.
    /// A generic gateway "success" with a short amount is still a failure.
    async fn verify_with_gateway(
        &self,
        gateway: Gateway,
        reference: &str,
        order: &Order,
    ) -> Result<bool, GatewayError> {
        let settings = self
            .settings()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        let secret = gateway_secret(&settings, gateway.as_str())?;

        let transaction = match gateway {
            Gateway::Paystack => {
                paystack::verify_transaction(&self.http, &secret, reference).await?
            }
            Gateway::Flutterwave => {
                flutterwave::verify_transaction(&self.http, &secret, reference).await?
            }
            Gateway::Cash => return Ok(true),
        };

        check_transaction(&transaction, order.total)?;
        Ok(true)
    }

    /// Persist the payment + order money state atomically. Order fulfillment
    /// status is left for the customer/admin to act on.
    async fn write_outcome(
        &self,
        mut order: Order,
        payment: Payment,
        payment_status: PaymentStatus,
        verified_at: Option<chrono::DateTime<Utc>>,
    ) -> AppResult<()> {
        order.payment_status = payment_status;
        if let Some(at) = verified_at {
            order.payment_verified_at = Some(at);
        }
        self.orders()
            .persist_transition(TransitionWrite {
                order,
                payment: Some(payment),
                release_table: None,
            })
            .await?;
        Ok(())
    }

    // =========================================================================
    // admin maintenance
    // =========================================================================

    /// Admin override of a payment's status; the order follows:
    /// successful → paid + processing, failed → failed (order stays pending
    /// for retry), refunded → refunded + cancelled.
    pub async fn admin_update(
        &self,
        actor: &CurrentUser,
        payment_id: &str,
        update: PaymentAdminUpdate,
    ) -> AppResult<Payment> {
        if !actor.is_admin() {
            return Err(AppError::forbidden("Only admins may update payments"));
        }

        let mut payment = self
            .payments()
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Payment {} not found", payment_id)))?;
        let order_id = payment.order.to_string();
        let mut order = self
            .orders()
            .find_by_id(&order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;

        payment.status = update.status;
        if let Some(reference) = update.reference {
            payment.reference = Some(reference);
        }
        payment.verified_at = match update.status {
            PaymentState::Successful => Some(Utc::now()),
            _ => None,
        };

        let mut release_table = None;
        match update.status {
            PaymentState::Successful => {
                order.payment_status = PaymentStatus::Paid;
                if order.status.can_transition_to(OrderStatus::Processing) {
                    order.status = OrderStatus::Processing;
                }
            }
            PaymentState::Failed => {
                order.payment_status = PaymentStatus::Failed;
            }
            PaymentState::Refunded => {
                order.payment_status = PaymentStatus::Refunded;
                if order.status.can_transition_to(OrderStatus::Cancelled) {
                    order.status = OrderStatus::Cancelled;
                    release_table = order.dining_table.clone();
                }
            }
            PaymentState::Pending => {
                order.payment_status = PaymentStatus::Pending;
            }
        }

        self.orders()
            .persist_transition(TransitionWrite {
                order,
                payment: Some(payment.clone()),
                release_table,
            })
            .await?;

        let refreshed = self
            .payments()
            .find_by_id(payment_id)
            .await?
            .unwrap_or(payment);
        Ok(refreshed)
    }
}

/// A gateway transaction covers an order when the gateway reports success
/// AND the paid amount (major units) reaches the order total. A short
/// amount fails even when the gateway reports a generic success.
fn check_transaction(
    transaction: &GatewayTransaction,
    order_total: Decimal,
) -> Result<(), GatewayError> {
    if !transaction.success {
        return Err(GatewayError::Rejected(format!(
            "transaction not successful (gateway status: {})",
            transaction.gateway_status
        )));
    }
    if transaction.amount < order_total {
        return Err(GatewayError::Rejected(format!(
            "amount paid ({}) is less than order total ({})",
            transaction.amount, order_total
        )));
    }
    Ok(())
}

/// Resolve the secret key for an enabled gateway in the configured mode
fn gateway_secret(settings: &Settings, gateway_id: &str) -> Result<String, GatewayError> {
    let config = settings
        .gateway(gateway_id)
        .ok_or(GatewayError::NotConfigured)?;
    if !config.enabled {
        return Err(GatewayError::Disabled);
    }
    config
        .secret_for(settings.transaction_mode)
        .map(|s| s.to_string())
        .ok_or(GatewayError::NotConfigured)
}

#[cfg(test)]
mod service_tests;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Settings, TransactionMode};

    #[test]
    fn amount_tolerance_is_one_cent() {
        assert_eq!(AMOUNT_TOLERANCE, Decimal::new(1, 2));
    }

    #[test]
    fn short_amount_fails_even_on_gateway_success() {
        let total = Decimal::new(2700, 2); // 27.00
        let short = GatewayTransaction {
            success: true,
            amount: Decimal::new(2699, 2),
            gateway_status: "success".to_string(),
        };
        assert!(check_transaction(&short, total).is_err());

        let exact = GatewayTransaction {
            success: true,
            amount: total,
            gateway_status: "success".to_string(),
        };
        assert!(check_transaction(&exact, total).is_ok());

        let over = GatewayTransaction {
            success: true,
            amount: Decimal::new(3000, 2),
            gateway_status: "success".to_string(),
        };
        assert!(check_transaction(&over, total).is_ok());

        let declined = GatewayTransaction {
            success: false,
            amount: total,
            gateway_status: "failed".to_string(),
        };
        assert!(check_transaction(&declined, total).is_err());
    }

    #[test]
    fn gateway_secret_requires_enabled_and_configured() {
        let mut settings = Settings::seed();
        // Disabled gateway is a hard failure
        assert!(matches!(
            gateway_secret(&settings, "paystack"),
            Err(GatewayError::Disabled)
        ));

        settings.payment_gateways[0].enabled = true;
        // Enabled but no key for the configured (test) mode
        assert!(matches!(
            gateway_secret(&settings, "paystack"),
            Err(GatewayError::NotConfigured)
        ));

        settings.payment_gateways[0].secret_test_key = Some("sk_test_x".into());
        assert_eq!(gateway_secret(&settings, "paystack").unwrap(), "sk_test_x");

        // Live mode ignores the test key
        settings.transaction_mode = TransactionMode::Live;
        assert!(matches!(
            gateway_secret(&settings, "paystack"),
            Err(GatewayError::NotConfigured)
        ));

        // Unknown gateway
        assert!(matches!(
            gateway_secret(&settings, "stripe"),
            Err(GatewayError::NotConfigured)
        ));
    }
}
