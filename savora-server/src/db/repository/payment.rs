//! Payment Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Payment, PaymentMethod, PaymentState};
use rust_decimal::Decimal;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

/// Admin listing filters
#[derive(Debug, Default, Clone)]
pub struct PaymentListFilter {
    pub status: Option<PaymentState>,
    pub method: Option<PaymentMethod>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone)]
pub struct PaymentRepository {
    base: BaseRepository,
}

impl PaymentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find payment by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Payment>> {
        let record = parse_id(id, "payment")?;
        let payment: Option<Payment> = self.base.db().select(record).await?;
        Ok(payment)
    }

    /// Find the payment belonging to an order (one-to-one)
    pub async fn find_by_order(&self, order: &RecordId) -> RepoResult<Option<Payment>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM payment WHERE order = $order LIMIT 1")
            .bind(("order", order.clone()))
            .await?;
        let payments: Vec<Payment> = result.take(0)?;
        Ok(payments.into_iter().next())
    }

    /// Create a payment record for an order.
    ///
    /// The unique index on `payment.order` rejects a second record for the
    /// same order; callers go through find-or-create and treat a duplicate
    /// as "reuse the existing one".
    pub async fn create_for_order(
        &self,
        order: &RecordId,
        payment_id: &str,
        amount: Decimal,
        method: PaymentMethod,
        status: PaymentState,
    ) -> RepoResult<Payment> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE payment SET
                    order = $order,
                    payment_id = $payment_id,
                    amount = $amount,
                    payment_method = $method,
                    status = $status,
                    reference = NONE,
                    metadata = NONE,
                    verified_at = NONE,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("order", order.clone()))
            .bind(("payment_id", payment_id.to_string()))
            .bind(("amount", amount))
            .bind(("method", method))
            .bind(("status", status))
            .bind(("now", chrono::Utc::now()))
            .await?;

        let created: Option<Payment> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create payment".to_string()))
    }

    /// Find the order's payment, creating a pending stub when absent.
    pub async fn find_or_create(
        &self,
        order: &RecordId,
        payment_id: &str,
        amount: Decimal,
        method: PaymentMethod,
    ) -> RepoResult<Payment> {
        if let Some(existing) = self.find_by_order(order).await? {
            return Ok(existing);
        }
        match self
            .create_for_order(order, payment_id, amount, method, PaymentState::Pending)
            .await
        {
            Ok(created) => Ok(created),
            // Lost a creation race; the unique index kept it one-to-one
            Err(RepoError::Database(_)) => self
                .find_by_order(order)
                .await?
                .ok_or_else(|| RepoError::Database("Failed to create payment".to_string())),
            Err(e) => Err(e),
        }
    }

    /// Admin listing, newest first
    pub async fn list(&self, filter: PaymentListFilter) -> RepoResult<Vec<Payment>> {
        let mut query = String::from("SELECT * FROM payment");
        let mut conditions: Vec<&str> = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.method.is_some() {
            conditions.push("payment_method = $method");
        }
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY created_at DESC LIMIT $limit START $offset");

        let mut request = self
            .base
            .db()
            .query(query)
            .bind(("limit", filter.limit))
            .bind(("offset", filter.offset));
        if let Some(status) = filter.status {
            request = request.bind(("status", status));
        }
        if let Some(method) = filter.method {
            request = request.bind(("method", method));
        }

        let payments: Vec<Payment> = request.await?.take(0)?;
        Ok(payments)
    }
}
