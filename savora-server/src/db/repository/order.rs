//! Order Repository
//!
//! All multi-entity order mutations run in a single database transaction:
//! order + items + payment (+ table occupancy) commit together or not at all.

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Order, OrderItem, OrderStatus, Payment, TableStatus};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

/// Listing filter: customers are scoped to their own orders
#[derive(Debug, Clone)]
pub struct OrderListFilter {
    pub user: Option<RecordId>,
    pub status: Option<OrderStatus>,
    pub limit: i64,
    pub offset: i64,
}

/// Everything written by the create-order transaction
pub struct NewOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment: Payment,
    /// Dine-in orders lock their table in the same transaction
    pub occupy_table: Option<RecordId>,
}

/// Final entity state written by a status-transition transaction
pub struct TransitionWrite {
    pub order: Order,
    pub payment: Option<Payment>,
    /// Table to release back to available
    pub release_table: Option<RecordId>,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let record = parse_id(id, "order")?;
        let order: Option<Order> = self.base.db().select(record).await?;
        Ok(order)
    }

    /// Find order + items + payment in one round trip
    pub async fn find_detail(
        &self,
        id: &RecordId,
    ) -> RepoResult<Option<(Order, Vec<OrderItem>, Option<Payment>)>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE id = $id")
            .query("SELECT * FROM order_item WHERE order = $id")
            .query("SELECT * FROM payment WHERE order = $id LIMIT 1")
            .bind(("id", id.clone()))
            .await?;

        let orders: Vec<Order> = result.take(0)?;
        let Some(order) = orders.into_iter().next() else {
            return Ok(None);
        };
        let items: Vec<OrderItem> = result.take(1)?;
        let payments: Vec<Payment> = result.take(2)?;
        Ok(Some((order, items, payments.into_iter().next())))
    }

    /// List orders, newest first
    pub async fn list(&self, filter: OrderListFilter) -> RepoResult<Vec<Order>> {
        let mut query = String::from("SELECT * FROM order");
        let mut conditions: Vec<&str> = Vec::new();
        if filter.user.is_some() {
            conditions.push("user = $user");
        }
        if filter.status.is_some() {
            conditions.push("status = $status");
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
        if let Some(user) = filter.user {
            request = request.bind(("user", user));
        }
        if let Some(status) = filter.status {
            request = request.bind(("status", status));
        }

        let orders: Vec<Order> = request.await?.take(0)?;
        Ok(orders)
    }

    /// Persist a new order atomically: order + line items + payment stub,
    /// and, for dine-in, the table lock. A failure anywhere rolls back
    /// everything (no partial order, no stray occupied table).
    pub async fn create_with_items(&self, new_order: NewOrder) -> RepoResult<()> {
        let order = &new_order.order;
        let order_id = order
            .id
            .clone()
            .ok_or_else(|| RepoError::Validation("Order id must be pre-generated".to_string()))?;

        let mut query = String::from(
            r#"BEGIN TRANSACTION;
            CREATE type::thing('order', $order_key) SET
                code = $code,
                user = $user,
                address = $address,
                dining_table = $dining_table,
                admin = NONE,
                subtotal = $subtotal,
                delivery_fee = $delivery_fee,
                total = $total,
                payment_method = $payment_method,
                delivery_method = $delivery_method,
                payment_status = $payment_status,
                status = $status,
                cancelled_by_customer = false,
                customer_cancelled_at = NONE,
                payment_verified_at = NONE,
                created_at = $now,
                updated_at = $now;
            "#,
        );

        for index in 0..new_order.items.len() {
            query.push_str(&format!(
                r#"CREATE order_item SET
                    order = $order_id,
                    product = $item_product_{index},
                    title = $item_title_{index},
                    quantity = $item_quantity_{index},
                    price = $item_price_{index},
                    discounted_price = $item_discounted_{index},
                    line_total = $item_line_total_{index};
                "#,
            ));
        }

        query.push_str(
            r#"CREATE payment SET
                order = $order_id,
                payment_id = $pay_code,
                amount = $pay_amount,
                payment_method = $payment_method,
                status = $pay_status,
                reference = NONE,
                metadata = NONE,
                verified_at = NONE,
                created_at = $now,
                updated_at = $now;
            "#,
        );

        if new_order.occupy_table.is_some() {
            query.push_str("UPDATE $occupy_table SET status = $occupied;\n");
        }
        query.push_str("COMMIT TRANSACTION;");

        let mut request = self
            .base
            .db()
            .query(query)
            .bind(("order_key", order_id.key().to_string()))
            .bind(("order_id", order_id))
            .bind(("code", order.code.clone()))
            .bind(("user", order.user.clone()))
            .bind(("address", order.address.clone()))
            .bind(("dining_table", order.dining_table.clone()))
            .bind(("subtotal", order.subtotal))
            .bind(("delivery_fee", order.delivery_fee))
            .bind(("total", order.total))
            .bind(("payment_method", order.payment_method))
            .bind(("delivery_method", order.delivery_method))
            .bind(("payment_status", order.payment_status))
            .bind(("status", order.status))
            .bind(("now", order.created_at));

        for (index, item) in new_order.items.iter().enumerate() {
            request = request
                .bind((format!("item_product_{index}"), item.product.clone()))
                .bind((format!("item_title_{index}"), item.title.clone()))
                .bind((format!("item_quantity_{index}"), item.quantity))
                .bind((format!("item_price_{index}"), item.price))
                .bind((format!("item_discounted_{index}"), item.discounted_price))
                .bind((format!("item_line_total_{index}"), item.line_total));
        }

        request = request
            .bind(("pay_code", new_order.payment.payment_id.clone()))
            .bind(("pay_amount", new_order.payment.amount))
            .bind(("pay_status", new_order.payment.status));

        if let Some(table) = new_order.occupy_table {
            request = request
                .bind(("occupy_table", table))
                .bind(("occupied", TableStatus::Occupied));
        }

        let response = request.await?;
        // Surface any statement failure inside the transaction as an error
        response
            .check()
            .map_err(|e| RepoError::Database(format!("Order creation failed: {e}")))?;
        Ok(())
    }

    /// Persist the outcome of a status transition atomically: final order
    /// fields, synchronized payment record and table release.
    pub async fn persist_transition(&self, write: TransitionWrite) -> RepoResult<()> {
        let order = &write.order;
        let order_id = order
            .id
            .clone()
            .ok_or_else(|| RepoError::Validation("Order id missing".to_string()))?;

        let mut query = String::from(
            r#"BEGIN TRANSACTION;
            UPDATE $order_id SET
                status = $status,
                payment_status = $payment_status,
                address = $address,
                admin = $admin,
                cancelled_by_customer = $cancelled_by_customer,
                customer_cancelled_at = $customer_cancelled_at,
                payment_verified_at = $payment_verified_at,
                updated_at = $now;
            "#,
        );

        if write.payment.is_some() {
            query.push_str(
                r#"UPDATE $payment_id SET
                    status = $pay_status,
                    reference = $pay_reference,
                    verified_at = $pay_verified_at,
                    updated_at = $now;
                "#,
            );
        }

        if write.release_table.is_some() {
            query.push_str("UPDATE $release_table SET status = $available;\n");
        }
        query.push_str("COMMIT TRANSACTION;");

        let mut request = self
            .base
            .db()
            .query(query)
            .bind(("order_id", order_id))
            .bind(("status", order.status))
            .bind(("payment_status", order.payment_status))
            .bind(("address", order.address.clone()))
            .bind(("admin", order.admin.clone()))
            .bind(("cancelled_by_customer", order.cancelled_by_customer))
            .bind(("customer_cancelled_at", order.customer_cancelled_at))
            .bind(("payment_verified_at", order.payment_verified_at))
            .bind(("now", chrono::Utc::now()));

        if let Some(payment) = &write.payment {
            let payment_id = payment
                .id
                .clone()
                .ok_or_else(|| RepoError::Validation("Payment id missing".to_string()))?;
            request = request
                .bind(("payment_id", payment_id))
                .bind(("pay_status", payment.status))
                .bind(("pay_reference", payment.reference.clone()))
                .bind(("pay_verified_at", payment.verified_at));
        }

        if let Some(table) = write.release_table {
            request = request
                .bind(("release_table", table))
                .bind(("available", TableStatus::Available));
        }

        let response = request.await?;
        response
            .check()
            .map_err(|e| RepoError::Database(format!("Order transition failed: {e}")))?;
        Ok(())
    }

    /// Count orders for a user (profile statistics)
    pub async fn count_for_user(&self, user: &RecordId) -> RepoResult<i64> {
        #[derive(serde::Deserialize)]
        struct CountRow {
            count: i64,
        }
        let mut result = self
            .base
            .db()
            .query("SELECT count() AS count FROM order WHERE user = $user GROUP ALL")
            .bind(("user", user.clone()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }
}
