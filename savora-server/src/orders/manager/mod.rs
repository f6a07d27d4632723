//! Order Lifecycle Manager
//!
//! Creates orders from a cart (validate → price → persist), runs the status
//! state machine and the customer-cancel path. Every multi-entity mutation is
//! one named atomic operation taking an explicit actor and returning the
//! final entity state: no ambient auth context, no implicit reloads.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::db::models::{
    Order, OrderCreate, OrderDetail, OrderItem, OrderStatus, OrderUpdate, Payment, PaymentState,
    PaymentStatus, Product,
};
use crate::db::repository::order::{NewOrder, OrderListFilter, TransitionWrite};
use crate::db::repository::{
    AddressRepository, DiningTableRepository, OrderRepository, ProductRepository,
    SettingRepository, parse_id,
};
use crate::utils::validation::MAX_QUANTITY;
use crate::utils::{AppError, AppResult, random_code};

/// Monetary rounding: 2 decimal places, half-up
const DECIMAL_PLACES: u32 = 2;

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Order lifecycle service
#[derive(Clone)]
pub struct OrderLifecycle {
    db: Surreal<Db>,
}

impl OrderLifecycle {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.db.clone())
    }

    // =========================================================================
    // create
    // =========================================================================

    /// Create an order from a cart.
    ///
    /// Validation failures report a field-level error map and commit nothing;
    /// the persistence step writes order + items + payment stub (+ table
    /// lock for dine-in) in one transaction.
    pub async fn create(&self, actor: &CurrentUser, req: OrderCreate) -> AppResult<OrderDetail> {
        let user_id = actor
            .record_id()
            .map_err(AppError::invalid_token)?;

        let mut errors: BTreeMap<String, String> = BTreeMap::new();

        // --- cart shape ---
        if req.products.is_empty() {
            errors.insert(
                "products".to_string(),
                "At least one product is required.".to_string(),
            );
        }
        let mut product_ids: Vec<RecordId> = Vec::with_capacity(req.products.len());
        for (index, line) in req.products.iter().enumerate() {
            if line.quantity < 1 {
                errors.insert(
                    format!("products.{index}.quantity"),
                    "Quantity must be at least 1.".to_string(),
                );
            } else if line.quantity > MAX_QUANTITY {
                errors.insert(
                    format!("products.{index}.quantity"),
                    format!("Quantity exceeds maximum allowed ({MAX_QUANTITY})."),
                );
            }
            match parse_id(&line.id, "product") {
                Ok(record) => product_ids.push(record),
                Err(_) => {
                    errors.insert(
                        format!("products.{index}.id"),
                        "Invalid product ID.".to_string(),
                    );
                }
            }
        }

        // --- address (delivery / courier) ---
        let mut address_record: Option<RecordId> = None;
        if req.delivery_method.requires_address() {
            match &req.address_id {
                None => {
                    errors.insert(
                        "address_id".to_string(),
                        "Address is required for delivery or courier orders.".to_string(),
                    );
                }
                Some(address_id) => match parse_id(address_id, "address") {
                    Err(_) => {
                        errors.insert("address_id".to_string(), "Invalid address ID.".to_string());
                    }
                    Ok(record) => {
                        let repo = AddressRepository::new(self.db.clone());
                        match repo.find_by_id(address_id).await? {
                            None => {
                                errors.insert(
                                    "address_id".to_string(),
                                    "Address not found.".to_string(),
                                );
                            }
                            Some(address) if address.user != user_id => {
                                errors.insert(
                                    "address_id".to_string(),
                                    "Address does not belong to you.".to_string(),
                                );
                            }
                            Some(_) => address_record = Some(record),
                        }
                    }
                },
            }
        } else if let Some(address_id) = &req.address_id {
            // Optional for pickup; still must be the caller's own address
            if let Ok(record) = parse_id(address_id, "address") {
                let repo = AddressRepository::new(self.db.clone());
                match repo.find_by_id(address_id).await? {
                    Some(address) if address.user == user_id => address_record = Some(record),
                    _ => {
                        errors.insert("address_id".to_string(), "Address not found.".to_string());
                    }
                }
            } else {
                errors.insert("address_id".to_string(), "Invalid address ID.".to_string());
            }
        }

        // --- table (dine-in) ---
        let mut table_record: Option<RecordId> = None;
        if req.delivery_method.is_dine_in() {
            match &req.table_id {
                None => {
                    errors.insert(
                        "table_id".to_string(),
                        "Table ID is required for dine-in orders.".to_string(),
                    );
                }
                Some(table_id) => match parse_id(table_id, "dining_table") {
                    Err(_) => {
                        errors.insert("table_id".to_string(), "Invalid table ID.".to_string());
                    }
                    Ok(record) => {
                        let repo = DiningTableRepository::new(self.db.clone());
                        match repo.find_by_id(table_id).await? {
                            None => {
                                errors
                                    .insert("table_id".to_string(), "Table not found.".to_string());
                            }
                            Some(_) => table_record = Some(record),
                        }
                    }
                },
            }
        }

        // --- cash constraint ---
        if req.payment_method.is_cash() && !req.delivery_method.allows_cash() {
            errors.insert(
                "payment_method".to_string(),
                "Cash payment is only allowed for dine-in or pickup orders.".to_string(),
            );
        }

        // --- products must exist and be purchasable ---
        let products = if product_ids.is_empty() {
            vec![]
        } else {
            ProductRepository::new(self.db.clone())
                .find_by_ids(&product_ids)
                .await?
        };
        let find_product = |id: &RecordId| -> Option<&Product> {
            products.iter().find(|p| p.id.as_ref() == Some(id))
        };
        for (index, line) in req.products.iter().enumerate() {
            let Ok(record) = parse_id(&line.id, "product") else {
                continue; // already reported
            };
            match find_product(&record) {
                None => {
                    errors.insert(
                        format!("products.{index}.id"),
                        "Product not found.".to_string(),
                    );
                }
                Some(product) if !product.is_purchasable() => {
                    errors.insert(
                        format!("products.{index}.id"),
                        "Product is not available.".to_string(),
                    );
                }
                Some(_) => {}
            }
        }

        if !errors.is_empty() {
            return Err(AppError::FieldErrors(errors));
        }

        // --- pricing (price snapshot per line) ---
        let order_id = RecordId::from_table_key("order", Uuid::new_v4().simple().to_string());
        let mut subtotal = Decimal::ZERO;
        let mut items: Vec<OrderItem> = Vec::with_capacity(req.products.len());
        for line in &req.products {
            let record = parse_id(&line.id, "product")?;
            let product = find_product(&record)
                .ok_or_else(|| AppError::internal("Product vanished during pricing"))?;
            let line_total =
                round_money(product.effective_price() * Decimal::from(line.quantity));
            subtotal += line_total;

            items.push(OrderItem {
                id: None,
                order: order_id.clone(),
                product: record,
                title: product.title.clone(),
                quantity: line.quantity,
                price: product.price,
                discounted_price: product.discounted_price,
                line_total,
            });
        }
        subtotal = round_money(subtotal);

        let delivery_fee = if req.delivery_method.requires_address() {
            let settings = SettingRepository::new(self.db.clone()).get().await?;
            round_money(settings.general.delivery_fee)
        } else {
            Decimal::ZERO
        };
        let total = subtotal + delivery_fee;

        // Cash is collected in person, so money is already "in flight";
        // online methods start unpaid until a verification succeeds
        let payment_status = if req.payment_method.is_cash() {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Unpaid
        };

        let now = Utc::now();
        let order = Order {
            id: Some(order_id.clone()),
            code: random_code("ORD", 8),
            user: user_id,
            address: address_record,
            dining_table: table_record.clone(),
            admin: None,
            subtotal,
            delivery_fee,
            total,
            payment_method: req.payment_method,
            delivery_method: req.delivery_method,
            payment_status,
            status: OrderStatus::Pending,
            cancelled_by_customer: false,
            customer_cancelled_at: None,
            payment_verified_at: None,
            created_at: now,
            updated_at: now,
        };

        let payment = Payment {
            id: None,
            order: order_id.clone(),
            payment_id: random_code("PAY", 12),
            amount: total,
            payment_method: req.payment_method,
            status: PaymentState::Pending,
            reference: None,
            metadata: None,
            verified_at: None,
            created_at: now,
            updated_at: now,
        };

        self.orders()
            .create_with_items(NewOrder {
                order,
                items,
                payment,
                occupy_table: table_record,
            })
            .await?;

        tracing::info!(order = %order_id, user = %actor.id, "Order created");
        self.detail(&order_id).await
    }

    // =========================================================================
    // transition (admin)
    // =========================================================================

    /// Apply an admin update: status transition, explicit payment status
    /// and/or address change. Side effects (cash auto-paid on completion,
    /// refund on cancel of a paid order, payment made successful on
    /// delivery, payment mirroring, table release) commit atomically.
    pub async fn transition(
        &self,
        actor: &CurrentUser,
        order_id: &str,
        update: OrderUpdate,
    ) -> AppResult<OrderDetail> {
        if !actor.is_admin() {
            return Err(AppError::forbidden("Only admins may update orders"));
        }
        let record = parse_id(order_id, "order")?;
        let (mut order, _items, payment) = self
            .orders()
            .find_detail(&record)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;

        // Pre-update money state drives the refund rule below
        let was_paid = order.payment_status == PaymentStatus::Paid;

        // --- address change (pending orders only, owner's address) ---
        if let Some(address_id) = &update.address_id {
            if order.status != OrderStatus::Pending {
                return Err(AppError::business_rule(
                    "Address can only be changed when order is pending",
                ));
            }
            let mut errors: BTreeMap<String, String> = BTreeMap::new();
            match parse_id(address_id, "address") {
                Err(_) => {
                    errors.insert("address_id".to_string(), "Invalid address ID.".to_string());
                }
                Ok(address_record) => {
                    let repo = AddressRepository::new(self.db.clone());
                    match repo.find_by_id(address_id).await? {
                        Some(address) if address.user == order.user => {
                            order.address = Some(address_record);
                        }
                        Some(_) => {
                            errors.insert(
                                "address_id".to_string(),
                                "Address does not belong to the order's owner.".to_string(),
                            );
                        }
                        None => {
                            errors.insert(
                                "address_id".to_string(),
                                "Address not found.".to_string(),
                            );
                        }
                    }
                }
            }
            if !errors.is_empty() {
                return Err(AppError::FieldErrors(errors));
            }
        }

        // --- explicit payment status ---
        if let Some(payment_status) = update.payment_status {
            order.payment_status = payment_status;
        }

        // --- status transition with side effects ---
        if let Some(next) = update.status {
            if !order.status.can_transition_to(next) {
                return Err(AppError::business_rule(format!(
                    "Cannot transition order from {} to {}",
                    order.status, next
                )));
            }
            match next {
                OrderStatus::Completed => {
                    if order.payment_method.is_cash() {
                        order.payment_status = PaymentStatus::Paid;
                    }
                }
                OrderStatus::Cancelled => {
                    // Admin-initiated cancel: not a customer cancellation
                    order.cancelled_by_customer = false;
                    order.customer_cancelled_at = None;
                    if was_paid {
                        order.payment_status = PaymentStatus::Refunded;
                    }
                }
                OrderStatus::Delivered => {
                    if order.payment_status != PaymentStatus::Paid && payment.is_some() {
                        order.payment_status = PaymentStatus::Paid;
                    }
                }
                OrderStatus::Pending | OrderStatus::Processing => {}
            }
            order.status = next;
        }

        order.admin = Some(
            actor
                .record_id()
                .map_err(AppError::invalid_token)?,
        );

        // Keep the payment record synchronized with the resulting status
        let payment = payment.map(|mut p| {
            p.status = PaymentState::mirror_of(order.payment_status);
            p
        });

        // Terminal fulfillment frees the table
        let release_table = if matches!(
            order.status,
            OrderStatus::Completed | OrderStatus::Cancelled
        ) {
            order.dining_table.clone()
        } else {
            None
        };

        self.orders()
            .persist_transition(TransitionWrite {
                order,
                payment,
                release_table,
            })
            .await?;

        tracing::info!(order = %record, admin = %actor.id, "Order updated");
        self.detail(&record).await
    }

    // =========================================================================
    // customer cancel
    // =========================================================================

    /// Cancel a pending order as its owner. Once an order is accepted
    /// (processing or later) only an admin may cancel it.
    pub async fn customer_cancel(
        &self,
        actor: &CurrentUser,
        order_id: &str,
    ) -> AppResult<OrderDetail> {
        let user_id = actor
            .record_id()
            .map_err(AppError::invalid_token)?;
        let record = parse_id(order_id, "order")?;
        let (mut order, _items, payment) = self
            .orders()
            .find_detail(&record)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;

        if order.user != user_id {
            return Err(AppError::forbidden("You can only cancel your own orders"));
        }
        if order.status != OrderStatus::Pending {
            return Err(AppError::business_rule(
                "Order can only be cancelled while in pending status",
            ));
        }

        order.status = OrderStatus::Cancelled;
        order.payment_status = PaymentStatus::Refunded;
        order.cancelled_by_customer = true;
        order.customer_cancelled_at = Some(Utc::now());

        let payment = payment.map(|mut p| {
            p.status = PaymentState::Refunded;
            p
        });
        let release_table = order.dining_table.clone();

        self.orders()
            .persist_transition(TransitionWrite {
                order,
                payment,
                release_table,
            })
            .await?;

        tracing::info!(order = %record, user = %actor.id, "Order cancelled by customer");
        self.detail(&record).await
    }

    // =========================================================================
    // queries
    // =========================================================================

    /// Order detail for its owner or an admin. Missing orders are 404
    /// before the ownership check.
    pub async fn get(&self, actor: &CurrentUser, order_id: &str) -> AppResult<OrderDetail> {
        let record = parse_id(order_id, "order")?;
        let detail = self
            .orders()
            .find_detail(&record)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;
        let (order, items, payment) = detail;

        let user_id = actor
            .record_id()
            .map_err(AppError::invalid_token)?;
        if !actor.is_admin() && order.user != user_id {
            return Err(AppError::forbidden(
                "You do not have permission to view this order",
            ));
        }

        Ok(OrderDetail {
            order,
            items,
            payment,
        })
    }

    /// List orders: customers see their own, admins see everything
    pub async fn list(
        &self,
        actor: &CurrentUser,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Order>> {
        let user = if actor.is_admin() {
            None
        } else {
            Some(
                actor
                    .record_id()
                    .map_err(AppError::invalid_token)?,
            )
        };
        let orders = self
            .orders()
            .list(OrderListFilter {
                user,
                status,
                limit,
                offset,
            })
            .await?;
        Ok(orders)
    }

    async fn detail(&self, record: &RecordId) -> AppResult<OrderDetail> {
        let (order, items, payment) = self
            .orders()
            .find_detail(record)
            .await?
            .ok_or_else(|| AppError::internal("Order missing after write"))?;
        Ok(OrderDetail {
            order,
            items,
            payment,
        })
    }
}

#[cfg(test)]
mod tests;
