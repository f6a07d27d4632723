use super::*;
use crate::db::models::{
    DeliveryMethod, OrderCreate, OrderDetail, OrderStatus, OrderUpdate, PaymentState,
    PaymentStatus,
};
use crate::utils::AppError;

async fn dine_in_cash_order(
    db: &Surreal<Db>,
    actor: &CurrentUser,
    table_id: &str,
) -> OrderDetail {
    let burger = seed_product(db, "Burger", "10.00", None).await;
    OrderLifecycle::new(db.clone())
        .create(
            actor,
            OrderCreate {
                address_id: None,
                table_id: Some(table_id.to_string()),
                payment_method: PaymentMethod::Cash,
                delivery_method: DeliveryMethod::DineIn,
                products: vec![cart_line(&burger, 2)],
            },
        )
        .await
        .expect("order should be created")
}

fn status_update(status: OrderStatus) -> OrderUpdate {
    OrderUpdate {
        status: Some(status),
        payment_status: None,
        address_id: None,
    }
}

#[tokio::test]
async fn completing_cash_order_pays_and_releases_table() {
    let (_dir, db) = test_db().await;
    let customer = seed_customer(&db, "alice@savora.test").await;
    let admin = seed_admin(&db).await;
    let table = seed_table(&db, "T1").await;
    let table_id = table.id.as_ref().unwrap().to_string();

    let detail = dine_in_cash_order(&db, &customer, &table_id).await;
    let order_id = detail.order.id.as_ref().unwrap().to_string();

    let lifecycle = OrderLifecycle::new(db.clone());
    lifecycle
        .transition(&admin, &order_id, status_update(OrderStatus::Processing))
        .await
        .expect("pending → processing");
    assert_eq!(table_status(&db, &table_id).await, TableStatus::Occupied);

    let completed = lifecycle
        .transition(&admin, &order_id, status_update(OrderStatus::Completed))
        .await
        .expect("processing → completed");

    assert_eq!(completed.order.status, OrderStatus::Completed);
    // Cash orders are force-paid on completion
    assert_eq!(completed.order.payment_status, PaymentStatus::Paid);
    let payment = completed.payment.expect("payment record");
    assert_eq!(payment.status, PaymentState::Successful);
    // Terminal state frees the table
    assert_eq!(table_status(&db, &table_id).await, TableStatus::Available);
    // Handling admin recorded
    assert!(completed.order.admin.is_some());
}

#[tokio::test]
async fn delivering_marks_unpaid_payment_successful() {
    let (_dir, db) = test_db().await;
    let customer = seed_customer(&db, "bob@savora.test").await;
    let admin = seed_admin(&db).await;
    let burger = seed_product(&db, "Burger", "10.00", None).await;
    set_delivery_fee(&db, "2.00").await;
    let address_id = seed_address(&db, &customer).await;

    let lifecycle = OrderLifecycle::new(db.clone());
    let detail = lifecycle
        .create(
            &customer,
            OrderCreate {
                address_id: Some(address_id),
                table_id: None,
                payment_method: PaymentMethod::Paystack,
                delivery_method: DeliveryMethod::Delivery,
                products: vec![cart_line(&burger, 1)],
            },
        )
        .await
        .expect("order created");
    let order_id = detail.order.id.as_ref().unwrap().to_string();
    assert_eq!(detail.order.payment_status, PaymentStatus::Unpaid);

    lifecycle
        .transition(&admin, &order_id, status_update(OrderStatus::Processing))
        .await
        .expect("pending → processing");

    let delivered = lifecycle
        .transition(&admin, &order_id, status_update(OrderStatus::Delivered))
        .await
        .expect("processing → delivered");

    assert_eq!(delivered.order.status, OrderStatus::Delivered);
    assert_eq!(delivered.order.payment_status, PaymentStatus::Paid);
    assert_eq!(
        delivered.payment.expect("payment").status,
        PaymentState::Successful
    );
}

#[tokio::test]
async fn admin_cancel_of_paid_order_refunds() {
    let (_dir, db) = test_db().await;
    let customer = seed_customer(&db, "carol@savora.test").await;
    let admin = seed_admin(&db).await;
    let table = seed_table(&db, "T3").await;
    let table_id = table.id.as_ref().unwrap().to_string();

    let detail = dine_in_cash_order(&db, &customer, &table_id).await;
    let order_id = detail.order.id.as_ref().unwrap().to_string();

    let lifecycle = OrderLifecycle::new(db.clone());
    // Mark paid while accepting the order
    lifecycle
        .transition(
            &admin,
            &order_id,
            OrderUpdate {
                status: Some(OrderStatus::Processing),
                payment_status: Some(PaymentStatus::Paid),
                address_id: None,
            },
        )
        .await
        .expect("accept + mark paid");

    let cancelled = lifecycle
        .transition(&admin, &order_id, status_update(OrderStatus::Cancelled))
        .await
        .expect("processing → cancelled");

    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    // Paid money is routed to refunded, never silently kept as paid
    assert_eq!(cancelled.order.payment_status, PaymentStatus::Refunded);
    assert_eq!(
        cancelled.payment.expect("payment").status,
        PaymentState::Refunded
    );
    // Admin-initiated cancel is not a customer cancellation
    assert!(!cancelled.order.cancelled_by_customer);
    assert!(cancelled.order.customer_cancelled_at.is_none());
    assert_eq!(table_status(&db, &table_id).await, TableStatus::Available);
}

#[tokio::test]
async fn invalid_transitions_are_rejected() {
    let (_dir, db) = test_db().await;
    let customer = seed_customer(&db, "dave@savora.test").await;
    let admin = seed_admin(&db).await;
    let table = seed_table(&db, "T4").await;
    let table_id = table.id.as_ref().unwrap().to_string();

    let detail = dine_in_cash_order(&db, &customer, &table_id).await;
    let order_id = detail.order.id.as_ref().unwrap().to_string();

    let lifecycle = OrderLifecycle::new(db.clone());
    // pending → completed skips processing
    let err = lifecycle
        .transition(&admin, &order_id, status_update(OrderStatus::Completed))
        .await
        .expect_err("pending → completed must be rejected");
    assert!(matches!(err, AppError::BusinessRule(_)));

    // State unchanged
    let current = lifecycle.get(&admin, &order_id).await.expect("reread");
    assert_eq!(current.order.status, OrderStatus::Pending);

    // Terminal states accept nothing further
    lifecycle
        .transition(&admin, &order_id, status_update(OrderStatus::Cancelled))
        .await
        .expect("pending → cancelled");
    let err = lifecycle
        .transition(&admin, &order_id, status_update(OrderStatus::Processing))
        .await
        .expect_err("cancelled is terminal");
    assert!(matches!(err, AppError::BusinessRule(_)));
}

#[tokio::test]
async fn non_admin_cannot_transition() {
    let (_dir, db) = test_db().await;
    let customer = seed_customer(&db, "erin@savora.test").await;
    let table = seed_table(&db, "T5").await;
    let table_id = table.id.as_ref().unwrap().to_string();

    let detail = dine_in_cash_order(&db, &customer, &table_id).await;
    let order_id = detail.order.id.as_ref().unwrap().to_string();

    let err = OrderLifecycle::new(db.clone())
        .transition(&customer, &order_id, status_update(OrderStatus::Processing))
        .await
        .expect_err("customers may not run admin transitions");
    assert!(matches!(err, AppError::Forbidden(_)));
}
