use super::*;
use crate::db::models::{
    DeliveryMethod, OrderCreate, OrderStatus, OrderUpdate, PaymentState, PaymentStatus,
};
use crate::utils::AppError;

async fn pending_dine_in_order(
    db: &Surreal<Db>,
    actor: &CurrentUser,
    table_id: &str,
) -> String {
    let burger = seed_product(db, "Burger", "10.00", None).await;
    let detail = OrderLifecycle::new(db.clone())
        .create(
            actor,
            OrderCreate {
                address_id: None,
                table_id: Some(table_id.to_string()),
                payment_method: PaymentMethod::Cash,
                delivery_method: DeliveryMethod::DineIn,
                products: vec![cart_line(&burger, 1)],
            },
        )
        .await
        .expect("order should be created");
    detail.order.id.as_ref().unwrap().to_string()
}

#[tokio::test]
async fn customer_cancels_pending_order() {
    let (_dir, db) = test_db().await;
    let customer = seed_customer(&db, "alice@savora.test").await;
    let table = seed_table(&db, "T1").await;
    let table_id = table.id.as_ref().unwrap().to_string();
    let order_id = pending_dine_in_order(&db, &customer, &table_id).await;

    let cancelled = OrderLifecycle::new(db.clone())
        .customer_cancel(&customer, &order_id)
        .await
        .expect("owner cancels pending order");

    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    assert!(cancelled.order.cancelled_by_customer);
    assert!(cancelled.order.customer_cancelled_at.is_some());
    assert_eq!(cancelled.order.payment_status, PaymentStatus::Refunded);
    assert_eq!(
        cancelled.payment.expect("payment").status,
        PaymentState::Refunded
    );
    assert_eq!(table_status(&db, &table_id).await, TableStatus::Available);
}

#[tokio::test]
async fn customer_cannot_cancel_processing_order() {
    let (_dir, db) = test_db().await;
    let customer = seed_customer(&db, "bob@savora.test").await;
    let admin = seed_admin(&db).await;
    let table = seed_table(&db, "T2").await;
    let table_id = table.id.as_ref().unwrap().to_string();
    let order_id = pending_dine_in_order(&db, &customer, &table_id).await;

    let lifecycle = OrderLifecycle::new(db.clone());
    lifecycle
        .transition(
            &admin,
            &order_id,
            OrderUpdate {
                status: Some(OrderStatus::Processing),
                payment_status: None,
                address_id: None,
            },
        )
        .await
        .expect("accept order");

    let err = lifecycle
        .customer_cancel(&customer, &order_id)
        .await
        .expect_err("processing orders are admin-cancel only");
    assert!(matches!(err, AppError::BusinessRule(_)));

    // Untouched: still processing, table still occupied, nothing refunded
    let current = lifecycle.get(&admin, &order_id).await.expect("reread");
    assert_eq!(current.order.status, OrderStatus::Processing);
    assert!(!current.order.cancelled_by_customer);
    assert_eq!(table_status(&db, &table_id).await, TableStatus::Occupied);
}

#[tokio::test]
async fn customer_cannot_cancel_someone_elses_order() {
    let (_dir, db) = test_db().await;
    let owner = seed_customer(&db, "carol@savora.test").await;
    let other = seed_customer(&db, "mallory@savora.test").await;
    let table = seed_table(&db, "T3").await;
    let table_id = table.id.as_ref().unwrap().to_string();
    let order_id = pending_dine_in_order(&db, &owner, &table_id).await;

    let err = OrderLifecycle::new(db.clone())
        .customer_cancel(&other, &order_id)
        .await
        .expect_err("only the owner may cancel");
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn order_detail_is_owner_or_admin_only() {
    let (_dir, db) = test_db().await;
    let owner = seed_customer(&db, "dave@savora.test").await;
    let other = seed_customer(&db, "eve@savora.test").await;
    let admin = seed_admin(&db).await;
    let table = seed_table(&db, "T4").await;
    let table_id = table.id.as_ref().unwrap().to_string();
    let order_id = pending_dine_in_order(&db, &owner, &table_id).await;

    let lifecycle = OrderLifecycle::new(db.clone());
    assert!(lifecycle.get(&owner, &order_id).await.is_ok());
    assert!(lifecycle.get(&admin, &order_id).await.is_ok());

    let err = lifecycle
        .get(&other, &order_id)
        .await
        .expect_err("strangers may not view the order");
    assert!(matches!(err, AppError::Forbidden(_)));

    // Missing orders are 404 before any ownership check
    let err = lifecycle
        .get(&other, "order:doesnotexist")
        .await
        .expect_err("missing order");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn list_scopes_customers_to_their_own_orders() {
    let (_dir, db) = test_db().await;
    let alice = seed_customer(&db, "alice2@savora.test").await;
    let bob = seed_customer(&db, "bob2@savora.test").await;
    let admin = seed_admin(&db).await;
    let table_a = seed_table(&db, "TA").await;
    let table_b = seed_table(&db, "TB").await;

    let order_a =
        pending_dine_in_order(&db, &alice, &table_a.id.as_ref().unwrap().to_string()).await;
    let _order_b =
        pending_dine_in_order(&db, &bob, &table_b.id.as_ref().unwrap().to_string()).await;

    let lifecycle = OrderLifecycle::new(db.clone());
    let alice_orders = lifecycle.list(&alice, None, 50, 0).await.expect("list");
    assert_eq!(alice_orders.len(), 1);
    assert_eq!(
        alice_orders[0].id.as_ref().unwrap().to_string(),
        order_a
    );

    let all_orders = lifecycle.list(&admin, None, 50, 0).await.expect("list");
    assert_eq!(all_orders.len(), 2);

    // Status filter
    let cancelled = lifecycle
        .list(&admin, Some(OrderStatus::Cancelled), 50, 0)
        .await
        .expect("list");
    assert!(cancelled.is_empty());
}
