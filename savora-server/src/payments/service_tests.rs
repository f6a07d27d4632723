//! Payment service tests against a throwaway embedded database.
//!
//! Gateway HTTP paths are exercised only up to the configuration guard:
//! a disabled/unconfigured gateway must collapse to a failed verification
//! without any network traffic.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tempfile::TempDir;

use super::*;
use crate::auth::CurrentUser;
use crate::db::DbService;
use crate::db::models::{
    CartLine, CategoryCreate, DeliveryMethod, OrderCreate, OrderDetail, OrderStatus,
    ProductCreate, Role,
};
use crate::db::repository::{CategoryRepository, ProductRepository, UserRepository};
use crate::orders::OrderLifecycle;
use crate::utils::AppError;

async fn test_db() -> (TempDir, Surreal<Db>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("test.db");
    let service = DbService::new(&path.to_string_lossy())
        .await
        .expect("Failed to open test database");
    (dir, service.db)
}

async fn seed_customer(db: &Surreal<Db>, email: &str) -> CurrentUser {
    let user = UserRepository::new(db.clone())
        .create(email, "password123", "Pay", "Tester", None, Role::Customer)
        .await
        .expect("Failed to seed customer");
    CurrentUser {
        id: user.id.as_ref().unwrap().to_string(),
        email: user.email.clone(),
        name: "Pay Tester".to_string(),
        role: user.role,
    }
}

/// A pickup order for 10.00, paid online
async fn seed_order(db: &Surreal<Db>, actor: &CurrentUser) -> OrderDetail {
    let categories = CategoryRepository::new(db.clone());
    let category = categories
        .create(CategoryCreate {
            name: format!("Cat-{}", actor.email),
            description: None,
        })
        .await
        .expect("category");
    let product = ProductRepository::new(db.clone())
        .create(ProductCreate {
            title: "Suya".to_string(),
            price: "10.00".parse().unwrap(),
            discounted_price: None,
            description: None,
            is_featured: false,
            category: category.id.unwrap(),
        })
        .await
        .expect("product");

    OrderLifecycle::new(db.clone())
        .create(
            actor,
            OrderCreate {
                address_id: None,
                table_id: None,
                payment_method: PaymentMethod::Paystack,
                delivery_method: DeliveryMethod::Pickup,
                products: vec![CartLine {
                    id: product.id.as_ref().unwrap().to_string(),
                    quantity: 1,
                }],
            },
        )
        .await
        .expect("order")
}

fn service_for(db: &Surreal<Db>) -> PaymentService {
    PaymentService::new(db.clone(), reqwest::Client::new())
}

#[tokio::test]
async fn initiate_rejects_amount_mismatch() {
    let (_dir, db) = test_db().await;
    let actor = seed_customer(&db, "a@savora.test").await;
    let detail = seed_order(&db, &actor).await;
    let order_id = detail.order.id.as_ref().unwrap().to_string();

    let err = service_for(&db)
        .initiate(
            &actor,
            InitiatePaymentRequest {
                order_id,
                amount: "9.50".parse().unwrap(),
                payment_method: PaymentMethod::Paystack,
            },
        )
        .await
        .expect_err("mismatched amount must be rejected");

    assert!(matches!(err, AppError::FieldErrors(ref map) if map.contains_key("amount")));
}

#[tokio::test]
async fn initiate_accepts_amount_within_tolerance() {
    let (_dir, db) = test_db().await;
    let actor = seed_customer(&db, "b@savora.test").await;
    let detail = seed_order(&db, &actor).await;
    let order_id = detail.order.id.as_ref().unwrap().to_string();

    // 10.01 vs 10.00 is inside the 0.01 tolerance; cash needs no gateway
    let outcome = service_for(&db)
        .initiate(
            &actor,
            InitiatePaymentRequest {
                order_id: order_id.clone(),
                amount: "10.01".parse().unwrap(),
                payment_method: PaymentMethod::Cash,
            },
        )
        .await
        .expect("within tolerance");

    assert_eq!(outcome.payment.status, PaymentState::Pending);
    assert_eq!(outcome.payment_url, None);
    // The stub created with the order is reused, not duplicated
    assert_eq!(
        outcome.payment.id.as_ref().unwrap(),
        detail.payment.as_ref().unwrap().id.as_ref().unwrap()
    );

    let order = OrderRepository::new(db.clone())
        .find_by_id(&order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn verify_cash_marks_order_paid() {
    let (_dir, db) = test_db().await;
    let actor = seed_customer(&db, "c@savora.test").await;
    let detail = seed_order(&db, &actor).await;
    let order_id = detail.order.id.as_ref().unwrap().to_string();

    let outcome = service_for(&db)
        .verify(
            &actor,
            VerifyPaymentRequest {
                order_id: order_id.clone(),
                reference: "CASH-001".to_string(),
                gateway: Gateway::Cash,
            },
        )
        .await
        .expect("cash verification");
    assert_eq!(outcome, VerifyOutcome::Verified);

    let order = OrderRepository::new(db.clone())
        .find_by_id(&order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert!(order.payment_verified_at.is_some());

    let payment = PaymentRepository::new(db.clone())
        .find_by_order(order.id.as_ref().unwrap())
        .await
        .unwrap()
        .expect("payment exists");
    assert_eq!(payment.status, PaymentState::Successful);
    assert_eq!(payment.reference.as_deref(), Some("CASH-001"));
    assert!(payment.verified_at.is_some());
}

#[tokio::test]
async fn verify_with_disabled_gateway_fails_without_network() {
    let (_dir, db) = test_db().await;
    let actor = seed_customer(&db, "d@savora.test").await;
    let detail = seed_order(&db, &actor).await;
    let order_id = detail.order.id.as_ref().unwrap().to_string();

    // Seeded settings ship every gateway disabled
    let outcome = service_for(&db)
        .verify(
            &actor,
            VerifyPaymentRequest {
                order_id: order_id.clone(),
                reference: "REF-123".to_string(),
                gateway: Gateway::Paystack,
            },
        )
        .await
        .expect("failure is an outcome, not an error");
    assert_eq!(outcome, VerifyOutcome::Failed);

    let order = OrderRepository::new(db.clone())
        .find_by_id(&order_id)
        .await
        .unwrap()
        .unwrap();
    // Money state reflects the failure; fulfillment is left alone
    assert_eq!(order.payment_status, PaymentStatus::Failed);
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.payment_verified_at.is_none());

    let payment = PaymentRepository::new(db.clone())
        .find_by_order(order.id.as_ref().unwrap())
        .await
        .unwrap()
        .expect("payment exists");
    assert_eq!(payment.status, PaymentState::Failed);
}

#[tokio::test]
async fn verify_is_idempotent_on_the_payment_record() {
    let (_dir, db) = test_db().await;
    let actor = seed_customer(&db, "e@savora.test").await;
    let detail = seed_order(&db, &actor).await;
    let order_id = detail.order.id.as_ref().unwrap().to_string();

    let service = service_for(&db);
    for _ in 0..2 {
        let _ = service
            .verify(
                &actor,
                VerifyPaymentRequest {
                    order_id: order_id.clone(),
                    reference: "REF-XYZ".to_string(),
                    gateway: Gateway::Paystack,
                },
            )
            .await
            .expect("verification attempt");
    }

    // Still exactly one payment row for the order
    let mut result = db
        .query("SELECT count() AS count FROM payment WHERE order = $order GROUP ALL")
        .bind(("order", detail.order.id.clone().unwrap()))
        .await
        .expect("count query");
    #[derive(serde::Deserialize)]
    struct CountRow {
        count: i64,
    }
    let rows: Vec<CountRow> = result.take(0).expect("rows");
    assert_eq!(rows.first().map(|r| r.count), Some(1));
}

#[tokio::test]
async fn verify_rejects_strangers_before_any_mutation() {
    let (_dir, db) = test_db().await;
    let owner = seed_customer(&db, "f@savora.test").await;
    let stranger = seed_customer(&db, "g@savora.test").await;
    let detail = seed_order(&db, &owner).await;
    let order_id = detail.order.id.as_ref().unwrap().to_string();

    let err = service_for(&db)
        .verify(
            &stranger,
            VerifyPaymentRequest {
                order_id: order_id.clone(),
                reference: "REF-123".to_string(),
                gateway: Gateway::Cash,
            },
        )
        .await
        .expect_err("strangers may not verify");
    assert!(matches!(err, AppError::Forbidden(_)));

    let order = OrderRepository::new(db.clone())
        .find_by_id(&order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
}
