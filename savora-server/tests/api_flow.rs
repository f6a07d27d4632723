//! End-to-end API tests: the composed router driven as a tower service,
//! backed by a throwaway embedded database.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::Service;

use savora_server::core::server::build_router;
use savora_server::core::{Config, ServerState};
use savora_server::db::models::Role;
use savora_server::db::repository::UserRepository;

struct TestApp {
    app: Router,
    state: ServerState,
    // Keeps the database directory alive for the test's duration
    _work_dir: tempfile::TempDir,
}

async fn spawn_app() -> TestApp {
    let work_dir = tempfile::tempdir().expect("temp dir");
    let config = Config::with_overrides(work_dir.path().to_string_lossy().to_string(), 0);
    let state = ServerState::initialize(&config)
        .await
        .expect("state init");

    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        _work_dir: work_dir,
    }
}

impl TestApp {
    async fn request(
        &mut self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self.app.call(request).await.expect("router call");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    /// Register a customer via the API and return their token
    async fn register(&mut self, email: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": "password123",
                    "first_name": "Test",
                    "last_name": "User",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        body["data"]["token"].as_str().expect("token").to_string()
    }

    /// Create an admin directly and log in via the API
    async fn admin_token(&mut self) -> String {
        UserRepository::new(self.state.db.clone())
            .create(
                "ops@savora.test",
                "password123",
                "Ops",
                "Admin",
                None,
                Role::Admin,
            )
            .await
            .expect("seed admin");

        let (status, body) = self
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": "ops@savora.test", "password": "password123"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
        body["data"]["token"].as_str().expect("token").to_string()
    }

    /// Seed a category + product through the admin API; returns the product id
    async fn seed_product(&mut self, admin: &str, title: &str, price: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/categories",
                Some(admin),
                Some(json!({"name": format!("Cat for {title}")})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "category create failed: {body}");
        let category_id = body["data"]["id"].as_str().expect("category id").to_string();

        let (status, body) = self
            .request(
                "POST",
                "/api/products",
                Some(admin),
                Some(json!({
                    "title": title,
                    "price": price,
                    "category": category_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "product create failed: {body}");
        body["data"]["id"].as_str().expect("product id").to_string()
    }
}

#[tokio::test]
async fn public_catalog_needs_no_auth_but_orders_do() {
    let mut app = spawn_app().await;

    let (status, _) = app.request("GET", "/api/products", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.request("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.request("GET", "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn full_order_flow_over_http() {
    let mut app = spawn_app().await;
    let admin = app.admin_token().await;
    let customer = app.register("alice@savora.test").await;
    let product_id = app.seed_product(&admin, "Jollof Rice", "12.50").await;

    // Place a pickup order
    let (status, body) = app
        .request(
            "POST",
            "/api/orders",
            Some(&customer),
            Some(json!({
                "payment_method": "paystack",
                "delivery_method": "pickup",
                "products": [{"id": product_id, "quantity": 2}],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "order create failed: {body}");
    assert_eq!(body["status"], "success");
    let order = &body["data"]["order"];
    assert_eq!(order["subtotal"], "25.00");
    assert_eq!(order["total"], "25.00");
    assert_eq!(order["status"], "pending");
    let order_id = order["id"].as_str().expect("order id").to_string();
    assert!(body["data"]["payment"]["payment_id"]
        .as_str()
        .unwrap()
        .starts_with("PAY-"));

    // Owner sees it; a stranger gets 403
    let (status, _) = app
        .request("GET", &format!("/api/orders/{order_id}"), Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let stranger = app.register("mallory@savora.test").await;
    let (status, _) = app
        .request("GET", &format!("/api/orders/{order_id}"), Some(&stranger), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin accepts the order
    let (status, body) = app
        .request(
            "POST",
            &format!("/api/orders/{order_id}"),
            Some(&admin),
            Some(json!({"status": "processing"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "admin update failed: {body}");
    assert_eq!(body["data"]["order"]["status"], "processing");

    // Customer may no longer cancel
    let (status, _) = app
        .request(
            "POST",
            &format!("/api/orders/{order_id}/cancel"),
            Some(&customer),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_validation_returns_field_error_map() {
    let mut app = spawn_app().await;
    let customer = app.register("bob@savora.test").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/orders",
            Some(&customer),
            Some(json!({
                "payment_method": "cash",
                "delivery_method": "delivery",
                "products": [],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert!(body["errors"]["products"].is_string());
    assert!(body["errors"]["address_id"].is_string());
    assert!(body["errors"]["payment_method"].is_string());
}

#[tokio::test]
async fn customer_cancel_and_cash_verification() {
    let mut app = spawn_app().await;
    let admin = app.admin_token().await;
    let customer = app.register("carol@savora.test").await;
    let product_id = app.seed_product(&admin, "Moi Moi", "4.00").await;

    // Dine-in needs a table
    let (status, body) = app
        .request(
            "POST",
            "/api/tables",
            Some(&admin),
            Some(json!({"name": "T1", "capacity": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "table create failed: {body}");
    let table_id = body["data"]["id"].as_str().expect("table id").to_string();

    let (status, body) = app
        .request(
            "POST",
            "/api/orders",
            Some(&customer),
            Some(json!({
                "table_id": table_id,
                "payment_method": "cash",
                "delivery_method": "dine-in",
                "products": [{"id": product_id, "quantity": 1}],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "order create failed: {body}");
    let order_id = body["data"]["order"]["id"].as_str().unwrap().to_string();

    // Table is now occupied
    let (_, body) = app
        .request("GET", &format!("/api/tables/{table_id}"), None, None)
        .await;
    assert_eq!(body["data"]["status"], "occupied");

    // Cash verification marks the order paid
    let (status, body) = app
        .request(
            "POST",
            "/api/payments/verify",
            Some(&customer),
            Some(json!({
                "order_id": order_id,
                "reference": "CASH-01",
                "gateway": "cash",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "verify failed: {body}");

    // Owner cancels while still pending: table released, payment refunded
    let (status, body) = app
        .request(
            "POST",
            &format!("/api/orders/{order_id}/cancel"),
            Some(&customer),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "cancel failed: {body}");
    assert_eq!(body["data"]["order"]["status"], "cancelled");
    assert_eq!(body["data"]["order"]["cancelled_by_customer"], true);
    assert_eq!(body["data"]["payment"]["status"], "refunded");

    let (_, body) = app
        .request("GET", &format!("/api/tables/{table_id}"), None, None)
        .await;
    assert_eq!(body["data"]["status"], "available");
}

#[tokio::test]
async fn payment_initiate_rejects_amount_mismatch_over_http() {
    let mut app = spawn_app().await;
    let admin = app.admin_token().await;
    let customer = app.register("dan@savora.test").await;
    let product_id = app.seed_product(&admin, "Chin Chin", "3.00").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/orders",
            Some(&customer),
            Some(json!({
                "payment_method": "paystack",
                "delivery_method": "pickup",
                "products": [{"id": product_id, "quantity": 1}],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "order create failed: {body}");
    let order_id = body["data"]["order"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            "POST",
            "/api/payments/initiate",
            Some(&customer),
            Some(json!({
                "order_id": order_id,
                "amount": "5.00",
                "payment_method": "paystack",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["amount"].is_string());
}

#[tokio::test]
async fn admin_routes_reject_customers() {
    let mut app = spawn_app().await;
    let customer = app.register("eve@savora.test").await;

    let (status, _) = app
        .request(
            "POST",
            "/api/categories",
            Some(&customer),
            Some(json!({"name": "Sneaky"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request("GET", "/api/payments", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
