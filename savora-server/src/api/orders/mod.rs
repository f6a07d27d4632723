//! Order API 模块

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let customer_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", post(handler::customer_cancel));

    // Admin status/payment/address updates
    let admin_routes = Router::new()
        .route("/{id}", post(handler::update))
        .layer(middleware::from_fn(require_admin));

    customer_routes.merge(admin_routes)
}
