//! Payment API 模块

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    let customer_routes = Router::new()
        .route("/initiate", post(handler::initiate))
        .route("/verify", post(handler::verify));

    let admin_routes = Router::new()
        .route("/", get(handler::list))
        .route(
            "/{id}",
            get(handler::get_by_id).patch(handler::admin_update),
        )
        .layer(middleware::from_fn(require_admin));

    customer_routes.merge(admin_routes)
}
