//! Settings API 模块

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/settings", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new().route("/", get(handler::get));

    let manage_routes = Router::new()
        .route("/", post(handler::update))
        .route(
            "/payment-gateways/{id}/toggle",
            post(handler::toggle_gateway),
        )
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
