//! Order API Handlers
//!
//! Thin layer over [`OrderLifecycle`]: extract → delegate → envelope.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderDetail, OrderStatus, OrderUpdate};
use crate::orders::OrderLifecycle;
use crate::utils::{ApiResponse, AppResult, ok, ok_with_message};

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub status: Option<OrderStatus>,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/orders - 订单列表 (顾客看自己的，管理员看全部)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let lifecycle = OrderLifecycle::new(state.db.clone());
    let orders = lifecycle
        .list(&user, query.status, query.limit.clamp(1, 100), query.offset)
        .await?;
    Ok(ok(orders))
}

/// POST /api/orders - 下单
///
/// Validation failures return 422 with a field-level error map; success
/// returns 201 with the created order, its items and the payment stub.
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderDetail>>)> {
    let lifecycle = OrderLifecycle::new(state.db.clone());
    let detail = lifecycle.create(&user, payload).await?;
    Ok((
        StatusCode::CREATED,
        ok_with_message(detail, "The order has been created successfully."),
    ))
}

/// GET /api/orders/:id - 订单详情 (本人或管理员)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let lifecycle = OrderLifecycle::new(state.db.clone());
    let detail = lifecycle.get(&user, &id).await?;
    Ok(ok(detail))
}

/// POST /api/orders/:id - 管理员更新订单 (状态流转 / 支付状态 / 地址)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let lifecycle = OrderLifecycle::new(state.db.clone());
    let detail = lifecycle.transition(&user, &id, payload).await?;
    Ok(ok_with_message(detail, "Order updated successfully"))
}

/// POST /api/orders/:id/cancel - 顾客撤单 (仅 pending)
pub async fn customer_cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let lifecycle = OrderLifecycle::new(state.db.clone());
    let detail = lifecycle.customer_cancel(&user, &id).await?;
    Ok(ok_with_message(detail, "Order has been cancelled successfully"))
}
