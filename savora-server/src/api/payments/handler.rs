//! Payment API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Payment, PaymentMethod, PaymentState};
use crate::db::repository::PaymentRepository;
use crate::db::repository::payment::PaymentListFilter;
use crate::payments::{
    InitiateOutcome, InitiatePaymentRequest, PaymentAdminUpdate, PaymentService,
    VerifyOutcome, VerifyPaymentRequest,
};
use crate::utils::{ApiResponse, AppError, AppResult, ok, ok_with_message};

fn service(state: &ServerState) -> PaymentService {
    PaymentService::new(state.db.clone(), state.http_client.clone())
}

/// POST /api/payments/initiate - 发起支付
pub async fn initiate(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<InitiatePaymentRequest>,
) -> AppResult<Json<ApiResponse<InitiateOutcome>>> {
    let outcome = service(&state).initiate(&user, payload).await?;
    Ok(ok_with_message(outcome, "Payment initiated successfully"))
}

/// POST /api/payments/verify - 校验支付
///
/// 网关侧的任何失败 (网络、配置缺失、金额不足) 都折叠为同一个 400 结果。
pub async fn verify(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<VerifyPaymentRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    match service(&state).verify(&user, payload).await? {
        VerifyOutcome::Verified => Ok(ok_with_message((), "Payment verified successfully")),
        VerifyOutcome::Failed => Err(AppError::business_rule("Payment verification failed")),
    }
}

/// Query params for the admin payment listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub status: Option<PaymentState>,
    pub method: Option<PaymentMethod>,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/payments - 支付列表 (admin)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Payment>>>> {
    let repo = PaymentRepository::new(state.db.clone());
    let payments = repo
        .list(PaymentListFilter {
            status: query.status,
            method: query.method,
            limit: query.limit.clamp(1, 100),
            offset: query.offset,
        })
        .await?;
    Ok(ok(payments))
}

/// GET /api/payments/:id - 支付详情 (admin)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let repo = PaymentRepository::new(state.db.clone());
    let payment = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Payment {} not found", id)))?;
    Ok(ok(payment))
}

/// PATCH /api/payments/:id - 管理员维护支付状态
pub async fn admin_update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<PaymentAdminUpdate>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let payment = service(&state).admin_update(&user, &id, payload).await?;
    Ok(ok_with_message(payment, "Payment updated successfully"))
}
