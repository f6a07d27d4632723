//! Settings API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{Settings, SettingsUpdate};
use crate::db::repository::SettingRepository;
use crate::utils::{ApiResponse, AppResult, ok, ok_with_message};

/// GET /api/settings - 公共设置 (密钥已剥离)
pub async fn get(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Settings>>> {
    let repo = SettingRepository::new(state.db.clone());
    let settings = repo.get().await?;
    Ok(ok(settings.public_view()))
}

/// POST /api/settings - 更新设置 (admin)
pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<SettingsUpdate>,
) -> AppResult<Json<ApiResponse<Settings>>> {
    let repo = SettingRepository::new(state.db.clone());
    let settings = repo.update(payload).await?;
    Ok(ok_with_message(settings, "Settings updated successfully"))
}

/// POST /api/settings/payment-gateways/:id/toggle - 启停支付网关 (admin)
pub async fn toggle_gateway(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Settings>>> {
    let repo = SettingRepository::new(state.db.clone());
    let settings = repo.toggle_gateway(&id).await?;
    Ok(ok_with_message(settings, "Gateway updated"))
}
