//! Address API Handlers
//!
//! All routes are scoped to the authenticated user's own addresses.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Address, AddressCreate, AddressUpdate};
use crate::db::repository::AddressRepository;
use crate::utils::validation::check_payload;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

/// Load an address, enforcing ownership
async fn owned_address(
    repo: &AddressRepository,
    user: &CurrentUser,
    id: &str,
) -> AppResult<Address> {
    let address = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Address {} not found", id)))?;
    let user_id = user.record_id().map_err(AppError::invalid_token)?;
    if address.user != user_id {
        return Err(AppError::forbidden("You can only manage your own addresses"));
    }
    Ok(address)
}

/// GET /api/addresses - 当前用户的所有地址
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Address>>>> {
    let user_id = user.record_id().map_err(AppError::invalid_token)?;
    let repo = AddressRepository::new(state.db.clone());
    let addresses = repo.find_by_user(&user_id).await?;
    Ok(ok(addresses))
}

/// POST /api/addresses - 新建地址
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<AddressCreate>,
) -> AppResult<Json<ApiResponse<Address>>> {
    check_payload(&payload)?;

    let user_id = user.record_id().map_err(AppError::invalid_token)?;
    let repo = AddressRepository::new(state.db.clone());
    let address = repo.create(&user_id, payload).await?;
    Ok(ok(address))
}

/// PUT /api/addresses/:id - 更新地址
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<AddressUpdate>,
) -> AppResult<Json<ApiResponse<Address>>> {
    check_payload(&payload)?;

    let repo = AddressRepository::new(state.db.clone());
    owned_address(&repo, &user, &id).await?;
    let address = repo.update(&id, payload).await?;
    Ok(ok(address))
}

/// DELETE /api/addresses/:id - 删除地址
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let repo = AddressRepository::new(state.db.clone());
    owned_address(&repo, &user, &id).await?;
    let result = repo.delete(&id).await?;
    Ok(ok(result))
}

/// POST /api/addresses/:id/set-default - 设为默认地址
pub async fn set_default(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let repo = AddressRepository::new(state.db.clone());
    let address = owned_address(&repo, &user, &id).await?;

    let address_id = address
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Address record id missing"))?;
    repo.promote_default(&address.user, &address_id).await?;

    let refreshed = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::internal("Address missing after update"))?;
    Ok(ok(refreshed))
}
