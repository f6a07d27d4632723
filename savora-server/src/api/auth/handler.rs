//! Authentication Handlers
//!
//! Handles registration, login and current-user lookup. JWTs are stateless;
//! logout is a client-side token drop.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Role, User};
use crate::db::repository::UserRepository;
use crate::utils::validation::check_payload;
use crate::utils::{ApiResponse, AppError, AppResult, ok, ok_with_message};

/// Registration request payload
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters."))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "First name is required."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required."))]
    pub last_name: String,
    #[validate(length(max = 100))]
    pub phone: Option<String>,
}

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response with JWT token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// User information returned after login
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl UserInfo {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            email: user.email.clone(),
            name: format!("{} {}", user.first_name, user.last_name),
            role: user.role,
        }
    }
}

/// POST /api/auth/register - 注册新顾客账号
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    check_payload(&req)?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .create(
            &req.email,
            &req.password,
            &req.first_name,
            &req.last_name,
            req.phone,
            Role::Customer,
        )
        .await?;

    let info = UserInfo::from_user(&user);
    let token = state
        .jwt_service
        .generate_token(&info.id, &user.email, &info.name, user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(user_id = %info.id, email = %user.email, "User registered");

    Ok(ok_with_message(
        LoginResponse { token, user: info },
        "Registration successful",
    ))
}

/// POST /api/auth/login - 登录
///
/// Authenticates user credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let repo = UserRepository::new(state.db.clone());

    let user = repo
        .find_by_email(&req.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    // Check if user is active
    if !user.is_active {
        return Err(AppError::forbidden("Account has been disabled"));
    }

    // Verify password using argon2
    let password_valid = user
        .verify_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

    if !password_valid {
        return Err(AppError::invalid_credentials());
    }

    let info = UserInfo::from_user(&user);
    let token = state
        .jwt_service
        .generate_token(&info.id, &user.email, &info.name, user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = %info.id,
        email = %user.email,
        role = %user.role.as_str(),
        "User logged in successfully"
    );

    Ok(ok(LoginResponse { token, user: info }))
}

/// GET /api/auth/me - 当前用户信息
pub async fn me(user: CurrentUser) -> AppResult<Json<ApiResponse<UserInfo>>> {
    Ok(ok(UserInfo {
        id: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
    }))
}
