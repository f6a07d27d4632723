//! 认证模块
//!
//! JWT + Argon2 认证体系：
//! - [`JwtService`] - 令牌生成与验证
//! - [`CurrentUser`] - 请求上下文中的已认证用户
//! - [`require_auth`] / [`require_admin`] - Axum 中间件

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};
