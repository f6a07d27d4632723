//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口 (注册 / 登录 / 当前用户)
//! - [`addresses`] - 收货地址管理接口
//! - [`categories`] - 分类管理接口
//! - [`products`] - 商品管理接口
//! - [`tables`] - 桌台管理接口
//! - [`orders`] - 订单管理接口
//! - [`payments`] - 支付管理接口
//! - [`settings`] - 系统设置接口

pub mod auth;
pub mod health;

// Catalog + location
pub mod categories;
pub mod products;
pub mod tables;

// Customer data
pub mod addresses;

// Orders + payments
pub mod orders;
pub mod payments;

// Admin
pub mod settings;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};
