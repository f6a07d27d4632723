//! Savora Server - 餐厅在线点餐后端
//!
//! # 架构概述
//!
//! 本模块是 Savora 点餐后端的主入口，提供以下核心功能：
//!
//! - **认证** (`auth`): JWT + Argon2 认证体系 (admin / customer 双角色)
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储 (模型 + 仓储)
//! - **订单** (`orders`): 订单生命周期管理 (创建 / 流转 / 撤单)
//! - **支付** (`payments`): 支付发起与网关校验 (Paystack / Flutterwave / 现金)
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! savora-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、角色
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (模型 + 仓储)
//! ├── orders/        # 订单生命周期
//! ├── payments/      # 支付校验服务
//! └── utils/         # 错误、日志、校验工具
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod payments;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::OrderLifecycle;
pub use payments::PaymentService;
pub use utils::{ApiResponse, AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() {
    dotenv::dotenv().ok();
    init_logger();
}

pub fn print_banner() {
    println!(
        r#"
   _____
  / ___/____ __   ______  _________ _
  \__ \/ __ `/ | / / __ \/ ___/ __ `/
 ___/ / /_/ /| |/ / /_/ / /  / /_/ /
/____/\__,_/ |___/\____/_/   \__,_/
    "#
    );
}
