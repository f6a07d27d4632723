//! 订单生命周期
//!
//! [`OrderLifecycle`] 将订单的每次变更建模为显式的原子操作：
//! 创建 (定价快照 + 支付桩 + 桌台占用)、状态流转、顾客撤单。

pub mod manager;

pub use manager::OrderLifecycle;
