//! Database Models
//!
//! Entity structs and request/response payloads per table.
//! All ids use SurrealDB [`RecordId`](surrealdb::RecordId) serialized as
//! "table:id" strings; every monetary field is a [`rust_decimal::Decimal`].

pub mod serde_helpers;

pub mod address;
pub mod category;
pub mod dining_table;
pub mod order;
pub mod payment;
pub mod product;
pub mod setting;
pub mod user;

pub use address::{Address, AddressCreate, AddressUpdate};
pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use dining_table::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};
pub use order::{
    CartLine, DeliveryMethod, Order, OrderCreate, OrderDetail, OrderId, OrderItem, OrderStatus,
    OrderUpdate, PaymentMethod, PaymentStatus,
};
pub use payment::{Payment, PaymentState};
pub use product::{Product, ProductCreate, ProductId, ProductStatus, ProductUpdate};
pub use setting::{
    CompanyInfo, GatewayConfig, GeneralSettings, Settings, SettingsUpdate, TransactionMode,
};
pub use user::{Role, User, UserId};
