//! Product Model

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type ProductId = RecordId;

/// Product lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Disabled,
    /// Soft-deleted: hidden from all listings, kept for order history
    Deleted,
}

/// Catalog product entity
///
/// `price`/`discounted_price` are the *current* catalog prices; orders
/// snapshot them at creation time and never read them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ProductId>,
    pub title: String,
    pub price: Decimal,
    pub discounted_price: Option<Decimal>,
    pub description: Option<String>,
    pub status: ProductStatus,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_featured: bool,
    #[serde(with = "serde_helpers::record_id")]
    pub category: RecordId,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Product {
    /// Effective selling price: discounted price wins when present
    pub fn effective_price(&self) -> Decimal {
        self.discounted_price.unwrap_or(self.price)
    }

    pub fn is_purchasable(&self) -> bool {
        matches!(self.status, ProductStatus::Active)
    }
}

/// Create product payload
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub title: String,
    pub price: Decimal,
    pub discounted_price: Option<Decimal>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    /// Category id as "category:xxx"
    #[serde(with = "serde_helpers::record_id")]
    pub category: RecordId,
}

/// Update product payload
#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    /// Absent = untouched; explicit null clears the discount
    #[serde(default, deserialize_with = "serde_helpers::double_option::deserialize")]
    pub discounted_price: Option<Option<Decimal>>,
    pub description: Option<String>,
    pub status: Option<ProductStatus>,
    pub is_featured: Option<bool>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub category: Option<RecordId>,
}
