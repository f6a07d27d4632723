//! Address Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Delivery address entity (belongs to a user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_default: bool,
}

/// Create address payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddressCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub phone: String,
    #[validate(length(min = 1, max = 500))]
    pub street: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Update address payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddressUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub street: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub state: Option<String>,
    pub is_default: Option<bool>,
}
