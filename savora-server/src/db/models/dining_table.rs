//! Dining Table Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Table occupancy status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
            TableStatus::Maintenance => "maintenance",
        }
    }
}

/// Dining table entity (桌台)
///
/// Invariant: an active dine-in order keeps exactly one table occupied;
/// the order lifecycle releases it when the order reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_capacity")]
    pub capacity: i32,
    pub status: TableStatus,
    pub location: Option<String>,
}

fn default_capacity() -> i32 {
    4
}

/// Create dining table payload
#[derive(Debug, Clone, Deserialize)]
pub struct DiningTableCreate {
    pub name: String,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
}

/// Update dining table payload
#[derive(Debug, Clone, Deserialize)]
pub struct DiningTableUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub status: Option<TableStatus>,
    pub location: Option<String>,
}
