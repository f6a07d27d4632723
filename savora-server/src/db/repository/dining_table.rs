//! Dining Table Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all dining tables
    pub async fn find_all(&self) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM dining_table ORDER BY name")
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DiningTable>> {
        let record = parse_id(id, "dining_table")?;
        let table: Option<DiningTable> = self.base.db().select(record).await?;
        Ok(table)
    }

    /// Find table by name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Create a new dining table
    pub async fn create(&self, data: DiningTableCreate) -> RepoResult<DiningTable> {
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Table '{}' already exists",
                data.name
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE dining_table SET
                    name = $name,
                    description = $description,
                    capacity = $capacity,
                    status = $status,
                    location = $location
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("description", data.description))
            .bind(("capacity", data.capacity.unwrap_or(4)))
            .bind(("status", TableStatus::Available))
            .bind(("location", data.location))
            .await?;

        let created: Option<DiningTable> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create dining table".to_string()))
    }

    /// Update a dining table
    pub async fn update(&self, id: &str, data: DiningTableUpdate) -> RepoResult<DiningTable> {
        let record = parse_id(id, "dining_table")?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))?;

        if let Some(new_name) = &data.name
            && *new_name != existing.name
            && self.find_by_name(new_name).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Table '{}' already exists",
                new_name
            )));
        }

        let name = data.name.unwrap_or(existing.name);
        let description = data.description.or(existing.description);
        let capacity = data.capacity.unwrap_or(existing.capacity);
        let status = data.status.unwrap_or(existing.status);
        let location = data.location.or(existing.location);

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $record SET
                    name = $name,
                    description = $description,
                    capacity = $capacity,
                    status = $status,
                    location = $location
                RETURN AFTER"#,
            )
            .bind(("record", record))
            .bind(("name", name))
            .bind(("description", description))
            .bind(("capacity", capacity))
            .bind(("status", status))
            .bind(("location", location))
            .await?;

        let updated: Option<DiningTable> = result.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))
    }

    /// Set table occupancy status
    pub async fn set_status(&self, id: &RecordId, status: TableStatus) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $record SET status = $status")
            .bind(("record", id.clone()))
            .bind(("status", status))
            .await?
            .check()?;
        Ok(())
    }

    /// Delete a dining table
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let record = parse_id(id, "dining_table")?;
        let _: Option<DiningTable> = self.base.db().delete(record).await?;
        Ok(true)
    }
}
