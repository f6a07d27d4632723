//! Address Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Address, AddressCreate, AddressUpdate};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct AddressRepository {
    base: BaseRepository,
}

impl AddressRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All addresses of a user, default first
    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Vec<Address>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM address WHERE user = $user ORDER BY is_default DESC, name")
            .bind(("user", user.clone()))
            .await?;
        let addresses: Vec<Address> = result.take(0)?;
        Ok(addresses)
    }

    /// Find address by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Address>> {
        let record = parse_id(id, "address")?;
        let address: Option<Address> = self.base.db().select(record).await?;
        Ok(address)
    }

    /// Create a new address for a user
    pub async fn create(&self, user: &RecordId, data: AddressCreate) -> RepoResult<Address> {
        // First address of a user becomes the default
        let is_default = data.is_default || self.find_by_user(user).await?.is_empty();

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE address SET
                    user = $user,
                    name = $name,
                    phone = $phone,
                    street = $street,
                    city = $city,
                    state = $state,
                    is_default = $is_default
                RETURN AFTER"#,
            )
            .bind(("user", user.clone()))
            .bind(("name", data.name))
            .bind(("phone", data.phone))
            .bind(("street", data.street))
            .bind(("city", data.city))
            .bind(("state", data.state))
            .bind(("is_default", is_default))
            .await?;

        let created: Option<Address> = result.take(0)?;
        let created =
            created.ok_or_else(|| RepoError::Database("Failed to create address".to_string()))?;

        // A new default demotes the previous one
        if is_default && let Some(id) = &created.id {
            self.promote_default(user, id).await?;
        }

        Ok(created)
    }

    /// Update an address
    pub async fn update(&self, id: &str, data: AddressUpdate) -> RepoResult<Address> {
        let record = parse_id(id, "address")?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Address {} not found", id)))?;

        let name = data.name.unwrap_or(existing.name);
        let phone = data.phone.unwrap_or(existing.phone);
        let street = data.street.unwrap_or(existing.street);
        let city = data.city.unwrap_or(existing.city);
        let state = data.state.unwrap_or(existing.state);
        let is_default = data.is_default.unwrap_or(existing.is_default);

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $record SET
                    name = $name,
                    phone = $phone,
                    street = $street,
                    city = $city,
                    state = $state,
                    is_default = $is_default
                RETURN AFTER"#,
            )
            .bind(("record", record.clone()))
            .bind(("name", name))
            .bind(("phone", phone))
            .bind(("street", street))
            .bind(("city", city))
            .bind(("state", state))
            .bind(("is_default", is_default))
            .await?;

        let updated: Option<Address> = result.take(0)?;
        let updated =
            updated.ok_or_else(|| RepoError::NotFound(format!("Address {} not found", id)))?;

        if is_default {
            self.promote_default(&existing.user, &record).await?;
        }

        Ok(updated)
    }

    /// Delete an address
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let record = parse_id(id, "address")?;
        let _: Option<Address> = self.base.db().delete(record).await?;
        Ok(true)
    }

    /// Make the given address the user's only default (atomic)
    pub async fn promote_default(&self, user: &RecordId, address: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                UPDATE address SET is_default = false WHERE user = $user AND id != $address;
                UPDATE $address SET is_default = true;
                COMMIT TRANSACTION;"#,
            )
            .bind(("user", user.clone()))
            .bind(("address", address.clone()))
            .await?
            .check()?;
        Ok(())
    }
}
