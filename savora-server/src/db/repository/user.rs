//! User Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Role, User};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let record = parse_id(id, "user")?;
        let user: Option<User> = self.base.db().select(record).await?;
        Ok(user)
    }

    /// Register a new user (customer role unless specified)
    pub async fn create(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        phone: Option<String>,
        role: Role,
    ) -> RepoResult<User> {
        // Check duplicate email
        if self.find_by_email(email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let hash_pass = User::hash_password(password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    email = $email,
                    hash_pass = $hash_pass,
                    first_name = $first_name,
                    last_name = $last_name,
                    phone = $phone,
                    role = $role,
                    is_active = true,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("email", email.to_string()))
            .bind(("hash_pass", hash_pass))
            .bind(("first_name", first_name.to_string()))
            .bind(("last_name", last_name.to_string()))
            .bind(("phone", phone))
            .bind(("role", role))
            .bind(("created_at", chrono::Utc::now()))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }
}
