//! Database Schema
//!
//! Idempotent schema definition executed at startup, plus first-run seeding
//! (settings singleton and bootstrap admin account).

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Role, Settings, User};
use crate::utils::AppError;

/// Table + index definitions. `IF NOT EXISTS` keeps re-runs harmless.
///
/// The unique index on `payment.order` enforces the one-payment-per-order
/// invariant at the storage layer: a racing find-or-create cannot produce a
/// duplicate record.
const DEFINITIONS: &str = r#"
    DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS user_email ON TABLE user FIELDS email UNIQUE;

    DEFINE TABLE IF NOT EXISTS address SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS address_user ON TABLE address FIELDS user;

    DEFINE TABLE IF NOT EXISTS category SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS category_name ON TABLE category FIELDS name UNIQUE;

    DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS product_category ON TABLE product FIELDS category;

    DEFINE TABLE IF NOT EXISTS dining_table SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS dining_table_name ON TABLE dining_table FIELDS name UNIQUE;

    DEFINE TABLE IF NOT EXISTS order SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS order_code ON TABLE order FIELDS code UNIQUE;
    DEFINE INDEX IF NOT EXISTS order_user ON TABLE order FIELDS user;

    DEFINE TABLE IF NOT EXISTS order_item SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS order_item_order ON TABLE order_item FIELDS order;

    DEFINE TABLE IF NOT EXISTS payment SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS payment_order ON TABLE payment FIELDS order UNIQUE;
    DEFINE INDEX IF NOT EXISTS payment_payment_id ON TABLE payment FIELDS payment_id UNIQUE;

    DEFINE TABLE IF NOT EXISTS setting SCHEMALESS;
"#;

/// Apply schema definitions and seed required records
pub async fn initialize(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(DEFINITIONS)
        .await
        .and_then(|response| response.check())
        .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?;

    seed_settings(db).await?;
    seed_admin(db).await?;

    Ok(())
}

/// Create the settings singleton (`setting:main`) on first run
async fn seed_settings(db: &Surreal<Db>) -> Result<(), AppError> {
    let existing: Option<Settings> = db
        .select(("setting", "main"))
        .await
        .map_err(|e| AppError::database(format!("Failed to read settings: {e}")))?;

    if existing.is_some() {
        return Ok(());
    }

    let seed = Settings::seed();
    db.query(
        r#"CREATE setting:main SET
            payment_gateways = $payment_gateways,
            transaction_mode = $transaction_mode,
            general = $general,
            company_info = $company_info"#,
    )
    .bind(("payment_gateways", seed.payment_gateways))
    .bind(("transaction_mode", seed.transaction_mode))
    .bind(("general", seed.general))
    .bind(("company_info", seed.company_info))
    .await
    .and_then(|response| response.check())
    .map_err(|e| AppError::database(format!("Failed to seed settings: {e}")))?;

    tracing::info!("Seeded default settings (setting:main)");
    Ok(())
}

/// Create a bootstrap admin account when no admin exists.
///
/// Credentials come from `ADMIN_EMAIL` / `ADMIN_PASSWORD`; development
/// defaults are logged loudly so they never survive into production.
async fn seed_admin(db: &Surreal<Db>) -> Result<(), AppError> {
    let mut result = db
        .query("SELECT count() AS count FROM user WHERE role = 'admin' GROUP ALL")
        .await
        .map_err(|e| AppError::database(format!("Failed to count admins: {e}")))?;

    #[derive(serde::Deserialize)]
    struct CountRow {
        count: i64,
    }

    let rows: Vec<CountRow> = result
        .take(0)
        .map_err(|e| AppError::database(format!("Failed to parse admin count: {e}")))?;

    if rows.first().map(|r| r.count).unwrap_or(0) > 0 {
        return Ok(());
    }

    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@savora.local".to_string());
    let password = match std::env::var("ADMIN_PASSWORD") {
        Ok(p) => p,
        Err(_) => {
            tracing::warn!(
                "ADMIN_PASSWORD not set, bootstrap admin '{}' uses the development default",
                email
            );
            "admin123".to_string()
        }
    };

    let hash_pass = User::hash_password(&password)
        .map_err(|e| AppError::internal(format!("Failed to hash admin password: {e}")))?;

    db.query(
        r#"CREATE user SET
            email = $email,
            hash_pass = $hash_pass,
            first_name = 'Admin',
            last_name = 'User',
            phone = NONE,
            role = $role,
            is_active = true,
            created_at = $created_at"#,
    )
    .bind(("email", email.clone()))
    .bind(("hash_pass", hash_pass))
    .bind(("role", Role::Admin))
    .bind(("created_at", chrono::Utc::now()))
    .await
    .and_then(|response| response.check())
    .map_err(|e| AppError::database(format!("Failed to seed admin: {e}")))?;

    tracing::info!(email = %email, "Seeded bootstrap admin account");
    Ok(())
}
