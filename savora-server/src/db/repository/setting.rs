//! Settings Repository
//!
//! Single-record store: `setting:main`.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Settings, SettingsUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct SettingRepository {
    base: BaseRepository,
}

impl SettingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Load the settings record (seeded at startup)
    pub async fn get(&self) -> RepoResult<Settings> {
        let settings: Option<Settings> = self.base.db().select(("setting", "main")).await?;
        settings.ok_or_else(|| RepoError::NotFound("Settings not found".to_string()))
    }

    /// Merge an update into the settings record
    pub async fn update(&self, data: SettingsUpdate) -> RepoResult<Settings> {
        let existing = self.get().await?;

        let payment_gateways = data.payment_gateways.unwrap_or(existing.payment_gateways);
        let transaction_mode = data.transaction_mode.unwrap_or(existing.transaction_mode);
        let general = data.general.unwrap_or(existing.general);
        let company_info = data.company_info.unwrap_or(existing.company_info);

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE setting:main SET
                    payment_gateways = $payment_gateways,
                    transaction_mode = $transaction_mode,
                    general = $general,
                    company_info = $company_info
                RETURN AFTER"#,
            )
            .bind(("payment_gateways", payment_gateways))
            .bind(("transaction_mode", transaction_mode))
            .bind(("general", general))
            .bind(("company_info", company_info))
            .await?;

        let updated: Option<Settings> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update settings".to_string()))
    }

    /// Flip a gateway's enabled flag; returns the updated settings
    pub async fn toggle_gateway(&self, gateway_id: &str) -> RepoResult<Settings> {
        let mut settings = self.get().await?;
        let gateway = settings
            .payment_gateways
            .iter_mut()
            .find(|g| g.id == gateway_id)
            .ok_or_else(|| RepoError::NotFound(format!("Gateway '{}' not found", gateway_id)))?;
        gateway.enabled = !gateway.enabled;

        let payment_gateways = settings.payment_gateways.clone();
        let mut result = self
            .base
            .db()
            .query("UPDATE setting:main SET payment_gateways = $payment_gateways RETURN AFTER")
            .bind(("payment_gateways", payment_gateways))
            .await?;

        let updated: Option<Settings> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update settings".to_string()))
    }
}
