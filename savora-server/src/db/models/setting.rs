//! Settings Model
//!
//! Single-record store (`setting:main`) holding payment gateway credentials,
//! transaction mode and fee configuration consumed by the order and payment
//! services.

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Gateway credential mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    Test,
    Live,
}

/// Per-gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Stable identifier: "paystack" | "flutterwave"
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub enabled: bool,
    pub public_key: Option<String>,
    pub public_test_key: Option<String>,
    pub secret_key: Option<String>,
    pub secret_test_key: Option<String>,
}

impl GatewayConfig {
    /// Secret key for the given transaction mode, if configured
    pub fn secret_for(&self, mode: TransactionMode) -> Option<&str> {
        let key = match mode {
            TransactionMode::Test => self.secret_test_key.as_deref(),
            TransactionMode::Live => self.secret_key.as_deref(),
        };
        key.filter(|k| !k.is_empty())
    }
}

/// Currency and fee configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub currency: String,
    pub tax_rate: Decimal,
    pub delivery_fee: Decimal,
    pub minimum_order_amount: Decimal,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            currency: "NGN".to_string(),
            tax_rate: Decimal::new(75, 1),
            delivery_fee: Decimal::ZERO,
            minimum_order_amount: Decimal::ZERO,
        }
    }
}

/// Company profile shown to clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub website: Option<String>,
    pub address: Option<String>,
}

/// Settings record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub payment_gateways: Vec<GatewayConfig>,
    pub transaction_mode: TransactionMode,
    pub general: GeneralSettings,
    pub company_info: CompanyInfo,
}

impl Settings {
    /// Seed record created on first startup
    pub fn seed() -> Self {
        let gateway = |id: &str, name: &str| GatewayConfig {
            id: id.to_string(),
            name: name.to_string(),
            enabled: false,
            public_key: None,
            public_test_key: None,
            secret_key: None,
            secret_test_key: None,
        };
        Self {
            id: None,
            payment_gateways: vec![
                gateway("paystack", "Paystack"),
                gateway("flutterwave", "Flutterwave"),
            ],
            transaction_mode: TransactionMode::Test,
            general: GeneralSettings::default(),
            company_info: CompanyInfo::default(),
        }
    }

    /// Look up a gateway config by id
    pub fn gateway(&self, id: &str) -> Option<&GatewayConfig> {
        self.payment_gateways.iter().find(|g| g.id == id)
    }

    /// Copy with secret keys stripped, for the public settings endpoint
    pub fn public_view(mut self) -> Self {
        for gateway in &mut self.payment_gateways {
            gateway.secret_key = None;
            gateway.secret_test_key = None;
        }
        self
    }
}

/// Update settings payload (admin)
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsUpdate {
    pub payment_gateways: Option<Vec<GatewayConfig>>,
    pub transaction_mode: Option<TransactionMode>,
    pub general: Option<GeneralSettings>,
    pub company_info: Option<CompanyInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_for_respects_mode_and_emptiness() {
        let mut gw = GatewayConfig {
            id: "paystack".into(),
            name: "Paystack".into(),
            enabled: true,
            public_key: None,
            public_test_key: None,
            secret_key: Some("sk_live_x".into()),
            secret_test_key: Some(String::new()),
        };
        assert_eq!(gw.secret_for(TransactionMode::Live), Some("sk_live_x"));
        // Empty string counts as unconfigured
        assert_eq!(gw.secret_for(TransactionMode::Test), None);
        gw.secret_key = None;
        assert_eq!(gw.secret_for(TransactionMode::Live), None);
    }

    #[test]
    fn public_view_strips_secrets() {
        let mut settings = Settings::seed();
        settings.payment_gateways[0].secret_key = Some("sk_live_x".into());
        settings.payment_gateways[0].public_key = Some("pk_live_x".into());
        let view = settings.public_view();
        assert_eq!(view.payment_gateways[0].secret_key, None);
        assert_eq!(
            view.payment_gateways[0].public_key.as_deref(),
            Some("pk_live_x")
        );
    }
}
