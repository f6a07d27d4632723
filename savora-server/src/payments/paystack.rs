//! Paystack gateway client
//!
//! Transaction verification and checkout initialization against the
//! Paystack HTTP API. Paystack reports amounts in minor units (kobo).

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{CheckoutSession, GatewayError, GatewayTransaction};

const BASE_URL: &str = "https://api.paystack.co";

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    status: bool,
    message: Option<String>,
    data: Option<VerifyData>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    /// Amount paid, in kobo
    amount: Decimal,
}

#[derive(Debug, Deserialize)]
struct InitializeResponse {
    status: bool,
    message: Option<String>,
    data: Option<InitializeData>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
}

/// Look up a transaction by reference.
///
/// The returned amount is converted from kobo to major currency units so the
/// caller compares in one consistent unit.
pub async fn verify_transaction(
    client: &reqwest::Client,
    secret_key: &str,
    reference: &str,
) -> Result<GatewayTransaction, GatewayError> {
    let url = format!(
        "{BASE_URL}/transaction/verify/{}",
        urlencoding(reference)
    );

    let response = client
        .get(&url)
        .bearer_auth(secret_key)
        .send()
        .await
        .map_err(|e| GatewayError::Http(e.to_string()))?;

    let status_code = response.status();
    let body: VerifyResponse = response
        .json()
        .await
        .map_err(|e| GatewayError::Http(format!("Malformed Paystack response: {e}")))?;

    if !status_code.is_success() {
        return Err(GatewayError::Rejected(
            body.message
                .unwrap_or_else(|| "Paystack API request failed".to_string()),
        ));
    }

    let data = body
        .data
        .ok_or_else(|| GatewayError::Rejected("Paystack response missing data".to_string()))?;

    Ok(GatewayTransaction {
        success: body.status && data.status == "success",
        // kobo → major units
        amount: data.amount / Decimal::from(100),
        gateway_status: data.status,
    })
}

/// Initialize a checkout session; returns the hosted payment page URL.
pub async fn initialize_transaction(
    client: &reqwest::Client,
    secret_key: &str,
    email: &str,
    amount: Decimal,
    reference: &str,
) -> Result<CheckoutSession, GatewayError> {
    // Paystack expects integer kobo
    let minor_units = (amount * Decimal::from(100)).round();
    let payload = serde_json::json!({
        "email": email,
        "amount": minor_units.to_string(),
        "reference": reference,
    });

    let response = client
        .post(format!("{BASE_URL}/transaction/initialize"))
        .bearer_auth(secret_key)
        .json(&payload)
        .send()
        .await
        .map_err(|e| GatewayError::Http(e.to_string()))?;

    let status_code = response.status();
    let body: InitializeResponse = response
        .json()
        .await
        .map_err(|e| GatewayError::Http(format!("Malformed Paystack response: {e}")))?;

    if !status_code.is_success() || !body.status {
        return Err(GatewayError::Rejected(
            body.message
                .unwrap_or_else(|| "Paystack initialization failed".to_string()),
        ));
    }

    Ok(CheckoutSession {
        payment_url: body.data.map(|d| d.authorization_url),
    })
}

/// Percent-encode a transaction reference for the URL path
fn urlencoding(reference: &str) -> String {
    reference
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            other => format!("%{:02X}", other),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_is_percent_encoded() {
        assert_eq!(urlencoding("ref-123_OK"), "ref-123_OK");
        assert_eq!(urlencoding("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn verify_response_parses_kobo_amount() {
        let body = r#"{"status":true,"message":"ok","data":{"status":"success","amount":270000}}"#;
        let parsed: VerifyResponse = serde_json::from_str(body).unwrap();
        let data = parsed.data.unwrap();
        assert_eq!(data.amount, Decimal::from(270000));
        assert_eq!(data.status, "success");
    }
}
