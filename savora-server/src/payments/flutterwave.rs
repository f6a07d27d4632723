//! Flutterwave gateway client
//!
//! Transaction verification and checkout initialization against the
//! Flutterwave v3 HTTP API. Flutterwave reports amounts in major units.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{CheckoutSession, GatewayError, GatewayTransaction};

const BASE_URL: &str = "https://api.flutterwave.com/v3";

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    status: String,
    message: Option<String>,
    data: Option<VerifyData>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    /// Amount paid, in major currency units
    amount: Decimal,
}

#[derive(Debug, Deserialize)]
struct PaymentsResponse {
    status: String,
    message: Option<String>,
    data: Option<PaymentsData>,
}

#[derive(Debug, Deserialize)]
struct PaymentsData {
    link: String,
}

/// Look up a transaction by reference
pub async fn verify_transaction(
    client: &reqwest::Client,
    secret_key: &str,
    reference: &str,
) -> Result<GatewayTransaction, GatewayError> {
    let url = format!("{BASE_URL}/transactions/{reference}/verify");

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
        .map_err(|e| GatewayError::Http(format!("Malformed Flutterwave response: {e}")))?;

    if !status_code.is_success() {
        return Err(GatewayError::Rejected(
            body.message
                .unwrap_or_else(|| "Flutterwave API request failed".to_string()),
        ));
    }

    let data = body
        .data
        .ok_or_else(|| GatewayError::Rejected("Flutterwave response missing data".to_string()))?;

    Ok(GatewayTransaction {
        success: body.status == "success" && data.status == "successful",
        amount: data.amount,
        gateway_status: data.status,
    })
}

/// Create a hosted payment link
pub async fn initialize_transaction(
    client: &reqwest::Client,
    secret_key: &str,
    email: &str,
    amount: Decimal,
    currency: &str,
    reference: &str,
    redirect_url: &str,
) -> Result<CheckoutSession, GatewayError> {
    let payload = serde_json::json!({
        "tx_ref": reference,
        "amount": amount.to_string(),
        "currency": currency,
        "redirect_url": redirect_url,
        "customer": { "email": email },
    });

    let response = client
        .post(format!("{BASE_URL}/payments"))
        .bearer_auth(secret_key)
        .json(&payload)
        .send()
        .await
        .map_err(|e| GatewayError::Http(e.to_string()))?;

    let status_code = response.status();
    let body: PaymentsResponse = response
        .json()
        .await
        .map_err(|e| GatewayError::Http(format!("Malformed Flutterwave response: {e}")))?;

    if !status_code.is_success() || body.status != "success" {
        return Err(GatewayError::Rejected(
            body.message
                .unwrap_or_else(|| "Flutterwave initialization failed".to_string()),
        ));
    }

    Ok(CheckoutSession {
        payment_url: body.data.map(|d| d.link),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_response_parses_major_units() {
        let body =
            r#"{"status":"success","message":null,"data":{"status":"successful","amount":27.0}}"#;
        let parsed: VerifyResponse = serde_json::from_str(body).unwrap();
        let data = parsed.data.unwrap();
        assert_eq!(data.amount, Decimal::new(27, 0));
        assert_eq!(data.status, "successful");
    }
}
