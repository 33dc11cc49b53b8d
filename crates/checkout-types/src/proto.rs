//! Request and response bodies of the mock gateway endpoints.
//!
//! | Endpoint | Request | Response |
//! |---|---|---|
//! | `POST /api/rapyd/payment` | [`TokenizedPayment`] | [`PaymentResult`] |
//! | `POST /api/apple-pay/validate-merchant` | [`MerchantValidationRequest`] | [`MerchantSessionDescriptor`] |

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::intent::CurrencyCode;
use crate::payment_id::PaymentId;

/// Which wallet produced a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Readiness-check wallet (Google Pay).
    GooglePay,
    /// Session-callback wallet (Apple Pay).
    ApplePay,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::GooglePay => f.write_str("google_pay"),
            PaymentMethod::ApplePay => f.write_str("apple_pay"),
        }
    }
}

/// Opaque token issued by a wallet SDK.
///
/// Google Pay hands out a JSON string, Apple Pay an object; the gateway treats
/// both as opaque, so the token is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentToken(pub serde_json::Value);

impl From<String> for PaymentToken {
    fn from(value: String) -> Self {
        PaymentToken(serde_json::Value::String(value))
    }
}

impl From<&str> for PaymentToken {
    fn from(value: &str) -> Self {
        PaymentToken::from(value.to_string())
    }
}

impl From<serde_json::Value> for PaymentToken {
    fn from(value: serde_json::Value) -> Self {
        PaymentToken(value)
    }
}

/// Body of `POST /api/rapyd/payment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizedPayment {
    pub payment_method: PaymentMethod,
    pub token: PaymentToken,
}

/// Overall outcome reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Failure,
}

/// Status of the individual payment inside [`PaymentData`], upper-cased as the gateway sends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayPaymentStatus {
    Success,
    Failed,
}

/// Gateway-side view of the created payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentData {
    pub payment_id: PaymentId,
    pub status: GatewayPaymentStatus,
    pub amount: u64,
    pub currency: CurrencyCode,
}

/// Response of `POST /api/rapyd/payment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PaymentData>,
}

impl PaymentResult {
    pub fn success(data: PaymentData) -> Self {
        Self {
            status: PaymentStatus::Success,
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: PaymentStatus::Failure,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PaymentStatus::Success
    }
}

/// Body of `POST /api/apple-pay/validate-merchant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantValidationRequest {
    #[serde(rename = "validationURL")]
    pub validation_url: String,
}

/// How the merchant session was initiated, as Apple Pay on the web expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Initiative {
    Web,
}

/// Merchant session the mock gateway hands back after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantSessionDescriptor {
    pub merchant_identifier: String,
    pub display_name: String,
    pub initiative: Initiative,
    /// Origin of the page that started the session; `null` when the request had no `Origin` header.
    pub initiative_context: Option<String>,
}

/// Vendor-defined merchant session, passed through to the wallet SDK untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantSession(pub serde_json::Value);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tokenized_payment_wire_format() {
        let payment = TokenizedPayment {
            payment_method: PaymentMethod::ApplePay,
            token: "tok_abc".into(),
        };
        assert_eq!(
            serde_json::to_value(&payment).unwrap(),
            json!({"paymentMethod": "apple_pay", "token": "tok_abc"})
        );
    }

    #[test]
    fn object_tokens_are_opaque() {
        let body = json!({
            "paymentMethod": "apple_pay",
            "token": {"paymentData": {"version": "EC_v1"}, "transactionIdentifier": "abc"}
        });
        let payment: TokenizedPayment = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(serde_json::to_value(&payment).unwrap(), body);
    }

    #[test]
    fn success_result_wire_format() {
        let result = PaymentResult::success(PaymentData {
            payment_id: PaymentId::from_millis(42),
            status: GatewayPaymentStatus::Success,
            amount: 1,
            currency: CurrencyCode::USD,
        });
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "status": "success",
                "data": {"payment_id": "test_42", "status": "SUCCESS", "amount": 1, "currency": "USD"}
            })
        );
    }

    #[test]
    fn failure_result_carries_message() {
        let result: PaymentResult =
            serde_json::from_value(json!({"status": "failure", "message": "declined"})).unwrap();
        assert!(!result.is_success());
        assert_eq!(result.message.as_deref(), Some("declined"));
    }

    #[test]
    fn merchant_validation_uses_upper_case_url_key() {
        let request: MerchantValidationRequest =
            serde_json::from_value(json!({"validationURL": "https://apple-pay-gateway.apple.com/x"}))
                .unwrap();
        assert_eq!(request.validation_url, "https://apple-pay-gateway.apple.com/x");
    }
}
