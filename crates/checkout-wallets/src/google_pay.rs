//! Google Pay: readiness check, button, tokenization.
//!
//! [`GooglePayAdapter::initialize`] asks the vendor client whether the shopper can pay
//! with the fixed card configuration. Only then is the button rendered. A click loads
//! payment data from the vendor sheet, pulls the gateway token out of it and forwards
//! it to the backend as a `google_pay` payment.
//!
//! Readiness failures are logged and otherwise swallowed: the button simply never
//! shows. Failures after a click end on the status element.

use checkout_types::{CurrencyCode, MoneyAmount, PaymentIntent, PaymentMethod};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::VendorError;
use crate::backend::{BackendClientError, CheckoutBackend, submit_payment};
use crate::in_flight::InFlight;
use crate::status::{ButtonState, ClickOutcome, StatusView};

/// Vendor environment the `PaymentsClient` is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    Test,
    Production,
}

/// The demo only ever talks to the test environment.
pub const ENVIRONMENT: Environment = Environment::Test;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVersion {
    pub api_version: u8,
    pub api_version_minor: u8,
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self {
            api_version: 2,
            api_version_minor: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMethod {
    #[serde(rename = "PAN_ONLY")]
    PanOnly,
    #[serde(rename = "CRYPTOGRAM_3DS")]
    Cryptogram3ds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardNetwork {
    Mastercard,
    Visa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethodType {
    Card,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenizationType {
    PaymentGateway,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardParameters {
    pub allowed_auth_methods: Vec<AuthMethod>,
    pub allowed_card_networks: Vec<CardNetwork>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayParameters {
    pub gateway: String,
    pub gateway_merchant_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizationSpecification {
    #[serde(rename = "type")]
    pub kind: TokenizationType,
    pub parameters: GatewayParameters,
}

/// A payment method the merchant accepts, together with where its token goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPaymentMethod {
    #[serde(rename = "type")]
    pub kind: PaymentMethodType,
    pub parameters: CardParameters,
    pub tokenization_specification: TokenizationSpecification,
}

impl CardPaymentMethod {
    pub const GATEWAY: &'static str = "rapyd";
    pub const GATEWAY_MERCHANT_ID: &'static str = "example_merchant_id";

    /// Mastercard and Visa, PAN or 3DS cryptogram, tokenized for the Rapyd gateway.
    pub fn rapyd() -> Self {
        Self {
            kind: PaymentMethodType::Card,
            parameters: CardParameters {
                allowed_auth_methods: vec![AuthMethod::PanOnly, AuthMethod::Cryptogram3ds],
                allowed_card_networks: vec![CardNetwork::Mastercard, CardNetwork::Visa],
            },
            tokenization_specification: TokenizationSpecification {
                kind: TokenizationType::PaymentGateway,
                parameters: GatewayParameters {
                    gateway: Self::GATEWAY.to_string(),
                    gateway_merchant_id: Self::GATEWAY_MERCHANT_ID.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsReadyToPayRequest {
    #[serde(flatten)]
    pub version: ApiVersion,
    pub allowed_payment_methods: Vec<CardPaymentMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsReadyToPayResponse {
    pub result: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TotalPriceStatus {
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    pub total_price_status: TotalPriceStatus,
    pub total_price: MoneyAmount,
    pub currency_code: CurrencyCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantInfo {
    pub merchant_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDataRequest {
    #[serde(flatten)]
    pub version: ApiVersion,
    pub allowed_payment_methods: Vec<CardPaymentMethod>,
    pub transaction_info: TransactionInfo,
    pub email_required: bool,
    pub merchant_info: MerchantInfo,
}

impl PaymentDataRequest {
    pub fn new(payment_method: CardPaymentMethod, intent: &PaymentIntent) -> Self {
        Self {
            version: ApiVersion::default(),
            allowed_payment_methods: vec![payment_method],
            transaction_info: TransactionInfo {
                total_price_status: TotalPriceStatus::Final,
                total_price: intent.amount,
                currency_code: intent.currency,
            },
            email_required: true,
            merchant_info: MerchantInfo {
                merchant_name: intent.merchant_name.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizationData {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodData {
    pub tokenization_data: TokenizationData,
}

/// What the Google Pay sheet resolves with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentData {
    pub payment_method_data: PaymentMethodData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The `google.payments.api.PaymentsClient` injected by the vendor script.
pub trait GooglePayClient {
    fn is_ready_to_pay(
        &self,
        request: &IsReadyToPayRequest,
    ) -> impl Future<Output = Result<IsReadyToPayResponse, VendorError>> + Send;

    fn load_payment_data(
        &self,
        request: &PaymentDataRequest,
    ) -> impl Future<Output = Result<PaymentData, VendorError>> + Send;
}

impl<T: GooglePayClient + Send + Sync> GooglePayClient for Arc<T> {
    fn is_ready_to_pay(
        &self,
        request: &IsReadyToPayRequest,
    ) -> impl Future<Output = Result<IsReadyToPayResponse, VendorError>> + Send {
        self.as_ref().is_ready_to_pay(request)
    }

    fn load_payment_data(
        &self,
        request: &PaymentDataRequest,
    ) -> impl Future<Output = Result<PaymentData, VendorError>> + Send {
        self.as_ref().load_payment_data(request)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GooglePayError {
    #[error("Google Pay payment data request failed: {0}")]
    PaymentData(#[source] VendorError),
    #[error(transparent)]
    Backend(#[from] BackendClientError),
}

/// Google Pay button and its click handler.
pub struct GooglePayAdapter<C, B> {
    client: C,
    backend: B,
    intent: Arc<PaymentIntent>,
    payment_method: CardPaymentMethod,
    button: ButtonState,
    in_flight: InFlight,
}

impl<C, B> GooglePayAdapter<C, B>
where
    C: GooglePayClient,
    B: CheckoutBackend,
{
    pub fn new(client: C, backend: B, intent: Arc<PaymentIntent>) -> Self {
        Self {
            client,
            backend,
            intent,
            payment_method: CardPaymentMethod::rapyd(),
            button: ButtonState::Hidden,
            in_flight: InFlight::new(),
        }
    }

    pub fn button(&self) -> ButtonState {
        self.button
    }

    pub fn is_ready_to_pay_request(&self) -> IsReadyToPayRequest {
        IsReadyToPayRequest {
            version: ApiVersion::default(),
            allowed_payment_methods: vec![self.payment_method.clone()],
        }
    }

    pub fn payment_data_request(&self) -> PaymentDataRequest {
        PaymentDataRequest::new(self.payment_method.clone(), &self.intent)
    }

    /// Runs the readiness check and renders the button if the shopper can pay.
    pub async fn initialize(&mut self) -> ButtonState {
        let request = self.is_ready_to_pay_request();
        self.button = match self.client.is_ready_to_pay(&request).await {
            Ok(response) => {
                tracing::info!(ready = response.result, "Google Pay readiness");
                if response.result {
                    ButtonState::Rendered
                } else {
                    ButtonState::Hidden
                }
            }
            Err(error) => {
                tracing::error!(error = %error, "Google Pay initialization error");
                ButtonState::Hidden
            }
        };
        self.button
    }

    /// Button click: load payment data, forward the token, report the outcome.
    ///
    /// Ignored while the button is hidden or a previous click is still being processed.
    pub async fn handle_click(&self) -> ClickOutcome {
        if !self.button.is_rendered() {
            return ClickOutcome::Ignored;
        }
        let Some(_guard) = self.in_flight.try_acquire() else {
            tracing::debug!("Google Pay attempt already in flight, click ignored");
            return ClickOutcome::Ignored;
        };
        match self.pay().await {
            Ok(()) => ClickOutcome::Finished(StatusView::payment_successful()),
            Err(error) => {
                tracing::error!(error = %error, "Google Pay payment error");
                ClickOutcome::Finished(StatusView::payment_failed())
            }
        }
    }

    async fn pay(&self) -> Result<(), GooglePayError> {
        let request = self.payment_data_request();
        let payment_data = self
            .client
            .load_payment_data(&request)
            .await
            .map_err(GooglePayError::PaymentData)?;
        let token = payment_data.payment_method_data.tokenization_data.token;
        let result = submit_payment(&self.backend, PaymentMethod::GooglePay, token.into()).await?;
        tracing::info!(
            payment_id = ?result.data.as_ref().map(|d| d.payment_id.to_string()),
            "Google Pay payment processed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn is_ready_to_pay_request_wire_format() {
        let request = IsReadyToPayRequest {
            version: ApiVersion::default(),
            allowed_payment_methods: vec![CardPaymentMethod::rapyd()],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "apiVersion": 2,
                "apiVersionMinor": 0,
                "allowedPaymentMethods": [{
                    "type": "CARD",
                    "parameters": {
                        "allowedAuthMethods": ["PAN_ONLY", "CRYPTOGRAM_3DS"],
                        "allowedCardNetworks": ["MASTERCARD", "VISA"]
                    },
                    "tokenizationSpecification": {
                        "type": "PAYMENT_GATEWAY",
                        "parameters": {
                            "gateway": "rapyd",
                            "gatewayMerchantId": "example_merchant_id"
                        }
                    }
                }]
            })
        );
    }

    #[test]
    fn payment_data_request_carries_intent() {
        let intent = PaymentIntent::default();
        let request = PaymentDataRequest::new(CardPaymentMethod::rapyd(), &intent);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["transactionInfo"],
            json!({"totalPriceStatus": "FINAL", "totalPrice": "1.00", "currencyCode": "USD"})
        );
        assert_eq!(json["emailRequired"], json!(true));
        assert_eq!(json["merchantInfo"], json!({"merchantName": "Example Store"}));
    }

    #[test]
    fn payment_data_token_is_extracted() {
        let data: PaymentData = serde_json::from_value(json!({
            "apiVersion": 2,
            "apiVersionMinor": 0,
            "email": "shopper@example.com",
            "paymentMethodData": {
                "type": "CARD",
                "description": "Visa 1111",
                "tokenizationData": {"type": "PAYMENT_GATEWAY", "token": "examplePaymentMethodToken"}
            }
        }))
        .unwrap();
        assert_eq!(
            data.payment_method_data.tokenization_data.token,
            "examplePaymentMethodToken"
        );
    }

    #[test]
    fn environment_is_upper_case() {
        assert_eq!(
            serde_json::to_value(Environment::Test).unwrap(),
            json!("TEST")
        );
    }
}
