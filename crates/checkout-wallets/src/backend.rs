//! Client for the two mock gateway endpoints.
//!
//! [`CheckoutBackend`] is what the wallet adapters talk to. [`BackendClient`] is the
//! HTTP implementation: it posts JSON to `./api/rapyd/payment` and
//! `./api/apple-pay/validate-merchant` relative to a base URL.
//!
//! ## Example
//!
//! ```rust
//! use checkout_wallets::BackendClient;
//!
//! let backend = BackendClient::try_from("http://localhost:3000").unwrap();
//! assert_eq!(backend.payment_url().path(), "/api/rapyd/payment");
//! ```
//!
//! ## Error Handling
//!
//! [`BackendClientError`] distinguishes transport failures, non-200 responses,
//! undecodable bodies, and a gateway that answered but did not report `success`.
//! Nothing is retried.

use checkout_types::{
    MerchantSession, MerchantValidationRequest, PaymentMethod, PaymentResult, PaymentToken,
    TokenizedPayment,
};
use http::{HeaderMap, StatusCode};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use url::Url;

/// The two calls the wallet adapters make to the backend.
pub trait CheckoutBackend {
    /// Sends a wallet token to the payment gateway.
    fn process_payment(
        &self,
        payment: &TokenizedPayment,
    ) -> impl Future<Output = Result<PaymentResult, BackendClientError>> + Send;

    /// Asks the backend for an Apple Pay merchant session.
    fn validate_merchant(
        &self,
        request: &MerchantValidationRequest,
    ) -> impl Future<Output = Result<MerchantSession, BackendClientError>> + Send;
}

impl<T: CheckoutBackend> CheckoutBackend for Arc<T> {
    fn process_payment(
        &self,
        payment: &TokenizedPayment,
    ) -> impl Future<Output = Result<PaymentResult, BackendClientError>> + Send {
        self.as_ref().process_payment(payment)
    }

    fn validate_merchant(
        &self,
        request: &MerchantValidationRequest,
    ) -> impl Future<Output = Result<MerchantSession, BackendClientError>> + Send {
        self.as_ref().validate_merchant(request)
    }
}

/// Forwards a token and insists on a `success` status.
///
/// A gateway answer with any other status becomes
/// [`BackendClientError::PaymentRejected`] carrying the gateway's message.
pub async fn submit_payment<B: CheckoutBackend>(
    backend: &B,
    payment_method: PaymentMethod,
    token: PaymentToken,
) -> Result<PaymentResult, BackendClientError> {
    let payment = TokenizedPayment {
        payment_method,
        token,
    };
    let result = backend.process_payment(&payment).await?;
    if result.is_success() {
        Ok(result)
    } else {
        Err(BackendClientError::PaymentRejected {
            message: result
                .message
                .unwrap_or_else(|| "Payment failed".to_string()),
        })
    }
}

/// Errors that can occur while talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendClientError {
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        context: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("HTTP error: {context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        context: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Payment rejected by gateway: {message}")]
    PaymentRejected { message: String },
}

/// HTTP client for the mock gateway.
#[derive(Clone, Debug)]
pub struct BackendClient {
    base_url: Url,
    /// Full URL of `POST /api/rapyd/payment`
    payment_url: Url,
    /// Full URL of `POST /api/apple-pay/validate-merchant`
    validate_merchant_url: Url,
    client: Client,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

impl CheckoutBackend for BackendClient {
    async fn process_payment(
        &self,
        payment: &TokenizedPayment,
    ) -> Result<PaymentResult, BackendClientError> {
        BackendClient::process_payment(self, payment)
            .instrument(tracing::info_span!(
                "checkout.backend.process_payment",
                payment_method = %payment.payment_method
            ))
            .await
    }

    async fn validate_merchant(
        &self,
        request: &MerchantValidationRequest,
    ) -> Result<MerchantSession, BackendClientError> {
        BackendClient::validate_merchant(self, request)
            .instrument(tracing::info_span!("checkout.backend.validate_merchant"))
            .await
    }
}

impl BackendClient {
    pub const PAYMENT_PATH: &'static str = "./api/rapyd/payment";
    pub const VALIDATE_MERCHANT_PATH: &'static str = "./api/apple-pay/validate-merchant";

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn payment_url(&self) -> &Url {
        &self.payment_url
    }

    pub fn validate_merchant_url(&self) -> &Url {
        &self.validate_merchant_url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn timeout(&self) -> &Option<Duration> {
        &self.timeout
    }

    /// Builds a client whose endpoint URLs are resolved against `base_url`.
    pub fn try_new(base_url: Url) -> Result<Self, BackendClientError> {
        let payment_url =
            base_url
                .join(Self::PAYMENT_PATH)
                .map_err(|e| BackendClientError::UrlParse {
                    context: "Failed to construct payment URL",
                    source: e,
                })?;
        let validate_merchant_url = base_url.join(Self::VALIDATE_MERCHANT_PATH).map_err(|e| {
            BackendClientError::UrlParse {
                context: "Failed to construct merchant validation URL",
                source: e,
            }
        })?;
        Ok(Self {
            base_url,
            payment_url,
            validate_merchant_url,
            client: Client::new(),
            headers: HeaderMap::new(),
            timeout: None,
        })
    }

    /// Attaches custom headers (e.g. `Origin`) to all future requests.
    pub fn with_headers(&self, headers: HeaderMap) -> Self {
        let mut this = self.clone();
        this.headers = headers;
        this
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut this = self.clone();
        this.timeout = Some(timeout);
        this
    }

    /// Sends a `POST /api/rapyd/payment` request.
    pub async fn process_payment(
        &self,
        payment: &TokenizedPayment,
    ) -> Result<PaymentResult, BackendClientError> {
        self.post_json(&self.payment_url, "POST /api/rapyd/payment", payment)
            .await
    }

    /// Sends a `POST /api/apple-pay/validate-merchant` request.
    pub async fn validate_merchant(
        &self,
        request: &MerchantValidationRequest,
    ) -> Result<MerchantSession, BackendClientError> {
        self.post_json(
            &self.validate_merchant_url,
            "POST /api/apple-pay/validate-merchant",
            request,
        )
        .await
    }

    /// POSTs `payload` as JSON and decodes a JSON body from a 200 response.
    ///
    /// `context` names the call in errors and logs (e.g. `"POST /api/rapyd/payment"`).
    async fn post_json<T, R>(
        &self,
        url: &Url,
        context: &'static str,
        payload: &T,
    ) -> Result<R, BackendClientError>
    where
        T: serde::Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let mut req = self.client.post(url.clone()).json(payload);
        for (key, value) in self.headers.iter() {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| BackendClientError::Http { context, source: e })?;

        let result = if http_response.status() == StatusCode::OK {
            http_response
                .json::<R>()
                .await
                .map_err(|e| BackendClientError::JsonDeserialization { context, source: e })
        } else {
            let status = http_response.status();
            let body = http_response
                .text()
                .await
                .map_err(|e| BackendClientError::ResponseBodyRead { context, source: e })?;
            Err(BackendClientError::HttpStatus {
                context,
                status,
                body,
            })
        };

        if let Err(err) = &result {
            tracing::error!(error = %err, "Request to backend failed");
        }

        result
    }
}

impl TryFrom<&str> for BackendClient {
    type Error = BackendClientError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Normalize to exactly one trailing slash so relative joins keep the base path
        let mut normalized = value.trim_end_matches('/').to_string();
        normalized.push('/');
        let url = Url::parse(&normalized).map_err(|e| BackendClientError::UrlParse {
            context: "Failed to parse base url",
            source: e,
        })?;
        BackendClient::try_new(url)
    }
}

impl TryFrom<String> for BackendClient {
    type Error = BackendClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BackendClient::try_from(value.as_str())
    }
}
