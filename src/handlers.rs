//! HTTP endpoints of the mock payment gateway.
//!
//! The gateway never charges anything: it logs what the checkout page sends and
//! answers with the canned payloads the page expects from the real processor.
//! Request bodies are typed, so a malformed body is rejected by the `Json`
//! extractor before a handler runs. A `GET` on either path is answered like any
//! other unmatched `GET`, with the entry page.

use axum::http::{HeaderMap, header};
use axum::routing::post;
use axum::{Json, Router, response::IntoResponse};
use std::path::Path;
use checkout_types::{
    GatewayPaymentStatus, Initiative, MerchantSessionDescriptor, MerchantValidationRequest,
    PaymentData, PaymentId, PaymentResult, TokenizedPayment,
};
use tracing::instrument;

use crate::static_files;

pub const PAYMENT_PATH: &str = "/api/rapyd/payment";
pub const VALIDATE_MERCHANT_PATH: &str = "/api/apple-pay/validate-merchant";

/// Fixed values of the mock responses.
pub mod mock {
    use checkout_types::CurrencyCode;

    /// Charged amount, in whole currency units.
    pub const AMOUNT: u64 = 1;
    pub const CURRENCY: CurrencyCode = CurrencyCode::USD;
    pub const MERCHANT_IDENTIFIER: &str = "test_merchant";
    pub const DISPLAY_NAME: &str = "Example Store";
}

/// Gateway routes. Stateless, so they fit into a router of any state.
///
/// `GET` on the gateway paths falls through to the static files of `public_dir`.
pub fn routes<S>(public_dir: &Path) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let static_files = static_files::service(public_dir);
    Router::new()
        .route(
            PAYMENT_PATH,
            post(post_payment).get_service(static_files.clone()),
        )
        .route(
            VALIDATE_MERCHANT_PATH,
            post(post_validate_merchant).get_service(static_files),
        )
}

/// `POST /api/rapyd/payment`: accepts any tokenized payment and reports success.
///
/// Every call gets a fresh [`PaymentId`], even for identical bodies.
#[instrument(skip_all)]
pub async fn post_payment(Json(body): Json<TokenizedPayment>) -> impl IntoResponse {
    tracing::info!(payment_method = %body.payment_method, "Received payment request");
    tracing::debug!(token = %body.token.0, "Payment token");
    let result = PaymentResult::success(PaymentData {
        payment_id: PaymentId::generate(),
        status: GatewayPaymentStatus::Success,
        amount: mock::AMOUNT,
        currency: mock::CURRENCY,
    });
    Json(result)
}

/// `POST /api/apple-pay/validate-merchant`: returns a merchant session bound to
/// the requesting page's `Origin`.
#[instrument(skip_all)]
pub async fn post_validate_merchant(
    headers: HeaderMap,
    Json(body): Json<MerchantValidationRequest>,
) -> impl IntoResponse {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    tracing::info!(
        validation_url = %body.validation_url,
        origin = ?origin,
        "Received merchant validation request"
    );
    Json(MerchantSessionDescriptor {
        merchant_identifier: mock::MERCHANT_IDENTIFIER.to_string(),
        display_name: mock::DISPLAY_NAME.to_string(),
        initiative: Initiative::Web,
        initiative_context: origin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn public_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public")
    }

    async fn call(request: Request<Body>) -> (StatusCode, Value) {
        let response = routes::<()>(&public_dir()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(path: &str) -> axum::http::request::Builder {
        Request::post(path).header(header::CONTENT_TYPE, "application/json")
    }

    #[tokio::test]
    async fn payment_always_succeeds() {
        let body = json!({"paymentMethod": "apple_pay", "token": "tok_abc"});
        let request = post_json(PAYMENT_PATH)
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["status"], "SUCCESS");
        assert_eq!(body["data"]["amount"], 1);
        assert_eq!(body["data"]["currency"], "USD");
        let payment_id = body["data"]["payment_id"].as_str().unwrap();
        let millis = payment_id.strip_prefix("test_").unwrap();
        assert!(millis.parse::<u64>().is_ok());
    }

    #[tokio::test]
    async fn payment_rejects_unknown_method() {
        let body = json!({"paymentMethod": "paypal", "token": "tok_abc"});
        let request = post_json(PAYMENT_PATH)
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, _) = call(request).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn validate_merchant_echoes_origin() {
        let body = json!({"validationURL": "https://apple-pay-gateway.apple.com/paymentservices/startSession"});
        let request = post_json(VALIDATE_MERCHANT_PATH)
            .header(header::ORIGIN, "https://shop.example")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "merchantIdentifier": "test_merchant",
                "displayName": "Example Store",
                "initiative": "web",
                "initiativeContext": "https://shop.example"
            })
        );
    }

    #[tokio::test]
    async fn validate_merchant_without_origin() {
        let body = json!({"validationURL": "https://apple-pay-gateway.apple.com/"});
        let request = post_json(VALIDATE_MERCHANT_PATH)
            .body(Body::from(body.to_string()))
            .unwrap();
        let (_, body) = call(request).await;
        assert_eq!(body["initiativeContext"], Value::Null);
    }

    #[tokio::test]
    async fn validate_merchant_requires_validation_url() {
        let request = post_json(VALIDATE_MERCHANT_PATH).body(Body::from("{}")).unwrap();
        let (status, _) = call(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn get_on_gateway_paths_serves_entry_page() {
        let index = std::fs::read_to_string(public_dir().join(static_files::ENTRY_PAGE)).unwrap();
        for path in [PAYMENT_PATH, VALIDATE_MERCHANT_PATH] {
            let response = routes::<()>(&public_dir())
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "GET {path}");
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), index);
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn payment_token_stays_out_of_info_logs() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let body = json!({"paymentMethod": "google_pay", "token": "tok_secret_4242"});
        let request = post_json(PAYMENT_PATH)
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, _) = call(request).await;
        assert_eq!(status, StatusCode::OK);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Received payment request"), "{output}");
        assert!(output.contains("google_pay"), "{output}");
        assert!(!output.contains("tok_secret_4242"), "{output}");
    }
}
