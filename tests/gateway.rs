use reqwest::StatusCode;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::path::PathBuf;
use wallet_checkout::live_reload::{LiveReload, SCRIPT};
use wallet_checkout::run::app;

fn public_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public")
}

async fn spawn_server(live_reload: Option<LiveReload>) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(&public_dir(), live_reload.as_ref());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn post_payment(base: &str, body: &Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}/api/rapyd/payment"))
        .json(body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap_or(Value::Null))
}

#[tokio::test]
async fn payment_returns_canned_success() {
    let base = spawn_server(None).await;
    let (status, body) = post_payment(
        &base,
        &json!({"paymentMethod": "apple_pay", "token": "tok_abc"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["status"], "SUCCESS");
    assert_eq!(body["data"]["amount"], 1);
    assert_eq!(body["data"]["currency"], "USD");
    assert!(
        body["data"]["payment_id"]
            .as_str()
            .unwrap()
            .starts_with("test_")
    );
}

#[tokio::test]
async fn identical_payments_get_distinct_ids() {
    let base = spawn_server(None).await;
    let request = json!({"paymentMethod": "google_pay", "token": "{\"id\":\"tok_1\"}"});
    let (_, first) = post_payment(&base, &request).await;
    let (_, second) = post_payment(&base, &request).await;
    assert_eq!(first["status"], "success");
    assert_eq!(second["status"], "success");
    assert_ne!(first["data"]["payment_id"], second["data"]["payment_id"]);
}

#[tokio::test]
async fn malformed_payment_is_rejected() {
    let base = spawn_server(None).await;
    let (status, _) = post_payment(&base, &json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = reqwest::Client::new()
        .post(format!("{base}/api/rapyd/payment"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn merchant_validation_echoes_origin() {
    let base = spawn_server(None).await;
    let client = reqwest::Client::new();
    let url = format!("{base}/api/apple-pay/validate-merchant");
    let request = json!({"validationURL": "https://apple-pay-gateway.apple.com/paymentservices/startSession"});

    let with_origin: Value = client
        .post(&url)
        .header(reqwest::header::ORIGIN, "https://shop.example")
        .json(&request)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        with_origin,
        json!({
            "merchantIdentifier": "test_merchant",
            "displayName": "Example Store",
            "initiative": "web",
            "initiativeContext": "https://shop.example"
        })
    );

    let without_origin: Value = client
        .post(&url)
        .json(&request)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(without_origin["initiativeContext"], Value::Null);
}

#[tokio::test]
async fn unknown_path_serves_entry_page() {
    let base = spawn_server(None).await;
    let response = reqwest::get(format!("{base}/orders/42/receipt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    let index = std::fs::read_to_string(public_dir().join("index.html")).unwrap();
    assert_eq!(body, index);
}

#[tokio::test]
async fn static_assets_are_served_verbatim() {
    let base = spawn_server(None).await;
    let response = reqwest::get(format!("{base}/css/styles.css")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    let css = std::fs::read_to_string(public_dir().join("css/styles.css")).unwrap();
    assert_eq!(body, css);
}

#[tokio::test]
async fn entry_page_carries_wallet_elements() {
    let base = spawn_server(None).await;
    let body = reqwest::get(format!("{base}/")).await.unwrap().text().await.unwrap();
    for id in ["google-pay-button", "apple-pay-button"] {
        assert!(
            body.contains(&format!(r#"id="{id}" class="wallet-button hidden""#)),
            "{id} should start hidden"
        );
    }
    assert!(body.contains(r#"id="payment-status" class="payment-status""#));
    assert!(body.contains(r#"href="/css/styles.css""#));
}

#[tokio::test]
async fn get_on_api_paths_serves_entry_page() {
    let base = spawn_server(None).await;
    let index = std::fs::read_to_string(public_dir().join("index.html")).unwrap();
    for path in [
        "/api/rapyd/payment",
        "/api/apple-pay/validate-merchant",
        "/api/other",
    ] {
        let response = reqwest::get(format!("{base}{path}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        assert_eq!(response.text().await.unwrap(), index);
    }

    let response = reqwest::Client::new()
        .put(format!("{base}/api/rapyd/payment"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn live_reload_script_only_when_enabled() {
    let plain = spawn_server(None).await;
    let body = reqwest::get(format!("{plain}/")).await.unwrap().text().await.unwrap();
    assert!(!body.contains(SCRIPT));
    let response = reqwest::get(format!("{plain}{}", LiveReload::PATH)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reloading = spawn_server(Some(LiveReload::new())).await;
    let body = reqwest::get(format!("{reloading}/")).await.unwrap().text().await.unwrap();
    let script_at = body.find(SCRIPT).unwrap();
    assert!(script_at < body.rfind("</body>").unwrap());

    let css = reqwest::get(format!("{reloading}/css/styles.css"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!css.contains(SCRIPT));

    let response = reqwest::get(format!("{reloading}{}", LiveReload::PATH)).await.unwrap();
    assert!(response.status().is_client_error());
}
