// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests for the webhook endpoints.

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use socio_core::types::{BillingMonth, ServiceType};
use socio_gateway::{GatewayState, router};
use socio_test_utils::{StoredInvoice, TestHarness};
use tower::ServiceExt;

const SECRET: &str = "app-secret";
const TOKEN: &str = "verify-me";

fn app(harness: &TestHarness, token: Option<&str>, secret: Option<&str>) -> Router {
    let state = GatewayState::new(
        harness.dispatcher.clone(),
        token.map(str::to_string),
        secret.map(str::to_string),
    );
    router("/webhook", state)
}

fn text_payload(from: &str, id: &str, body: &str) -> String {
    serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "WABA",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "messages": [{
                        "from": from,
                        "id": id,
                        "timestamp": "1731600000",
                        "type": "text",
                        "text": {"body": body}
                    }]
                }
            }]
        }]
    })
    .to_string()
}

fn signed_post(body: String, secret: &str) -> Request<Body> {
    let signature = socio_whatsapp::sign(secret, body.as_bytes());
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header(socio_whatsapp::SIGNATURE_HEADER, signature)
        .body(Body::from(body))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Waits for the detached processing task to produce `expected` sends.
async fn wait_for_sends(harness: &TestHarness, expected: usize) -> usize {
    for _ in 0..100 {
        let count = harness.transport.sent_count().await;
        if count >= expected {
            return count;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    harness.transport.sent_count().await
}

#[tokio::test]
async fn handshake_echoes_challenge() {
    let harness = TestHarness::builder().build().await.unwrap();
    let response = app(&harness, Some(TOKEN), None)
        .oneshot(
            Request::get("/webhook?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=1158201444")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "1158201444");
}

#[tokio::test]
async fn handshake_with_wrong_token_is_forbidden() {
    let harness = TestHarness::builder().build().await.unwrap();
    let response = app(&harness, Some(TOKEN), None)
        .oneshot(
            Request::get("/webhook?hub.mode=subscribe&hub.verify_token=nope&hub.challenge=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn handshake_without_configured_token_is_server_error() {
    let harness = TestHarness::builder().build().await.unwrap();
    let response = app(&harness, None, None)
        .oneshot(
            Request::get("/webhook?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn bad_signature_is_rejected_without_processing() {
    let harness = TestHarness::builder().build().await.unwrap();
    let body = text_payload("5493543111111", "wamid.1", "hola");
    let response = app(&harness, Some(TOKEN), Some(SECRET))
        .oneshot(signed_post(body, "other-secret"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.transport.sent_count().await, 0);
}

#[tokio::test]
async fn missing_signature_is_rejected_when_secret_configured() {
    let harness = TestHarness::builder().build().await.unwrap();
    let request = Request::post("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(text_payload("5493543111111", "wamid.1", "hola")))
        .unwrap();
    let response = app(&harness, Some(TOKEN), Some(SECRET))
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_payload_is_bad_request() {
    let harness = TestHarness::builder().build().await.unwrap();
    let response = app(&harness, Some(TOKEN), Some(SECRET))
        .oneshot(signed_post("{not json".to_string(), SECRET))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn valid_message_is_acknowledged_then_answered() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["Hola, ¿en qué te ayudo?".into()])
        .build()
        .await
        .unwrap();
    let body = text_payload("5493543111111", "wamid.1", "hola");
    let response = app(&harness, Some(TOKEN), Some(SECRET))
        .oneshot(signed_post(body, SECRET))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, r#"{"status":"ok"}"#);

    assert_eq!(wait_for_sends(&harness, 1).await, 1);
    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent[0].text(), "Hola, ¿en qué te ayudo?");
}

#[tokio::test]
async fn unsigned_message_is_processed_when_no_secret_configured() {
    let harness = TestHarness::builder()
        .with_invoice(StoredInvoice {
            account_number: "2862".into(),
            month: BillingMonth::Noviembre,
            year: 2025,
            service: ServiceType::Electricidad,
            bytes: b"%PDF-1.4".to_vec(),
        })
        .build()
        .await
        .unwrap();
    let request = Request::post("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(text_payload(
            "5493543111111",
            "wamid.1",
            "factura de luz cuenta 2862 noviembre",
        )))
        .unwrap();
    let response = app(&harness, Some(TOKEN), None)
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(wait_for_sends(&harness, 2).await, 2);
    let sent = harness.transport.sent_messages().await;
    assert!(sent[0].is_document());
    assert!(sent[1].is_text());
}

#[tokio::test]
async fn status_callbacks_are_acknowledged_without_replies() {
    let harness = TestHarness::builder().build().await.unwrap();
    let body = serde_json::json!({
        "entry": [{"changes": [{"value": {"statuses": [
            {"id": "wamid.OUT", "status": "failed", "recipient_id": "549",
             "errors": [{"code": 131047, "title": "Re-engagement message"}]},
            {"id": "wamid.OUT2", "status": "read", "recipient_id": "549"}
        ]}}]}]
    })
    .to_string();
    let response = app(&harness, Some(TOKEN), Some(SECRET))
        .oneshot(signed_post(body, SECRET))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.transport.sent_count().await, 0);
    assert_eq!(harness.provider.call_count().await, 0);
}

#[tokio::test]
async fn health_reports_ok() {
    let harness = TestHarness::builder().build().await.unwrap();
    let response = app(&harness, None, None)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["uptime_secs"].is_u64());
}
