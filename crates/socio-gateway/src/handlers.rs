// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook and health handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use socio_agent::Dispatcher;
use socio_whatsapp::{
    HandshakeQuery, HandshakeResult, SIGNATURE_HEADER, SignatureCheck, WebhookEnvelope,
    WebhookStatus, handshake, verify_signature,
};
use tracing::{debug, error, info, warn};

use crate::server::GatewayState;

/// Body of every successful webhook POST.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub status: &'static str,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// GET {webhook_path}
///
/// Subscription handshake: echoes `hub.challenge` when the token matches.
pub async fn verify_webhook(
    State(state): State<GatewayState>,
    Query(query): Query<HandshakeQuery>,
) -> Response {
    match handshake(&query, state.verify_token.as_deref()) {
        HandshakeResult::Accepted(challenge) => {
            info!("webhook subscription verified");
            (StatusCode::OK, challenge).into_response()
        }
        HandshakeResult::Forbidden => {
            warn!(mode = ?query.mode, "webhook handshake rejected");
            error_response(StatusCode::FORBIDDEN, "verification failed")
        }
        HandshakeResult::NotConfigured => {
            error!("webhook handshake attempted but no verify token is configured");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "verify token not configured")
        }
    }
}

/// POST {webhook_path}
///
/// Verifies the signature, parses the envelope, acknowledges immediately,
/// and processes the events in a detached task.
pub async fn receive_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    match verify_signature(state.app_secret.as_deref(), &body, signature) {
        SignatureCheck::Verified => {}
        SignatureCheck::Skipped => debug!("no app secret configured, signature not checked"),
        SignatureCheck::Rejected(reason) => {
            warn!(reason, "webhook signature rejected");
            return error_response(StatusCode::FORBIDDEN, "invalid signature");
        }
    }

    let envelope = match WebhookEnvelope::parse(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "malformed webhook payload");
            return error_response(StatusCode::BAD_REQUEST, "malformed payload");
        }
    };

    tokio::spawn(process_envelope(state.dispatcher.clone(), envelope));

    (StatusCode::OK, Json(AckResponse { status: "ok" })).into_response()
}

/// Dispatches every message in delivery order and logs status receipts.
pub async fn process_envelope(dispatcher: Dispatcher, envelope: WebhookEnvelope) {
    let (messages, statuses) = envelope.into_events();
    for status in &statuses {
        log_status(status);
    }
    for message in messages {
        debug!(id = %message.id, from = %message.from, "dispatching inbound message");
        dispatcher.dispatch(message).await;
    }
}

fn log_status(status: &WebhookStatus) {
    if status.status == "failed" {
        for err in &status.errors {
            warn!(
                id = %status.id,
                recipient = %status.recipient_id,
                code = err.code,
                title = %err.title,
                "outbound message failed"
            );
        }
        if status.errors.is_empty() {
            warn!(id = %status.id, recipient = %status.recipient_id, "outbound message failed");
        }
    } else {
        debug!(
            id = %status.id,
            recipient = %status.recipient_id,
            status = %status.status,
            "delivery status"
        );
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_serializes() {
        let json = serde_json::to_string(&AckResponse { status: "ok" }).unwrap();
        assert_eq!(json, r#"{"status":"ok"}"#);
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }
}
