// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the webhook.

use std::sync::Arc;
use std::time::Instant;

use axum::{Router, routing::get};
use socio_agent::Dispatcher;
use socio_core::SocioError;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Processes each inbound message in a detached task.
    pub dispatcher: Dispatcher,
    /// Token expected in the subscription handshake.
    pub verify_token: Option<Arc<str>>,
    /// HMAC key for `x-hub-signature-256`; `None` skips verification.
    pub app_secret: Option<Arc<str>>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(
        dispatcher: Dispatcher,
        verify_token: Option<String>,
        app_secret: Option<String>,
    ) -> Self {
        Self {
            dispatcher,
            verify_token: verify_token.filter(|t| !t.is_empty()).map(Arc::from),
            app_secret: app_secret.filter(|s| !s.is_empty()).map(Arc::from),
            start_time: Instant::now(),
        }
    }
}

/// Gateway server configuration (mirrors `GatewayConfig` from socio-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path serving both the handshake (GET) and events (POST).
    pub webhook_path: String,
}

/// Builds the application router:
/// - GET  {webhook_path} subscription handshake
/// - POST {webhook_path} event ingestion
/// - GET  /health
pub fn router(webhook_path: &str, state: GatewayState) -> Router {
    Router::new()
        .route(
            webhook_path,
            get(handlers::verify_webhook).post(handlers::receive_webhook),
        )
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds to the configured host:port and serves until `shutdown` is cancelled.
///
/// Detached message tasks already spawned are not awaited.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), SocioError> {
    let app = router(&config.webhook_path, state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SocioError::Config(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!(webhook_path = %config.webhook_path, "gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| SocioError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
