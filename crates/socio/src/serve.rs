// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `socio serve` command implementation.
//!
//! Wires the WhatsApp transport, SQLite storage, invoice archive and the
//! optional Anthropic provider into the dispatcher, then runs the gateway
//! until SIGINT or SIGTERM.

use std::sync::Arc;

use socio_agent::shutdown;
use socio_agent::{Collaborators, Dispatcher, PipelineContext, load_system_prompt};
use socio_anthropic::AnthropicProvider;
use socio_archive::FsInvoiceArchive;
use socio_config::SocioConfig;
use socio_core::{
    CompletionProvider, HealthStatus, PluginAdapter, SocioError, SystemClock,
};
use socio_gateway::{GatewayState, ServerConfig};
use socio_storage::SqliteStorage;
use socio_whatsapp::CloudTransport;
use tracing::{info, warn};

/// Runs the webhook service until a shutdown signal arrives.
pub async fn run_serve(config: SocioConfig) -> Result<(), SocioError> {
    init_tracing(&config.agent.log_level);
    info!(name = %config.agent.name, "starting socio serve");

    for key in socio_config::missing_runtime_settings(&config) {
        warn!(setting = key, "runtime setting missing");
    }
    if config.whatsapp.app_secret.is_none() {
        warn!("whatsapp.app_secret not set, webhook signatures will not be verified");
    }

    let clock = Arc::new(SystemClock);

    let storage = Arc::new(SqliteStorage::with_clock(config.storage.clone(), clock.clone()));
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "storage initialized");

    let archive = Arc::new(FsInvoiceArchive::new(&config.archive));
    report_health(archive.as_ref()).await;

    let transport = Arc::new(CloudTransport::new(&config.whatsapp)?);

    let provider: Option<Arc<dyn CompletionProvider>> =
        match AnthropicProvider::new(&config.anthropic) {
            Ok(provider) => {
                info!(model = %config.anthropic.model, "anthropic provider enabled");
                Some(Arc::new(provider))
            }
            Err(e) => {
                warn!(error = %e, "anthropic provider disabled, chatbot replies fall back to the apology");
                None
            }
        };

    let system_prompt = load_system_prompt(&config.chatbot, &config.invoice).await;

    let collaborators = Collaborators {
        transport,
        store: storage.clone(),
        ledger: storage.clone(),
        archive,
        provider,
        clock,
    };
    let ctx = PipelineContext::new(collaborators, &config, system_prompt);
    let dispatcher = Dispatcher::new(ctx);

    let state = GatewayState::new(
        dispatcher,
        config.whatsapp.verify_token.clone(),
        config.whatsapp.app_secret.clone(),
    );
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
        webhook_path: config.gateway.webhook_path.clone(),
    };

    let cancel = shutdown::install_signal_handler();
    let served = socio_gateway::start_server(&server_config, state, cancel).await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }
    served?;

    info!("socio serve shutdown complete");
    Ok(())
}

async fn report_health(adapter: &dyn PluginAdapter) {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => info!(adapter = adapter.name(), "adapter healthy"),
        Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter not healthy")
        }
        Err(e) => warn!(adapter = adapter.name(), error = %e, "adapter health check failed"),
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("socio={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
