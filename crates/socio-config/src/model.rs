// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Socio webhook service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Socio configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SocioConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP listener for the webhook.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// WhatsApp Cloud API credentials and limits.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Anthropic API settings for the chatbot fallback.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Invoice archive location.
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Invoice delivery copy and usage limits.
    #[serde(default)]
    pub invoice: InvoiceConfig,

    /// Chatbot prompt and history settings.
    #[serde(default)]
    pub chatbot: ChatbotConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "socio".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path serving both the handshake (GET) and event delivery (POST).
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook_path: default_webhook_path(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

/// WhatsApp Cloud API configuration.
///
/// Every credential is optional at load time: a missing verify token makes the
/// handshake fail closed, a missing app secret disables signature checks.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Token echoed back during the webhook handshake.
    #[serde(default)]
    pub verify_token: Option<String>,

    /// Bearer token for the Graph API.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Sender phone-number id.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// App secret for `x-hub-signature-256` verification.
    #[serde(default)]
    pub app_secret: Option<String>,

    /// Graph API version segment.
    #[serde(default = "default_graph_api_version")]
    pub api_version: String,

    /// Graph API base URL.
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,

    /// Timeout for text sends.
    #[serde(default = "default_text_timeout_secs")]
    pub text_timeout_secs: u64,

    /// Timeout for document and image sends, including media upload.
    #[serde(default = "default_document_timeout_secs")]
    pub document_timeout_secs: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            verify_token: None,
            access_token: None,
            phone_number_id: None,
            app_secret: None,
            api_version: default_graph_api_version(),
            graph_base_url: default_graph_base_url(),
            text_timeout_secs: default_text_timeout_secs(),
            document_timeout_secs: default_document_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("verify_token", &self.verify_token.as_ref().map(|_| "[redacted]"))
            .field("access_token", &self.access_token.as_ref().map(|_| "[redacted]"))
            .field("phone_number_id", &self.phone_number_id)
            .field("app_secret", &self.app_secret.as_ref().map(|_| "[redacted]"))
            .field("api_version", &self.api_version)
            .field("graph_base_url", &self.graph_base_url)
            .field("text_timeout_secs", &self.text_timeout_secs)
            .field("document_timeout_secs", &self.document_timeout_secs)
            .finish()
    }
}

fn default_graph_api_version() -> String {
    "v18.0".to_string()
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_text_timeout_secs() -> u64 {
    10
}

fn default_document_timeout_secs() -> u64 {
    15
}

/// Anthropic API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` falls back to `ANTHROPIC_API_KEY`; if that is
    /// unset too, the chatbot answers with the static apology.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for chatbot replies.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Messages endpoint.
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,

    /// Request timeout.
    #[serde(default = "default_anthropic_timeout_secs")]
    pub timeout_secs: u64,
}

impl AnthropicConfig {
    /// The configured key, or `ANTHROPIC_API_KEY` when none is configured.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            api_version: default_api_version(),
            base_url: default_anthropic_base_url(),
            timeout_secs: default_anthropic_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("api_version", &self.api_version)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_model() -> String {
    "claude-3-5-haiku-20241022".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.4
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

fn default_anthropic_timeout_secs() -> u64 {
    15
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Turns kept per conversation; older ones are evicted on insert.
    #[serde(default = "default_retained_messages")]
    pub retained_messages: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            retained_messages: default_retained_messages(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("socio").join("socio.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("socio.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_retained_messages() -> usize {
    20
}

/// Invoice archive configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Directory holding the billing PDFs.
    #[serde(default = "default_archive_root")]
    pub root_dir: String,

    /// Upper bound for one lookup or file read, in seconds.
    #[serde(default = "default_archive_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            root_dir: default_archive_root(),
            timeout_secs: default_archive_timeout_secs(),
        }
    }
}

fn default_archive_root() -> String {
    "invoices".to_string()
}

fn default_archive_timeout_secs() -> u64 {
    10
}

/// Invoice delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InvoiceConfig {
    /// Online payment link included in every confirmation.
    #[serde(default = "default_payment_url")]
    pub payment_url: String,

    /// Office phone offered as a fallback in error and limit messages.
    #[serde(default = "default_office_phone")]
    pub office_phone: String,

    /// Monthly total from which the soft reminder is appended.
    #[serde(default = "default_soft_warning_from")]
    pub soft_warning_from: u32,

    /// Monthly total above which the "contact us personally" notice replaces the reminder.
    #[serde(default = "default_hard_limit")]
    pub hard_limit: u32,

    /// Image (file path or https URL) showing where the account number is printed.
    #[serde(default)]
    pub account_help_image: Option<String>,

    /// Image sent when the account number could not be read confidently.
    /// Falls back to `account_help_image` when unset.
    #[serde(default)]
    pub low_confidence_image: Option<String>,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            payment_url: default_payment_url(),
            office_phone: default_office_phone(),
            soft_warning_from: default_soft_warning_from(),
            hard_limit: default_hard_limit(),
            account_help_image: None,
            low_confidence_image: None,
        }
    }
}

fn default_payment_url() -> String {
    "https://pagos.cooperativa.coop".to_string()
}

fn default_office_phone() -> String {
    "0800-555-2667".to_string()
}

fn default_soft_warning_from() -> u32 {
    2
}

fn default_hard_limit() -> u32 {
    10
}

/// Chatbot fallback configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatbotConfig {
    /// Cooperative name used in the system prompt.
    #[serde(default = "default_organization_name")]
    pub organization_name: String,

    /// Office hours quoted by the assistant.
    #[serde(default = "default_office_hours")]
    pub office_hours: String,

    /// Persisted turns sent as context with each completion.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Markdown file replacing the built-in organizational knowledge.
    #[serde(default)]
    pub knowledge_file: Option<String>,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            organization_name: default_organization_name(),
            office_hours: default_office_hours(),
            history_limit: default_history_limit(),
            knowledge_file: None,
        }
    }
}

fn default_organization_name() -> String {
    "Cooperativa de Servicios Públicos".to_string()
}

fn default_office_hours() -> String {
    "lunes a viernes de 7 a 13 hs".to_string()
}

fn default_history_limit() -> usize {
    10
}
