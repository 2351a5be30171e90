// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as bind addresses, history windows, and rate-limit thresholds.

use crate::diagnostic::ConfigError;
use crate::model::SocioConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SocioConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if !config.gateway.webhook_path.starts_with('/') {
        fail(format!(
            "gateway.webhook_path must start with `/`, got `{}`",
            config.gateway.webhook_path
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.storage.retained_messages == 0 {
        fail("storage.retained_messages must be at least 1".to_string());
    }

    if config.chatbot.history_limit == 0 {
        fail("chatbot.history_limit must be at least 1".to_string());
    } else if config.chatbot.history_limit > config.storage.retained_messages {
        fail(format!(
            "chatbot.history_limit ({}) cannot exceed storage.retained_messages ({})",
            config.chatbot.history_limit, config.storage.retained_messages
        ));
    }

    if config.invoice.soft_warning_from == 0 {
        fail("invoice.soft_warning_from must be at least 1".to_string());
    }

    if config.invoice.hard_limit < config.invoice.soft_warning_from {
        fail(format!(
            "invoice.hard_limit ({}) must not be below invoice.soft_warning_from ({})",
            config.invoice.hard_limit, config.invoice.soft_warning_from
        ));
    }

    if !config.invoice.payment_url.starts_with("http://")
        && !config.invoice.payment_url.starts_with("https://")
    {
        fail(format!(
            "invoice.payment_url must be an http(s) URL, got `{}`",
            config.invoice.payment_url
        ));
    }

    if !(0.0..=1.0).contains(&config.anthropic.temperature) {
        fail(format!(
            "anthropic.temperature must be between 0.0 and 1.0, got {}",
            config.anthropic.temperature
        ));
    }

    if config.anthropic.max_tokens == 0 {
        fail("anthropic.max_tokens must be at least 1".to_string());
    }

    if config.whatsapp.text_timeout_secs == 0 || config.whatsapp.document_timeout_secs == 0 {
        fail("whatsapp timeouts must be at least 1 second".to_string());
    }

    if config.archive.timeout_secs == 0 {
        fail("archive.timeout_secs must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Names of settings the `serve` command needs to reply to users but can run without.
///
/// These are reported as warnings rather than validation errors: the handshake
/// fails closed without a verify token, and outbound sends fail without credentials.
pub fn missing_runtime_settings(config: &SocioConfig) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if config.whatsapp.verify_token.is_none() {
        missing.push("whatsapp.verify_token");
    }
    if config.whatsapp.access_token.is_none() {
        missing.push("whatsapp.access_token");
    }
    if config.whatsapp.phone_number_id.is_none() {
        missing.push("whatsapp.phone_number_id");
    }
    if config.whatsapp.app_secret.is_none() {
        missing.push("whatsapp.app_secret");
    }
    if config.anthropic.resolved_api_key().is_none() {
        missing.push("anthropic.api_key");
    }
    missing
}
