// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./socio.toml` > `~/.config/socio/socio.toml` > `/etc/socio/socio.toml`
//! with environment variable overrides via `SOCIO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SocioConfig;

/// Sections addressable from `SOCIO_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &[
    "agent",
    "gateway",
    "whatsapp",
    "anthropic",
    "storage",
    "archive",
    "invoice",
    "chatbot",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/socio/socio.toml` (system-wide)
/// 3. `~/.config/socio/socio.toml` (user XDG config)
/// 4. `./socio.toml` (local directory)
/// 5. `SOCIO_*` environment variables
pub fn load_config() -> Result<SocioConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SocioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SocioConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SocioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SocioConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SocioConfig::default()))
        .merge(Toml::file("/etc/socio/socio.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("socio/socio.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("socio.toml"))
        .merge(env_provider())
}

/// Maps a lowercased, prefix-stripped env key onto its dotted config path.
///
/// Only the first underscore after a known section is a separator, so
/// `whatsapp_app_secret` becomes `whatsapp.app_secret`, not `whatsapp.app.secret`.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("SOCIO_").map(|key| map_env_key(key.as_str()).into())
}
