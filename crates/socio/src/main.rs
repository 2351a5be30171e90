// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Socio - WhatsApp customer service for a utility cooperative.
//!
//! This is the binary entry point for the webhook service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use socio_config::{ConfigError, SocioConfig};

/// Socio - WhatsApp customer service for a utility cooperative.
#[derive(Parser, Debug)]
#[command(name = "socio", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server (default).
    Serve,
    /// Validate configuration and report missing credentials.
    CheckConfig,
}

fn load(path: Option<&Path>) -> Result<SocioConfig, Vec<ConfigError>> {
    match path {
        Some(path) => socio_config::load_and_validate_path(path),
        None => socio_config::load_and_validate(),
    }
}

/// Prints the outcome of a configuration check. Returns false on errors.
fn check_config(path: Option<&Path>) -> bool {
    let config = match load(path) {
        Ok(config) => config,
        Err(errors) => {
            socio_config::render_errors(&errors);
            return false;
        }
    };

    println!(
        "socio: config ok (agent.name={}, listening on {}:{}{})",
        config.agent.name, config.gateway.host, config.gateway.port, config.gateway.webhook_path
    );
    let missing = socio_config::missing_runtime_settings(&config);
    if missing.is_empty() {
        println!("socio: all runtime credentials present");
    } else {
        for key in missing {
            println!("socio: warning: {key} is not set");
        }
    }
    true
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::CheckConfig) => {
            if !check_config(cli.config.as_deref()) {
                std::process::exit(1);
            }
        }
        Some(Commands::Serve) | None => {
            let config = match load(cli.config.as_deref()) {
                Ok(config) => config,
                Err(errors) => {
                    socio_config::render_errors(&errors);
                    std::process::exit(1);
                }
            };
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("socio: {e}");
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc can advance the epoch; the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::parse_from(["socio"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn check_config_accepts_explicit_path() {
        let cli = Cli::parse_from(["socio", "check-config", "--config", "/tmp/socio.toml"]);
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/socio.toml")));
    }

    #[test]
    fn check_config_reports_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[gateway]\nport = 9090\n").unwrap();
        assert!(check_config(Some(&good)));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[gateway]\nprot = 9090\n").unwrap();
        assert!(!check_config(Some(&bad)));
    }
}
