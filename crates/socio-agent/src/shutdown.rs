// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns SIGINT/SIGTERM into a [`CancellationToken`] for the HTTP server.
//!
//! Message tasks already spawned are detached and are not awaited.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Signal that ended the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

/// Resolves on the first SIGINT or SIGTERM (Ctrl+C only on non-unix).
pub async fn wait_for_signal() -> ShutdownSignal {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                return tokio::select! {
                    _ = tokio::signal::ctrl_c() => ShutdownSignal::Interrupt,
                    _ = sigterm.recv() => ShutdownSignal::Terminate,
                };
            }
            Err(e) => warn!(error = %e, "SIGTERM handler unavailable, watching Ctrl+C only"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Ctrl+C handler unavailable");
        std::future::pending::<()>().await;
    }
    ShutdownSignal::Interrupt
}

/// Spawns the signal watcher and returns the token it cancels.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        info!(?signal, "shutdown requested");
        trigger.cancel();
    });

    token
}
