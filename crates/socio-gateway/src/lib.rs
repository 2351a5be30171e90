// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the WhatsApp Cloud API webhook.
//!
//! Serves the subscription handshake and event ingestion on one path, plus
//! `GET /health`. Events are acknowledged before they are processed.

pub mod handlers;
pub mod server;

pub use handlers::process_envelope;
pub use server::{GatewayState, ServerConfig, router, start_server};
