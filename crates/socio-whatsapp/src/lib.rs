// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API integration for the Socio webhook pipeline.
//!
//! Inbound: the webhook envelope model, `x-hub-signature-256` verification,
//! and the subscription handshake. Outbound: [`CloudTransport`], the
//! [`MessagingTransport`](socio_core::MessagingTransport) implementation.

pub mod envelope;
pub mod handshake;
pub mod signature;
pub mod transport;

pub use envelope::{WebhookEnvelope, WebhookStatus};
pub use handshake::{HandshakeQuery, HandshakeResult, handshake};
pub use signature::{SIGNATURE_HEADER, SignatureCheck, sign, verify_signature};
pub use transport::CloudTransport;
