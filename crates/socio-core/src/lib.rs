// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Socio webhook pipeline.
//!
//! This crate provides the error type, the shared domain types, and the
//! collaborator traits (conversation store, usage ledger, invoice archive,
//! completion provider, messaging transport) that the pipeline calls into.

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::SocioError;
pub use types::{
    AdapterType, BillingMonth, ConversationId, HealthStatus, InboundKind, InboundMessage,
    MessageId, OutboundMedia, Role, SendOutcome, ServiceType,
};

pub use traits::{
    CompletionProvider, ConversationStore, InvoiceArchive, MessagingTransport, PluginAdapter,
    UsageLedger,
};
