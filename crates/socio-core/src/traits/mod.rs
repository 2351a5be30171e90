// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the pipeline's collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod archive;
pub mod provider;
pub mod storage;
pub mod transport;

pub use adapter::PluginAdapter;
pub use archive::InvoiceArchive;
pub use provider::CompletionProvider;
pub use storage::{ConversationStore, UsageLedger};
pub use transport::MessagingTransport;
