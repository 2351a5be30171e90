// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Socio integration tests.
//!
//! Provides mock collaborators and a test harness for fast, deterministic,
//! CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockTransport`] - Records sends; scripted delivery failures
//! - [`MockProvider`] - Completion provider with pre-configured responses
//! - [`MockArchive`] - In-memory invoice archive
//! - [`FailingStore`] - Store and ledger that fail every call
//! - [`TestHarness`] - Full dispatcher over the mocks and a temp SQLite database

pub mod failing_store;
pub mod harness;
pub mod mock_archive;
pub mod mock_provider;
pub mod mock_transport;

pub use failing_store::FailingStore;
pub use harness::{HELP_IMAGE_URL, OFFICE_PHONE, PAYMENT_URL, TestHarness, TestHarnessBuilder};
pub use mock_archive::{MockArchive, StoredInvoice};
pub use mock_provider::MockProvider;
pub use mock_transport::{MockTransport, SentMessage};
