// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem invoice archive for the Socio pipeline.
//!
//! Implements [`InvoiceArchive`](socio_core::InvoiceArchive) by matching
//! account, period and service tokens in PDF file names.

pub mod archive;
pub mod naming;

pub use archive::FsInvoiceArchive;
pub use naming::NameTokens;
