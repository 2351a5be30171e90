// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invoice archive trait.

use async_trait::async_trait;

use crate::error::SocioError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InvoiceDocument, InvoiceQuery};

/// Adapter for the billing-document archive.
#[async_trait]
pub trait InvoiceArchive: PluginAdapter {
    /// Finds the best matching document, or `Ok(None)` when nothing matches.
    async fn find_invoice(&self, query: &InvoiceQuery)
    -> Result<Option<InvoiceDocument>, SocioError>;

    /// Fetches the document's bytes by the id returned from `find_invoice`.
    async fn download(&self, file_id: &str) -> Result<Vec<u8>, SocioError>;
}
