// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory invoice archive.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use socio_core::SocioError;
use socio_core::traits::{InvoiceArchive, PluginAdapter};
use socio_core::types::{
    AdapterType, BillingMonth, InvoiceDocument, InvoiceQuery, ServiceType,
};

/// One stored invoice.
#[derive(Debug, Clone)]
pub struct StoredInvoice {
    pub account_number: String,
    pub month: BillingMonth,
    pub year: i32,
    pub service: ServiceType,
    pub bytes: Vec<u8>,
}

impl StoredInvoice {
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}.pdf",
            self.service, self.account_number, self.month, self.year
        )
    }

    fn matches(&self, query: &InvoiceQuery) -> bool {
        self.account_number == query.account_number
            && query.month.is_none_or(|m| m == self.month)
            && query.year.is_none_or(|y| y == self.year)
            && query.service.is_none_or(|s| s == self.service)
    }
}

/// How lookups go wrong, when they do.
#[derive(Debug, Clone, Copy)]
enum Outage {
    Unavailable,
    TimedOut,
}

/// An archive holding invoices in memory. Lookups can be made to fail.
pub struct MockArchive {
    invoices: Arc<Mutex<Vec<StoredInvoice>>>,
    queries: Arc<Mutex<Vec<InvoiceQuery>>>,
    outage: Option<Outage>,
}

impl MockArchive {
    pub fn new() -> Self {
        Self {
            invoices: Arc::new(Mutex::new(Vec::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
            outage: None,
        }
    }

    /// An archive whose lookups always fail.
    pub fn failing() -> Self {
        Self {
            outage: Some(Outage::Unavailable),
            ..Self::new()
        }
    }

    /// An archive whose lookups always run past their deadline.
    pub fn timing_out() -> Self {
        Self {
            outage: Some(Outage::TimedOut),
            ..Self::new()
        }
    }

    pub async fn add_invoice(&self, invoice: StoredInvoice) {
        self.invoices.lock().await.push(invoice);
    }

    /// Every query received, in order.
    pub async fn queries(&self) -> Vec<InvoiceQuery> {
        self.queries.lock().await.clone()
    }
}

impl Default for MockArchive {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockArchive {
    fn name(&self) -> &str {
        "mock-archive"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Archive
    }
}

#[async_trait]
impl InvoiceArchive for MockArchive {
    async fn find_invoice(
        &self,
        query: &InvoiceQuery,
    ) -> Result<Option<InvoiceDocument>, SocioError> {
        self.queries.lock().await.push(query.clone());
        match self.outage {
            Some(Outage::Unavailable) => {
                return Err(SocioError::Archive {
                    message: "mock archive unavailable".into(),
                    source: None,
                });
            }
            Some(Outage::TimedOut) => {
                return Err(SocioError::Timeout {
                    duration: Duration::from_secs(10),
                });
            }
            None => {}
        }
        let invoices = self.invoices.lock().await;
        Ok(invoices
            .iter()
            .filter(|i| i.matches(query))
            .max_by_key(|i| (i.year, i.month))
            .map(|i| InvoiceDocument {
                file_id: i.file_name(),
                file_name: i.file_name(),
                service: Some(i.service),
            }))
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, SocioError> {
        let invoices = self.invoices.lock().await;
        invoices
            .iter()
            .find(|i| i.file_name() == file_id)
            .map(|i| i.bytes.clone())
            .ok_or_else(|| SocioError::Archive {
                message: format!("no such file: {file_id}"),
                source: None,
            })
    }
}
