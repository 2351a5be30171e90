// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A store and ledger whose every call fails.

use async_trait::async_trait;

use socio_core::SocioError;
use socio_core::traits::{ConversationStore, PluginAdapter, UsageLedger};
use socio_core::types::{
    AdapterType, ConversationId, HealthStatus, InvoiceRequestRecord, Role, StoredMessage,
};

/// Used to check that persistence failures never reach the member.
#[derive(Debug, Default)]
pub struct FailingStore;

fn unavailable() -> SocioError {
    SocioError::Storage {
        source: Box::new(std::io::Error::other("database unavailable")),
    }
}

#[async_trait]
impl PluginAdapter for FailingStore {
    fn name(&self) -> &str {
        "failing-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, SocioError> {
        Ok(HealthStatus::Unhealthy("database unavailable".into()))
    }
}

#[async_trait]
impl ConversationStore for FailingStore {
    async fn get_or_create_conversation(
        &self,
        _phone: &str,
    ) -> Result<ConversationId, SocioError> {
        Err(unavailable())
    }

    async fn save_message(
        &self,
        _conversation: &ConversationId,
        _role: Role,
        _content: &str,
        _provider_message_id: Option<&str>,
    ) -> Result<(), SocioError> {
        Err(unavailable())
    }

    async fn recent_messages(
        &self,
        _conversation: &ConversationId,
        _limit: usize,
    ) -> Result<Vec<StoredMessage>, SocioError> {
        Err(unavailable())
    }
}

#[async_trait]
impl UsageLedger for FailingStore {
    async fn monthly_count(&self, _phone: &str, _year_month: &str) -> Result<u32, SocioError> {
        Err(unavailable())
    }

    async fn record(&self, _record: &InvoiceRequestRecord) -> Result<(), SocioError> {
        Err(unavailable())
    }
}
