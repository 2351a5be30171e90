// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence traits: per-sender conversation log and the monthly usage ledger.

use async_trait::async_trait;

use crate::error::SocioError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ConversationId, InvoiceRequestRecord, Role, StoredMessage};

/// Append-only conversation log keyed by normalized sender handle.
///
/// Implementations cap the retained log per conversation, evicting the
/// oldest entries on insert.
#[async_trait]
pub trait ConversationStore: PluginAdapter {
    /// Returns the conversation for `phone`, creating it on first contact.
    async fn get_or_create_conversation(&self, phone: &str)
    -> Result<ConversationId, SocioError>;

    /// Appends one turn to a conversation.
    async fn save_message(
        &self,
        conversation: &ConversationId,
        role: Role,
        content: &str,
        provider_message_id: Option<&str>,
    ) -> Result<(), SocioError>;

    /// The `limit` most recent turns, oldest first.
    async fn recent_messages(
        &self,
        conversation: &ConversationId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, SocioError>;
}

/// Ledger of delivered invoices, counted per phone per calendar month.
#[async_trait]
pub trait UsageLedger: PluginAdapter {
    /// Number of deliveries to `phone` whose timestamp falls in `year_month` (`YYYY-MM`).
    async fn monthly_count(&self, phone: &str, year_month: &str) -> Result<u32, SocioError>;

    /// Appends one delivery.
    async fn record(&self, record: &InvoiceRequestRecord) -> Result<(), SocioError>;
}
