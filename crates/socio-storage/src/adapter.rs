// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the conversation store and usage ledger.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use socio_config::model::StorageConfig;
use socio_core::types::{
    ConversationId, InvoiceRequestRecord, Role, StoredMessage, normalize_phone,
};
use socio_core::{
    AdapterType, Clock, ConversationStore, HealthStatus, PluginAdapter, SocioError, SystemClock,
    UsageLedger,
};

use crate::database::Database;
use crate::queries;
use crate::queries::messages::NewMessage;

/// SQLite-backed storage adapter.
///
/// One database holds both conversations and the invoice ledger. The
/// connection is opened by [`SqliteStorage::initialize`]; every other call
/// fails until then. Phone handles are normalized to digits before they
/// reach SQL, so formatting differences never split a sender's history.
pub struct SqliteStorage {
    config: StorageConfig,
    clock: Arc<dyn Clock>,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a storage adapter stamping rows with the local clock.
    pub fn new(config: StorageConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a storage adapter stamping rows with `clock`.
    pub fn with_clock(config: StorageConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            db: OnceCell::new(),
        }
    }

    /// Opens the database and applies migrations. Fails if called twice.
    pub async fn initialize(&self) -> Result<(), SocioError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| SocioError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// Checkpoints the WAL.
    pub async fn close(&self) -> Result<(), SocioError> {
        self.db()?.close().await
    }

    fn db(&self) -> Result<&Database, SocioError> {
        self.db.get().ok_or_else(|| SocioError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, SocioError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SocioError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteStorage {
    async fn get_or_create_conversation(
        &self,
        phone: &str,
    ) -> Result<ConversationId, SocioError> {
        let phone = normalize_phone(phone);
        let id = queries::conversations::get_or_create(
            self.db()?,
            &phone,
            uuid::Uuid::new_v4().to_string(),
            self.clock.timestamp(),
        )
        .await?;
        Ok(ConversationId(id))
    }

    async fn save_message(
        &self,
        conversation: &ConversationId,
        role: Role,
        content: &str,
        provider_message_id: Option<&str>,
    ) -> Result<(), SocioError> {
        let msg = NewMessage {
            conversation_id: conversation.0.clone(),
            role,
            content: content.to_string(),
            provider_message_id: provider_message_id.map(str::to_string),
            created_at: self.clock.timestamp(),
        };
        queries::messages::insert_message(self.db()?, msg, self.config.retained_messages).await
    }

    async fn recent_messages(
        &self,
        conversation: &ConversationId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, SocioError> {
        queries::messages::recent_messages(self.db()?, &conversation.0, limit).await
    }
}

#[async_trait]
impl UsageLedger for SqliteStorage {
    async fn monthly_count(&self, phone: &str, year_month: &str) -> Result<u32, SocioError> {
        queries::invoice_requests::monthly_count(self.db()?, &normalize_phone(phone), year_month)
            .await
    }

    async fn record(&self, record: &InvoiceRequestRecord) -> Result<(), SocioError> {
        let mut record = record.clone();
        record.phone = normalize_phone(&record.phone);
        queries::invoice_requests::insert(self.db()?, &record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socio_core::{BillingMonth, FixedClock};
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
            retained_messages: 20,
        }
    }

    fn storage_in(dir: &tempfile::TempDir, name: &str) -> SqliteStorage {
        let db_path = dir.path().join(name);
        let clock = Arc::new(FixedClock::on(2025, 3, 10).unwrap());
        SqliteStorage::with_clock(make_config(db_path.to_str().unwrap()), clock)
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir, "test.db");

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir, "double_init.db");

        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_check_tracks_initialization() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir, "health.db");

        assert!(storage.health_check().await.is_err());
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn formatted_phones_share_a_conversation() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir, "phones.db");
        storage.initialize().await.unwrap();

        let a = storage
            .get_or_create_conversation("+54 9 3543 000001")
            .await
            .unwrap();
        let b = storage
            .get_or_create_conversation("5493543000001")
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn conversation_round_trip_through_adapter() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir, "conv.db");
        storage.initialize().await.unwrap();

        let conv = storage.get_or_create_conversation("549111").await.unwrap();
        storage
            .save_message(&conv, Role::User, "hola", Some("wamid.1"))
            .await
            .unwrap();
        storage
            .save_message(&conv, Role::Assistant, "¡Hola!", None)
            .await
            .unwrap();

        let messages = storage.recent_messages(&conv, 10).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].provider_message_id.as_deref(), Some("wamid.1"));
        assert_eq!(messages[0].created_at, "2025-03-10T12:00:00");
        assert_eq!(messages[1].role, Role::Assistant);

        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn ledger_counts_by_normalized_phone() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir, "ledger.db");
        storage.initialize().await.unwrap();

        let record = InvoiceRequestRecord {
            phone: "+54 9 11 1234-5678".to_string(),
            account_number: "2862".to_string(),
            file_name: "2862.pdf".to_string(),
            month: Some(BillingMonth::Marzo),
            year: Some(2025),
            requested_at: "2025-03-10T12:00:00".to_string(),
        };
        storage.record(&record).await.unwrap();
        storage.record(&record).await.unwrap();

        assert_eq!(
            storage.monthly_count("5491112345678", "2025-03").await.unwrap(),
            2
        );
        assert_eq!(
            storage.monthly_count("+54 9 11 1234-5678", "2025-02").await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn shutdown_without_initialize_is_ok() {
        let dir = tempdir().unwrap();
        let storage = storage_in(&dir, "noinit.db");
        storage.shutdown().await.unwrap();
    }
}
