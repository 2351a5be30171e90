// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` assembles a [`Dispatcher`] over mock transport, provider
//! and archive, a temp SQLite database, and a fixed clock. Use
//! `send_text()` to drive one message through the full pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use socio_agent::{Collaborators, Dispatcher, PipelineContext, load_system_prompt};
use socio_config::model::SocioConfig;
use socio_core::types::{InboundKind, InboundMessage, StoredMessage, normalize_phone};
use socio_core::{
    Clock, CompletionProvider, ConversationStore, FixedClock, SocioError, UsageLedger,
};
use socio_storage::SqliteStorage;

use crate::failing_store::FailingStore;
use crate::mock_archive::{MockArchive, StoredInvoice};
use crate::mock_provider::MockProvider;
use crate::mock_transport::MockTransport;

/// Office phone configured in every harness.
pub const OFFICE_PHONE: &str = "03543-421234";
/// Payment link configured in every harness.
pub const PAYMENT_URL: &str = "https://pagos.example.coop";
/// Help image configured in every harness (sent as a link).
pub const HELP_IMAGE_URL: &str = "https://cdn.example.coop/cuenta.png";

enum ProviderMode {
    Responses(Vec<String>),
    Failing,
    Missing,
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    provider: ProviderMode,
    invoices: Vec<StoredInvoice>,
    archive: fn() -> MockArchive,
    failing_store: bool,
    date: (i32, u32, u32),
    config: SocioConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = SocioConfig::default();
        config.invoice.office_phone = OFFICE_PHONE.to_string();
        config.invoice.payment_url = PAYMENT_URL.to_string();
        config.invoice.account_help_image = Some(HELP_IMAGE_URL.to_string());
        Self {
            provider: ProviderMode::Responses(Vec::new()),
            invoices: Vec::new(),
            archive: MockArchive::new,
            failing_store: false,
            date: (2025, 11, 20),
            config,
        }
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.provider = ProviderMode::Responses(responses);
        self
    }

    /// No completion provider, as when no API key is configured.
    pub fn without_provider(mut self) -> Self {
        self.provider = ProviderMode::Missing;
        self
    }

    pub fn with_failing_provider(mut self) -> Self {
        self.provider = ProviderMode::Failing;
        self
    }

    pub fn with_invoice(mut self, invoice: StoredInvoice) -> Self {
        self.invoices.push(invoice);
        self
    }

    pub fn with_failing_archive(mut self) -> Self {
        self.archive = MockArchive::failing;
        self
    }

    /// Archive lookups exceed their deadline.
    pub fn with_timing_out_archive(mut self) -> Self {
        self.archive = MockArchive::timing_out;
        self
    }

    /// Conversation store and ledger fail on every call.
    pub fn with_failing_store(mut self) -> Self {
        self.failing_store = true;
        self
    }

    /// Pins the clock to midday on the given date.
    pub fn on_date(mut self, year: i32, month: u32, day: u32) -> Self {
        self.date = (year, month, day);
        self
    }

    /// Adjusts the configuration before the pipeline is built.
    pub fn with_config(mut self, adjust: impl FnOnce(&mut SocioConfig)) -> Self {
        adjust(&mut self.config);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, SocioError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| SocioError::Storage { source: e.into() })?;
        let mut config = self.config;
        config.storage.database_path =
            temp_dir.path().join("test.db").to_string_lossy().to_string();

        let (year, month, day) = self.date;
        let fixed = FixedClock::on(year, month, day).ok_or_else(|| {
            SocioError::Config(format!("invalid harness date {year}-{month}-{day}"))
        })?;
        let clock: Arc<dyn Clock> = Arc::new(fixed);
        let storage = SqliteStorage::with_clock(config.storage.clone(), clock.clone());
        storage.initialize().await?;
        let storage = Arc::new(storage);

        let transport = Arc::new(MockTransport::new());
        let (mock_provider, wired) = match self.provider {
            ProviderMode::Responses(responses) => (MockProvider::with_responses(responses), true),
            ProviderMode::Failing => (MockProvider::failing(), true),
            ProviderMode::Missing => (MockProvider::new(), false),
        };
        let mock_provider = Arc::new(mock_provider);
        let provider: Option<Arc<dyn CompletionProvider>> = if wired {
            Some(mock_provider.clone() as Arc<dyn CompletionProvider>)
        } else {
            None
        };

        let archive = Arc::new((self.archive)());
        for invoice in self.invoices {
            archive.add_invoice(invoice).await;
        }

        let (store, ledger): (Arc<dyn ConversationStore>, Arc<dyn UsageLedger>) =
            if self.failing_store {
                (
                    Arc::new(FailingStore) as Arc<dyn ConversationStore>,
                    Arc::new(FailingStore) as Arc<dyn UsageLedger>,
                )
            } else {
                (
                    storage.clone() as Arc<dyn ConversationStore>,
                    storage.clone() as Arc<dyn UsageLedger>,
                )
            };

        let collaborators = Collaborators {
            transport: transport.clone(),
            store,
            ledger,
            archive: archive.clone(),
            provider,
            clock: clock.clone(),
        };
        let system_prompt = load_system_prompt(&config.chatbot, &config.invoice).await;
        let ctx = PipelineContext::new(collaborators, &config, system_prompt);

        Ok(TestHarness {
            dispatcher: Dispatcher::new(ctx),
            transport,
            provider: mock_provider,
            archive,
            storage,
            clock,
            config,
            next_id: AtomicUsize::new(1),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock collaborators and temp storage.
pub struct TestHarness {
    pub dispatcher: Dispatcher,
    pub transport: Arc<MockTransport>,
    /// The mock provider (not wired in when built `without_provider`).
    pub provider: Arc<MockProvider>,
    pub archive: Arc<MockArchive>,
    /// SQLite storage (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    pub clock: Arc<dyn Clock>,
    pub config: SocioConfig,
    next_id: AtomicUsize,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Dispatches a text message from `from` and waits for processing to finish.
    pub async fn send_text(&self, from: &str, body: &str) {
        let message = self.message(from, InboundKind::Text(body.to_string()));
        self.dispatcher.dispatch(message).await;
    }

    /// Dispatches an arbitrary message.
    pub async fn send(&self, message: InboundMessage) {
        self.dispatcher.dispatch(message).await;
    }

    /// Builds an inbound message with a fresh id.
    pub fn message(&self, from: &str, kind: InboundKind) -> InboundMessage {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        InboundMessage {
            from: from.to_string(),
            id: format!("wamid.in-{n}"),
            timestamp: "1731600000".to_string(),
            kind,
        }
    }

    /// Persisted conversation for `phone`, oldest first.
    pub async fn history(&self, phone: &str) -> Result<Vec<StoredMessage>, SocioError> {
        let conversation = self
            .storage
            .get_or_create_conversation(&normalize_phone(phone))
            .await?;
        self.storage.recent_messages(&conversation, usize::MAX).await
    }

    /// Deliveries recorded for `phone` in the clock's month.
    pub async fn monthly_count(&self, phone: &str) -> Result<u32, SocioError> {
        self.storage
            .monthly_count(&normalize_phone(phone), &self.clock.year_month())
            .await
    }
}
