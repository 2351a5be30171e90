// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across adapter traits and pipeline stages.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Identifier of a persisted conversation (one per normalized sender handle).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

/// Provider-assigned message identifier (inbound or outbound).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Provider,
    Storage,
    Archive,
}

/// Author of a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Reduces a sender handle to its digits so `+54 9 3543...` and `5493543...`
/// share one conversation and one ledger bucket.
pub fn normalize_phone(handle: &str) -> String {
    handle.chars().filter(|c| c.is_ascii_digit()).collect()
}

// --- Inbound ---

/// Media attached to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaDescriptor {
    pub media_id: String,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
    pub caption: Option<String>,
}

/// Payload of an inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    Text(String),
    Document(MediaDescriptor),
    Image(MediaDescriptor),
    Contacts,
    /// Any other provider type, carrying the raw type name.
    Other(String),
}

impl InboundKind {
    /// Short label used when a non-text message is written to the conversation log.
    pub fn log_label(&self) -> String {
        match self {
            InboundKind::Text(body) => body.clone(),
            InboundKind::Document(media) => match &media.file_name {
                Some(name) => format!("[document: {name}]"),
                None => "[document]".to_string(),
            },
            InboundKind::Image(_) => "[image]".to_string(),
            InboundKind::Contacts => "[contacts]".to_string(),
            InboundKind::Other(kind) => format!("[{kind}]"),
        }
    }
}

/// One chat message as delivered by the messaging provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender handle exactly as delivered (used as the reply target).
    pub from: String,
    /// Provider message id.
    pub id: String,
    /// Provider timestamp (unix seconds, as a string).
    pub timestamp: String,
    pub kind: InboundKind,
}

impl InboundMessage {
    /// Returns the text body for text messages.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            InboundKind::Text(body) => Some(body),
            _ => None,
        }
    }
}

// --- Outbound ---

/// Media to deliver through the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMedia {
    /// Raw bytes, uploaded to the provider before sending.
    Bytes { data: Vec<u8>, mime_type: String },
    /// Publicly reachable URL the provider fetches itself.
    Link(String),
}

/// Why a send did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Connection-level failure before a response was received.
    #[error("network failure: {0}")]
    Network(String),
    /// The request exceeded its time budget.
    #[error("request timed out")]
    Timeout,
    /// The provider answered with a non-success status.
    #[error("provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
    /// Credentials are missing, so nothing was sent.
    #[error("transport not configured: {0}")]
    NotConfigured(String),
}

impl DeliveryError {
    /// Only connection failures are worth a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeliveryError::Network(_))
    }
}

/// Result of a transport send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<DeliveryError>,
}

impl SendOutcome {
    pub fn delivered(message_id: Option<String>) -> Self {
        Self {
            success: true,
            message_id,
            error: None,
        }
    }

    pub fn failed(error: DeliveryError) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error),
        }
    }
}

// --- Invoices ---

/// Calendar month as written by cooperative members.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BillingMonth {
    Enero,
    Febrero,
    Marzo,
    Abril,
    Mayo,
    Junio,
    Julio,
    Agosto,
    #[strum(to_string = "septiembre", serialize = "setiembre")]
    Septiembre,
    Octubre,
    Noviembre,
    Diciembre,
}

impl BillingMonth {
    const ALL: [BillingMonth; 12] = [
        BillingMonth::Enero,
        BillingMonth::Febrero,
        BillingMonth::Marzo,
        BillingMonth::Abril,
        BillingMonth::Mayo,
        BillingMonth::Junio,
        BillingMonth::Julio,
        BillingMonth::Agosto,
        BillingMonth::Septiembre,
        BillingMonth::Octubre,
        BillingMonth::Noviembre,
        BillingMonth::Diciembre,
    ];

    /// Month number, 1 = enero.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(n: u32) -> Option<Self> {
        Self::ALL.get(n.checked_sub(1)? as usize).copied()
    }
}

/// Billing line an invoice belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Water, funeral, internet and sewer services billed together.
    Servicios,
    Electricidad,
}

/// Archive lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceQuery {
    pub account_number: String,
    pub month: Option<BillingMonth>,
    pub year: Option<i32>,
    pub service: Option<ServiceType>,
}

/// A billing document located in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDocument {
    /// Opaque id understood by the archive's `download`.
    pub file_id: String,
    pub file_name: String,
    pub service: Option<ServiceType>,
}

/// Ledger entry written after a document was delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRequestRecord {
    pub phone: String,
    pub account_number: String,
    pub file_name: String,
    pub month: Option<BillingMonth>,
    pub year: Option<i32>,
    /// Local wall time, `%Y-%m-%dT%H:%M:%S`.
    pub requested_at: String,
}

// --- Conversations ---

/// A persisted conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i64,
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    pub provider_message_id: Option<String>,
    pub created_at: String,
}

/// One turn of context handed to the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// A completion request: system prompt plus ordered turns, last one from the user.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<ChatTurn>,
    pub max_tokens: u32,
    pub temperature: f32,
}
