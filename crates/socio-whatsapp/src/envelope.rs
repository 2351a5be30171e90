// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook event envelope: `entry[] -> changes[] -> value.{messages, statuses}`.
//!
//! Every field is defaulted so envelopes for unrelated fields (template
//! updates, account alerts) parse into an empty walk instead of a 400.

use serde::Deserialize;
use socio_core::types::{InboundKind, InboundMessage, MediaDescriptor};

#[derive(Debug, Default, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: Option<WebhookValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookValue {
    #[serde(default)]
    pub messaging_product: String,
    #[serde(default)]
    pub metadata: Option<WebhookMetadata>,
    #[serde(default)]
    pub contacts: Vec<WebhookContact>,
    #[serde(default)]
    pub messages: Vec<WebhookMessage>,
    #[serde(default)]
    pub statuses: Vec<WebhookStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookMetadata {
    #[serde(default)]
    pub display_phone_number: String,
    #[serde(default)]
    pub phone_number_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookContact {
    #[serde(default)]
    pub wa_id: String,
    #[serde(default)]
    pub profile: Option<WebhookProfile>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookProfile {
    #[serde(default)]
    pub name: String,
}

/// One inbound message as delivered by the Cloud API.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookMessage {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub id: String,
    /// Unix seconds, as a string.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub text: Option<TextContent>,
    #[serde(default)]
    pub document: Option<MediaContent>,
    #[serde(default)]
    pub image: Option<MediaContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaContent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

impl From<MediaContent> for MediaDescriptor {
    fn from(media: MediaContent) -> Self {
        MediaDescriptor {
            media_id: media.id,
            mime_type: media.mime_type,
            file_name: media.filename,
            caption: media.caption,
        }
    }
}

/// Delivery/read receipt for a message the service sent.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookStatus {
    #[serde(default)]
    pub id: String,
    /// `sent`, `delivered`, `read` or `failed`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub recipient_id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub errors: Vec<StatusError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub title: String,
}

impl WebhookMessage {
    /// Converts to the pipeline's message type.
    pub fn into_inbound(self) -> InboundMessage {
        let kind = match self.msg_type.as_str() {
            "text" => InboundKind::Text(self.text.map(|t| t.body).unwrap_or_default()),
            "document" => InboundKind::Document(self.document.map(Into::into).unwrap_or_default()),
            "image" => InboundKind::Image(self.image.map(Into::into).unwrap_or_default()),
            "contacts" => InboundKind::Contacts,
            other => InboundKind::Other(other.to_string()),
        };
        InboundMessage {
            from: self.from,
            id: self.id,
            timestamp: self.timestamp,
            kind,
        }
    }
}

impl WebhookEnvelope {
    /// Parses a raw webhook body.
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Splits the envelope into inbound messages and status receipts, in delivery order.
    pub fn into_events(self) -> (Vec<InboundMessage>, Vec<WebhookStatus>) {
        let mut messages = Vec::new();
        let mut statuses = Vec::new();
        for change in self.entry.into_iter().flat_map(|e| e.changes) {
            let Some(value) = change.value else {
                continue;
            };
            messages.extend(value.messages.into_iter().map(WebhookMessage::into_inbound));
            statuses.extend(value.statuses);
        }
        (messages, statuses)
    }
}
