// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared collaborators and reply helpers used by every handler.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use socio_config::model::SocioConfig;
use socio_core::traits::{
    CompletionProvider, ConversationStore, InvoiceArchive, MessagingTransport, UsageLedger,
};
use socio_core::types::{OutboundMedia, Role, SendOutcome};
use socio_core::Clock;
use tracing::{debug, warn};

use crate::copy::Replies;

/// Pause before the single retry of a failed text send.
pub const TEXT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// The external services the pipeline calls into.
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn MessagingTransport>,
    pub store: Arc<dyn ConversationStore>,
    pub ledger: Arc<dyn UsageLedger>,
    pub archive: Arc<dyn InvoiceArchive>,
    /// `None` when no completion credentials are configured.
    pub provider: Option<Arc<dyn CompletionProvider>>,
    pub clock: Arc<dyn Clock>,
}

/// Everything a handler needs to answer one message.
pub struct PipelineContext {
    pub collaborators: Collaborators,
    pub replies: Replies,
    pub system_prompt: String,
    pub account_help_image: Option<String>,
    pub low_confidence_image: Option<String>,
    pub history_limit: usize,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A text message after normalization, as the handlers see it.
#[derive(Debug, Clone)]
pub struct TextMessage {
    /// Sender handle as delivered; replies go here.
    pub from: String,
    pub id: String,
    pub raw: String,
    pub normalized: String,
}

impl PipelineContext {
    pub fn new(collaborators: Collaborators, config: &SocioConfig, system_prompt: String) -> Self {
        let invoice = &config.invoice;
        Self {
            collaborators,
            replies: Replies::new(invoice, &config.chatbot),
            system_prompt,
            account_help_image: invoice.account_help_image.clone(),
            low_confidence_image: invoice
                .low_confidence_image
                .clone()
                .or_else(|| invoice.account_help_image.clone()),
            history_limit: config.chatbot.history_limit,
            max_tokens: config.anthropic.max_tokens,
            temperature: config.anthropic.temperature,
        }
    }

    pub fn transport(&self) -> &dyn MessagingTransport {
        self.collaborators.transport.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.collaborators.clock.as_ref()
    }

    /// Sends text, retrying once after [`TEXT_RETRY_DELAY`] on a network failure.
    pub async fn send_text_with_retry(&self, to: &str, body: &str) -> SendOutcome {
        let outcome = self.transport().send_text(to, body).await;
        let retryable = outcome.error.as_ref().is_some_and(|e| e.is_retryable());
        if outcome.success || !retryable {
            return outcome;
        }
        warn!(to, error = ?outcome.error, "text send failed, retrying once");
        tokio::time::sleep(TEXT_RETRY_DELAY).await;
        self.transport().send_text(to, body).await
    }

    /// Sends `image` with `caption`, or just the caption as text when no image
    /// is configured, the image cannot be read, or the image send fails.
    pub async fn send_image_or_text(
        &self,
        to: &str,
        image: Option<&str>,
        caption: &str,
    ) -> SendOutcome {
        let media = match image {
            Some(source) => load_media(source).await,
            None => None,
        };
        let Some(media) = media else {
            return self.send_text_with_retry(to, caption).await;
        };
        let outcome = self.transport().send_image(to, media, caption).await;
        if outcome.success {
            return outcome;
        }
        warn!(to, error = ?outcome.error, "image send failed, sending caption as text");
        self.send_text_with_retry(to, caption).await
    }

    /// Persists a user turn and the reply to it. Failures are logged, not returned.
    pub async fn record_exchange(
        &self,
        phone: &str,
        user_text: &str,
        inbound_id: Option<&str>,
        reply: &str,
        outbound_id: Option<&str>,
    ) {
        let store = self.collaborators.store.as_ref();
        let conversation = match store.get_or_create_conversation(phone).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "failed to open conversation, exchange not persisted");
                return;
            }
        };
        for (role, content, message_id) in [
            (Role::User, user_text, inbound_id),
            (Role::Assistant, reply, outbound_id),
        ] {
            if let Err(e) = store
                .save_message(&conversation, role, content, message_id)
                .await
            {
                warn!(error = %e, %role, "failed to persist message");
            }
        }
        debug!(conversation = %conversation.0, "exchange persisted");
    }
}

/// Resolves a configured image: `http(s)` URLs are sent as links, anything
/// else is read from disk and uploaded.
pub async fn load_media(source: &str) -> Option<OutboundMedia> {
    if source.starts_with("https://") || source.starts_with("http://") {
        return Some(OutboundMedia::Link(source.to_string()));
    }
    match tokio::fs::read(source).await {
        Ok(data) => Some(OutboundMedia::Bytes {
            data,
            mime_type: image_mime_type(Path::new(source)).to_string(),
        }),
        Err(e) => {
            warn!(path = source, error = %e, "failed to read help image");
            None
        }
    }
}

fn image_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}
