// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging transport for deterministic testing.
//!
//! `MockTransport` records every send and can be scripted to fail.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use socio_core::traits::{MessagingTransport, PluginAdapter};
use socio_core::types::{AdapterType, DeliveryError, OutboundMedia, SendOutcome};

/// One captured send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text {
        to: String,
        body: String,
    },
    Document {
        to: String,
        media: OutboundMedia,
        file_name: String,
        caption: String,
    },
    Image {
        to: String,
        media: OutboundMedia,
        caption: String,
    },
}

impl SentMessage {
    /// The text body, or the caption for media.
    pub fn text(&self) -> &str {
        match self {
            SentMessage::Text { body, .. } => body,
            SentMessage::Document { caption, .. } | SentMessage::Image { caption, .. } => caption,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, SentMessage::Text { .. })
    }

    pub fn is_document(&self) -> bool {
        matches!(self, SentMessage::Document { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self, SentMessage::Image { .. })
    }
}

/// A mock transport. Successful sends get ids `wamid.mock-1`, `wamid.mock-2`, ...
///
/// Failed attempts are recorded in [`attempts`](MockTransport::attempts) but
/// not in [`sent_messages`](MockTransport::sent_messages).
pub struct MockTransport {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    attempts: Arc<Mutex<usize>>,
    text_failures: Arc<Mutex<VecDeque<DeliveryError>>>,
    document_failure: Arc<Mutex<Option<DeliveryError>>>,
    image_failure: Arc<Mutex<Option<DeliveryError>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            attempts: Arc::new(Mutex::new(0)),
            text_failures: Arc::new(Mutex::new(VecDeque::new())),
            document_failure: Arc::new(Mutex::new(None)),
            image_failure: Arc::new(Mutex::new(None)),
        }
    }

    /// The next text send fails with `error`. Queues up.
    pub async fn fail_next_text(&self, error: DeliveryError) {
        self.text_failures.lock().await.push_back(error);
    }

    /// Every document send fails with `error`.
    pub async fn fail_documents(&self, error: DeliveryError) {
        *self.document_failure.lock().await = Some(error);
    }

    /// Every image send fails with `error`.
    pub async fn fail_images(&self, error: DeliveryError) {
        *self.image_failure.lock().await = Some(error);
    }

    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Every send call, successful or not.
    pub async fn attempts(&self) -> usize {
        *self.attempts.lock().await
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    async fn finish(&self, message: SentMessage, failure: Option<DeliveryError>) -> SendOutcome {
        *self.attempts.lock().await += 1;
        if let Some(error) = failure {
            return SendOutcome::failed(error);
        }
        let mut sent = self.sent.lock().await;
        sent.push(message);
        SendOutcome::delivered(Some(format!("wamid.mock-{}", sent.len())))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }
}

#[async_trait]
impl MessagingTransport for MockTransport {
    async fn send_text(&self, to: &str, body: &str) -> SendOutcome {
        let failure = self.text_failures.lock().await.pop_front();
        let message = SentMessage::Text {
            to: to.to_string(),
            body: body.to_string(),
        };
        self.finish(message, failure).await
    }

    async fn send_document(
        &self,
        to: &str,
        media: OutboundMedia,
        file_name: &str,
        caption: &str,
    ) -> SendOutcome {
        let failure = self.document_failure.lock().await.clone();
        let message = SentMessage::Document {
            to: to.to_string(),
            media,
            file_name: file_name.to_string(),
            caption: caption.to_string(),
        };
        self.finish(message, failure).await
    }

    async fn send_image(&self, to: &str, media: OutboundMedia, caption: &str) -> SendOutcome {
        let failure = self.image_failure.lock().await.clone();
        let message = SentMessage::Image {
            to: to.to_string(),
            media,
            caption: caption.to_string(),
        };
        self.finish(message, failure).await
    }
}
