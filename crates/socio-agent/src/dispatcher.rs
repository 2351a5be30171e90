// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes each inbound message to the first handler that claims it.

use std::sync::Arc;

use socio_core::types::{InboundKind, InboundMessage, normalize_phone};
use socio_intent::normalize;
use tracing::{debug, error, info, warn};

use crate::context::{PipelineContext, TextMessage};
use crate::handlers::{HandlerOutcome, MessageHandler, default_handlers};
use crate::locks::SenderLocks;

/// Ordered handler chain over a shared [`PipelineContext`].
///
/// Cheap to clone; clones share the context and the per-sender locks.
#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<PipelineContext>,
    handlers: Arc<Vec<Box<dyn MessageHandler>>>,
    locks: SenderLocks,
}

impl Dispatcher {
    /// Dispatcher with the production handler chain.
    pub fn new(ctx: PipelineContext) -> Self {
        Self::with_handlers(ctx, default_handlers())
    }

    pub fn with_handlers(ctx: PipelineContext, handlers: Vec<Box<dyn MessageHandler>>) -> Self {
        Self {
            ctx: Arc::new(ctx),
            handlers: Arc::new(handlers),
            locks: SenderLocks::new(),
        }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    /// Processes one message to completion. Never fails: every error ends in
    /// a log line and, where possible, a reply to the sender.
    pub async fn dispatch(&self, message: InboundMessage) {
        let phone = normalize_phone(&message.from);
        let _guard = self.locks.acquire(&phone).await;

        let body = match &message.kind {
            InboundKind::Text(body) if !body.trim().is_empty() => body.clone(),
            _ => {
                self.reply_text_only(&message, &phone).await;
                return;
            }
        };

        let text = TextMessage {
            normalized: normalize(&body),
            raw: body,
            from: message.from,
            id: message.id,
        };

        for handler in self.handlers.iter() {
            if !handler.claims(&text) {
                continue;
            }
            debug!(handler = handler.name(), "handler claimed message");
            match handler.handle(&self.ctx, &text).await {
                Ok(HandlerOutcome::Handled) => {
                    info!(handler = handler.name(), from = %text.from, "message handled");
                    return;
                }
                Ok(HandlerOutcome::Declined) => continue,
                Err(e) => {
                    error!(handler = handler.name(), error = %e, "handler failed");
                    let reply = self.ctx.replies.delivery_error();
                    let outcome = self.ctx.send_text_with_retry(&text.from, &reply).await;
                    self.ctx
                        .record_exchange(
                            &phone,
                            &text.raw,
                            Some(&text.id),
                            &reply,
                            outcome.message_id.as_deref(),
                        )
                        .await;
                    return;
                }
            }
        }
        warn!(from = %text.from, "no handler claimed message");
    }

    async fn reply_text_only(&self, message: &InboundMessage, phone: &str) {
        info!(from = %message.from, kind = %message.kind.log_label(), "non-text message");
        let reply = self.ctx.replies.text_only();
        let outcome = self.ctx.send_text_with_retry(&message.from, &reply).await;
        self.ctx
            .record_exchange(
                phone,
                &message.kind.log_label(),
                Some(&message.id),
                &reply,
                outcome.message_id.as_deref(),
            )
            .await;
    }
}
