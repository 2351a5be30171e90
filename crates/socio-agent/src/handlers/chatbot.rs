// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Free-form questions answered by the completion service.

use async_trait::async_trait;
use socio_core::SocioError;
use socio_core::types::{ChatTurn, CompletionRequest, Role, normalize_phone};
use tracing::{info, warn};

use super::{HandlerOutcome, MessageHandler};
use crate::context::{PipelineContext, TextMessage};

/// Claims everything; always last in the chain.
pub struct ChatbotHandler;

impl ChatbotHandler {
    /// Persisted history for `phone`, oldest first, plus the new user turn.
    async fn turns(ctx: &PipelineContext, phone: &str, text: &str) -> Vec<ChatTurn> {
        let store = ctx.collaborators.store.as_ref();
        let history = match store.get_or_create_conversation(phone).await {
            Ok(conversation) => store
                .recent_messages(&conversation, ctx.history_limit)
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "failed to load history, answering without it");
                    Vec::new()
                }),
            Err(e) => {
                warn!(error = %e, "failed to open conversation, answering without history");
                Vec::new()
            }
        };

        let mut turns: Vec<ChatTurn> = history
            .into_iter()
            .map(|m| ChatTurn {
                role: m.role,
                content: m.content,
            })
            .collect();
        turns.push(ChatTurn {
            role: Role::User,
            content: text.to_string(),
        });
        turns
    }

    async fn reply(ctx: &PipelineContext, phone: &str, text: &str) -> String {
        let Some(provider) = ctx.collaborators.provider.as_ref() else {
            info!("no completion provider configured, sending apology");
            return ctx.replies.apology();
        };
        let request = CompletionRequest {
            system: ctx.system_prompt.clone(),
            messages: Self::turns(ctx, phone, text).await,
            max_tokens: ctx.max_tokens,
            temperature: ctx.temperature,
        };
        match provider.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, provider = provider.name(), "completion failed, sending apology");
                ctx.replies.apology()
            }
        }
    }
}

#[async_trait]
impl MessageHandler for ChatbotHandler {
    fn name(&self) -> &'static str {
        "chatbot"
    }

    fn claims(&self, _message: &TextMessage) -> bool {
        true
    }

    async fn handle(
        &self,
        ctx: &PipelineContext,
        message: &TextMessage,
    ) -> Result<HandlerOutcome, SocioError> {
        let phone = normalize_phone(&message.from);
        let reply = Self::reply(ctx, &phone, &message.raw).await;
        let outcome = ctx.send_text_with_retry(&message.from, &reply).await;
        if !outcome.success {
            warn!(to = %message.from, error = ?outcome.error, "chatbot reply not delivered");
        }
        ctx.record_exchange(
            &phone,
            &message.raw,
            Some(&message.id),
            &reply,
            outcome.message_id.as_deref(),
        )
        .await;
        Ok(HandlerOutcome::Handled)
    }
}
