// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use socio_core::SocioError;
use socio_core::types::normalize_phone;
use socio_intent::is_account_question;
use tracing::info;

use super::{HandlerOutcome, MessageHandler};
use crate::context::{PipelineContext, TextMessage};

/// Answers "where is my account number" with the help image.
pub struct AccountQuestionHandler;

#[async_trait]
impl MessageHandler for AccountQuestionHandler {
    fn name(&self) -> &'static str {
        "account-question"
    }

    fn claims(&self, message: &TextMessage) -> bool {
        is_account_question(&message.normalized)
    }

    async fn handle(
        &self,
        ctx: &PipelineContext,
        message: &TextMessage,
    ) -> Result<HandlerOutcome, SocioError> {
        let caption = ctx.replies.account_location();
        let outcome = ctx
            .send_image_or_text(&message.from, ctx.account_help_image.as_deref(), &caption)
            .await;
        info!(to = %message.from, success = outcome.success, "account help sent");

        ctx.record_exchange(
            &normalize_phone(&message.from),
            &message.raw,
            Some(&message.id),
            &caption,
            outcome.message_id.as_deref(),
        )
        .await;
        Ok(HandlerOutcome::Handled)
    }
}
