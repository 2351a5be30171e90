// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text message handlers, tried in order by the dispatcher.

pub mod account;
pub mod chatbot;
pub mod invoice;

use async_trait::async_trait;
use socio_core::SocioError;

use crate::context::{PipelineContext, TextMessage};

pub use account::AccountQuestionHandler;
pub use chatbot::ChatbotHandler;
pub use invoice::InvoiceHandler;

/// Whether a handler answered the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    Handled,
    /// Not this handler's message after all; the next one is tried.
    Declined,
}

/// One step of the dispatch chain.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap check on the normalized text.
    fn claims(&self, message: &TextMessage) -> bool;

    async fn handle(
        &self,
        ctx: &PipelineContext,
        message: &TextMessage,
    ) -> Result<HandlerOutcome, SocioError>;
}

/// The production chain: account question, invoice request, chatbot.
pub fn default_handlers() -> Vec<Box<dyn MessageHandler>> {
    vec![
        Box::new(AccountQuestionHandler),
        Box::new(InvoiceHandler),
        Box::new(ChatbotHandler),
    ]
}
