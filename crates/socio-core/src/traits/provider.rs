// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider trait for the chatbot fallback.

use async_trait::async_trait;

use crate::error::SocioError;
use crate::traits::adapter::PluginAdapter;
use crate::types::CompletionRequest;

/// Adapter for a language-model completion service.
#[async_trait]
pub trait CompletionProvider: PluginAdapter {
    /// Sends the system prompt and turns, returning the assistant's reply text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, SocioError>;
}
