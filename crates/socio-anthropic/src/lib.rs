// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude provider for the Socio chatbot fallback.
//!
//! Implements [`CompletionProvider`] over the non-streaming Messages API.

pub mod client;
pub mod types;

use async_trait::async_trait;
use socio_config::model::AnthropicConfig;
use socio_core::error::SocioError;
use socio_core::traits::{CompletionProvider, PluginAdapter};
use socio_core::types::{AdapterType, ChatTurn, CompletionRequest, Role};
use tracing::{debug, info};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest, ResponseContentBlock};

/// Anthropic Claude provider implementing [`CompletionProvider`].
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicProvider {
    client: AnthropicClient,
    model: String,
}

impl AnthropicProvider {
    /// Creates a provider, failing with a config error when no API key resolves.
    pub fn new(config: &AnthropicConfig) -> Result<Self, SocioError> {
        let api_key = config.resolved_api_key().ok_or_else(|| {
            SocioError::Config(
                "Anthropic API key not found: set anthropic.api_key or ANTHROPIC_API_KEY".into(),
            )
        })?;
        let client = AnthropicClient::new(&api_key, config)?;

        info!(model = %config.model, "Anthropic provider initialized");

        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }

    fn to_message_request(&self, request: &CompletionRequest) -> MessageRequest {
        MessageRequest {
            model: self.model.clone(),
            messages: to_api_messages(&request.messages),
            system: Some(request.system.clone()).filter(|s| !s.is_empty()),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

/// Converts stored turns into the API's message list.
///
/// The API wants a user turn first, so leading assistant turns are dropped,
/// and consecutive turns from the same author are joined.
fn to_api_messages(turns: &[ChatTurn]) -> Vec<ApiMessage> {
    let mut messages: Vec<ApiMessage> = Vec::with_capacity(turns.len());
    for turn in turns.iter().skip_while(|t| t.role != Role::User) {
        let role = turn.role.to_string();
        match messages.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(&turn.content);
            }
            _ => messages.push(ApiMessage {
                role,
                content: turn.content.clone(),
            }),
        }
    }
    messages
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, SocioError> {
        let api_request = self.to_message_request(&request);
        let response = self.client.complete_message(&api_request).await?;

        debug!(
            id = %response.id,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "completion received"
        );

        let text: String = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseContentBlock::Text { text } => Some(text),
                ResponseContentBlock::Other => None,
            })
            .collect();

        let text = text.trim();
        if text.is_empty() {
            return Err(SocioError::Provider {
                message: "completion contained no text".into(),
                source: None,
            });
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> AnthropicConfig {
        AnthropicConfig {
            api_key: Some("test-key".into()),
            base_url: base_url.to_string(),
            ..AnthropicConfig::default()
        }
    }

    fn turn(role: Role, content: &str) -> ChatTurn {
        ChatTurn {
            role,
            content: content.into(),
        }
    }

    fn request(messages: Vec<ChatTurn>) -> CompletionRequest {
        CompletionRequest {
            system: "Sos el asistente de la cooperativa.".into(),
            messages,
            max_tokens: 500,
            temperature: 0.4,
        }
    }

    #[test]
    fn blank_key_is_a_config_error() {
        let config = AnthropicConfig {
            api_key: Some("   ".into()),
            ..AnthropicConfig::default()
        };
        let err = AnthropicProvider::new(&config).err().unwrap();
        assert!(matches!(err, SocioError::Config(_)));
    }

    #[test]
    fn leading_assistant_turns_are_dropped() {
        let messages = to_api_messages(&[
            turn(Role::Assistant, "Hola, soy el asistente"),
            turn(Role::User, "cuanto sale la luz"),
            turn(Role::Assistant, "Depende del consumo"),
            turn(Role::User, "y el agua"),
        ]);
        let roles: Vec<_> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["user", "assistant", "user"]);
    }

    #[test]
    fn consecutive_turns_are_joined() {
        let messages = to_api_messages(&[
            turn(Role::User, "hola"),
            turn(Role::User, "hay corte de luz?"),
        ]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "hola\n\nhay corte de luz?");
    }

    #[tokio::test]
    async fn complete_joins_text_blocks() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-3-5-haiku-20241022",
                "system": "Sos el asistente de la cooperativa.",
                "max_tokens": 500
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "content": [
                    {"type": "text", "text": "La oficina abre "},
                    {"type": "text", "text": "de 7 a 13."}
                ],
                "model": "claude-3-5-haiku-20241022",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 20, "output_tokens": 8}
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(&config(&server.uri())).unwrap();
        let reply = provider
            .complete(request(vec![turn(Role::User, "a que hora abren?")]))
            .await
            .unwrap();
        assert_eq!(reply, "La oficina abre de 7 a 13.");
    }

    #[tokio::test]
    async fn empty_completion_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_2",
                "content": [],
                "model": "claude-3-5-haiku-20241022",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 1, "output_tokens": 0}
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(&config(&server.uri())).unwrap();
        let err = provider
            .complete(request(vec![turn(Role::User, "hola")]))
            .await
            .unwrap_err();
        assert!(matches!(err, SocioError::Provider { .. }));
    }

    #[tokio::test]
    async fn adapter_identity() {
        let provider = AnthropicProvider::new(&config("http://127.0.0.1:9")).unwrap();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.adapter_type(), AdapterType::Provider);
        assert_eq!(
            provider.health_check().await.unwrap(),
            socio_core::HealthStatus::Healthy
        );
    }
}
