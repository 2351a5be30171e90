// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thin HTTP client for the Anthropic Messages API.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use socio_config::model::AnthropicConfig;
use socio_core::SocioError;
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

/// Messages API client.
///
/// A completion is attempted at most twice: the second attempt only follows
/// a 429, 500, 503 or 529 answer, after `retry_delay`.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    endpoint: String,
    attempts: u32,
    retry_delay: Duration,
    timeout: Duration,
}

/// Result of one HTTP round trip.
enum Attempt {
    Done(MessageResponse),
    /// The service asked us to back off; carries the error to report if we give up.
    Overloaded(SocioError),
}

impl AnthropicClient {
    /// Creates a client authenticated with `api_key`.
    pub fn new(api_key: &str, config: &AnthropicConfig) -> Result<Self, SocioError> {
        let header = |name: &str, value: &str| {
            HeaderValue::from_str(value)
                .map_err(|e| SocioError::Config(format!("invalid {name} header value: {e}")))
        };
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", header("x-api-key", api_key)?);
        headers.insert("anthropic-version", header("anthropic-version", &config.api_version)?);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| SocioError::Provider {
                message: format!("cannot build Anthropic HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            endpoint: config.base_url.clone(),
            attempts: 2,
            retry_delay: Duration::from_secs(1),
            timeout,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sends a non-streaming request and returns the decoded response.
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, SocioError> {
        let mut attempt = 1;
        loop {
            match self.attempt(request).await? {
                Attempt::Done(response) => return Ok(response),
                Attempt::Overloaded(err) if attempt >= self.attempts => return Err(err),
                Attempt::Overloaded(err) => {
                    warn!(attempt, error = %err, "completion service busy, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(&self, request: &MessageRequest) -> Result<Attempt, SocioError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!(status = %status, bytes = body.len(), "completion response");

        if status.is_success() {
            return serde_json::from_str(&body)
                .map(Attempt::Done)
                .map_err(|e| SocioError::Provider {
                    message: format!("undecodable completion response: {e}"),
                    source: Some(Box::new(e)),
                });
        }

        let err = api_error(status, &body);
        if matches!(status.as_u16(), 429 | 500 | 503 | 529) {
            Ok(Attempt::Overloaded(err))
        } else {
            Err(err)
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> SocioError {
        if e.is_timeout() {
            return SocioError::Timeout {
                duration: self.timeout,
            };
        }
        SocioError::Provider {
            message: format!("completion request failed: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

/// Builds a provider error from a non-success answer, preferring the API's
/// typed error body when it parses.
fn api_error(status: reqwest::StatusCode, body: &str) -> SocioError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) => format!(
            "Anthropic {status} {}: {}",
            parsed.error.type_, parsed.error.message
        ),
        Err(_) => format!("Anthropic {status}: {body}"),
    };
    SocioError::Provider {
        message,
        source: None,
    }
}
