// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use socio_core::SocioError;
use socio_core::traits::{CompletionProvider, PluginAdapter};
use socio_core::types::{AdapterType, CompletionRequest};

/// A mock provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned. Every request is captured.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    failing: bool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
            failing: false,
        }
    }

    /// A provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, SocioError> {
        self.requests.lock().await.push(request);
        if self.failing {
            return Err(SocioError::Provider {
                message: "mock provider failure".into(),
                source: None,
            });
        }
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string()))
    }
}
