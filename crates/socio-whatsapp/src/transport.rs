// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound messages through the WhatsApp Cloud API.
//!
//! Every send resolves to a [`SendOutcome`]; HTTP and network failures are
//! classified into [`DeliveryError`] instead of being raised. Byte media is
//! uploaded to `/{phone_number_id}/media` first and sent by id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{Value, json};
use socio_config::model::WhatsAppConfig;
use socio_core::types::{DeliveryError, OutboundMedia, SendOutcome};
use socio_core::{AdapterType, HealthStatus, MessagingTransport, PluginAdapter, SocioError};
use tracing::{debug, info, warn};

/// Longest body the Cloud API accepts for a text message.
const MAX_TEXT_LENGTH: usize = 4096;

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

/// WhatsApp Cloud API client.
#[derive(Clone)]
pub struct CloudTransport {
    client: reqwest::Client,
    /// `{graph_base_url}/{api_version}`
    api_base: String,
    phone_number_id: Option<String>,
    access_token: Option<String>,
    text_timeout: Duration,
    document_timeout: Duration,
}

impl std::fmt::Debug for CloudTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudTransport")
            .field("api_base", &self.api_base)
            .field("phone_number_id", &self.phone_number_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl CloudTransport {
    /// Builds a transport from configuration.
    ///
    /// Missing credentials are allowed: sends then fail with
    /// [`DeliveryError::NotConfigured`] without touching the network.
    pub fn new(config: &WhatsAppConfig) -> Result<Self, SocioError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SocioError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_base: format!(
                "{}/{}",
                config.graph_base_url.trim_end_matches('/'),
                config.api_version
            ),
            phone_number_id: config.phone_number_id.clone().filter(|s| !s.is_empty()),
            access_token: config.access_token.clone().filter(|s| !s.is_empty()),
            text_timeout: Duration::from_secs(config.text_timeout_secs),
            document_timeout: Duration::from_secs(config.document_timeout_secs),
        })
    }

    /// Overrides both timeouts (tests use sub-second budgets).
    #[cfg(test)]
    pub fn with_timeouts(mut self, text: Duration, document: Duration) -> Self {
        self.text_timeout = text;
        self.document_timeout = document;
        self
    }

    fn credentials(&self) -> Result<(&str, &str), DeliveryError> {
        match (&self.phone_number_id, &self.access_token) {
            (Some(id), Some(token)) => Ok((id.as_str(), token.as_str())),
            (None, _) => Err(DeliveryError::NotConfigured(
                "whatsapp.phone_number_id is not set".into(),
            )),
            (_, None) => Err(DeliveryError::NotConfigured(
                "whatsapp.access_token is not set".into(),
            )),
        }
    }

    async fn post_message(&self, to: &str, payload: Value, timeout: Duration) -> SendOutcome {
        let (phone_number_id, token) = match self.credentials() {
            Ok(c) => c,
            Err(e) => return SendOutcome::failed(e),
        };
        let url = format!("{}/{}/messages", self.api_base, phone_number_id);

        let response = match self
            .client
            .post(&url)
            .bearer_auth(token)
            .timeout(timeout)
            .json(&payload)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                let error = classify_reqwest_error(&e);
                warn!(to, error = %error, "WhatsApp send failed");
                return SendOutcome::failed(error);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(to, status = %status, body = %body, "WhatsApp API rejected message");
            return SendOutcome::failed(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let message_id = response
            .json::<SendResponse>()
            .await
            .ok()
            .and_then(|r| r.messages.into_iter().next())
            .map(|m| m.id);
        debug!(to, message_id = ?message_id, "WhatsApp message accepted");
        SendOutcome::delivered(message_id)
    }

    /// Uploads bytes and returns the media id.
    async fn upload_media(
        &self,
        data: Vec<u8>,
        mime_type: &str,
        file_name: &str,
        timeout: Duration,
    ) -> Result<String, DeliveryError> {
        let (phone_number_id, token) = self.credentials()?;
        let url = format!("{}/{}/media", self.api_base, phone_number_id);

        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| DeliveryError::Rejected {
                status: 0,
                body: format!("invalid mime type {mime_type}: {e}"),
            })?;
        let form = Form::new()
            .text("messaging_product", "whatsapp")
            .text("type", mime_type.to_string())
            .part("file", part);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .timeout(timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        let upload: UploadResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(status = %status, error = %e, "undecodable media upload response");
            DeliveryError::Rejected {
                status: status.as_u16(),
                body: body.clone(),
            }
        })?;
        debug!(media_id = %upload.id, file_name, "media uploaded");
        Ok(upload.id)
    }

    /// `{"id": ...}` for uploaded bytes or `{"link": ...}` for URLs.
    async fn media_object(
        &self,
        media: OutboundMedia,
        file_name: &str,
        timeout: Duration,
    ) -> Result<serde_json::Map<String, Value>, DeliveryError> {
        let mut object = serde_json::Map::new();
        match media {
            OutboundMedia::Bytes { data, mime_type } => {
                let id = self.upload_media(data, &mime_type, file_name, timeout).await?;
                object.insert("id".into(), Value::String(id));
            }
            OutboundMedia::Link(url) => {
                object.insert("link".into(), Value::String(url));
            }
        }
        Ok(object)
    }
}

/// Timeouts are kept apart from other transport failures: only the latter are retried.
fn classify_reqwest_error(e: &reqwest::Error) -> DeliveryError {
    if e.is_timeout() {
        DeliveryError::Timeout
    } else {
        DeliveryError::Network(e.to_string())
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_TEXT_LENGTH {
        return body.to_string();
    }
    body.chars().take(MAX_TEXT_LENGTH).collect()
}

#[async_trait]
impl PluginAdapter for CloudTransport {
    fn name(&self) -> &str {
        "whatsapp-cloud"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, SocioError> {
        Ok(match self.credentials() {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Degraded(e.to_string()),
        })
    }
}

#[async_trait]
impl MessagingTransport for CloudTransport {
    async fn send_text(&self, to: &str, body: &str) -> SendOutcome {
        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": {
                "preview_url": false,
                "body": truncate(body),
            }
        });
        self.post_message(to, payload, self.text_timeout).await
    }

    async fn send_document(
        &self,
        to: &str,
        media: OutboundMedia,
        file_name: &str,
        caption: &str,
    ) -> SendOutcome {
        let mut document = match self.media_object(media, file_name, self.document_timeout).await {
            Ok(object) => object,
            Err(e) => {
                warn!(to, file_name, error = %e, "document upload failed");
                return SendOutcome::failed(e);
            }
        };
        document.insert("filename".into(), Value::String(file_name.to_string()));
        document.insert("caption".into(), Value::String(caption.to_string()));

        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "document",
            "document": document,
        });
        let outcome = self.post_message(to, payload, self.document_timeout).await;
        if outcome.success {
            info!(to, file_name, "document sent");
        }
        outcome
    }

    async fn send_image(&self, to: &str, media: OutboundMedia, caption: &str) -> SendOutcome {
        let mut image = match self.media_object(media, "image", self.document_timeout).await {
            Ok(object) => object,
            Err(e) => {
                warn!(to, error = %e, "image upload failed");
                return SendOutcome::failed(e);
            }
        };
        image.insert("caption".into(), Value::String(caption.to_string()));

        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "image",
            "image": image,
        });
        self.post_message(to, payload, self.document_timeout).await
    }
}
