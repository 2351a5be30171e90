// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging transport trait for outbound chat delivery.

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;
use crate::types::{OutboundMedia, SendOutcome};

/// Adapter for sending messages to an end user's chat handle.
///
/// Sends never return `Err`: every failure is folded into a [`SendOutcome`]
/// so callers can pick fallback messaging. Retrying is the caller's policy.
#[async_trait]
pub trait MessagingTransport: PluginAdapter {
    async fn send_text(&self, to: &str, body: &str) -> SendOutcome;

    async fn send_document(
        &self,
        to: &str,
        media: OutboundMedia,
        file_name: &str,
        caption: &str,
    ) -> SendOutcome;

    async fn send_image(&self, to: &str, media: OutboundMedia, caption: &str) -> SendOutcome;
}
