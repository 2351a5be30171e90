// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invoice fulfillment: look the invoice up, deliver it, confirm, count it.

use async_trait::async_trait;
use socio_core::SocioError;
use socio_core::types::{InvoiceRequestRecord, OutboundMedia, normalize_phone};
use socio_intent::{Confidence, InvoiceRequest, detect_invoice_request, is_address_or_name};
use tracing::{debug, error, info, warn};

use super::{HandlerOutcome, MessageHandler};
use crate::context::{PipelineContext, TextMessage};

const PDF_MIME_TYPE: &str = "application/pdf";

/// Handles invoice requests and the address-or-name mistake that often
/// comes with them.
pub struct InvoiceHandler;

/// The reply that closes an exchange.
struct Reply {
    text: String,
    message_id: Option<String>,
}

#[async_trait]
impl MessageHandler for InvoiceHandler {
    fn name(&self) -> &'static str {
        "invoice"
    }

    fn claims(&self, message: &TextMessage) -> bool {
        is_address_or_name(&message.normalized)
            || detect_invoice_request(&message.normalized).is_some()
    }

    async fn handle(
        &self,
        ctx: &PipelineContext,
        message: &TextMessage,
    ) -> Result<HandlerOutcome, SocioError> {
        let phone = normalize_phone(&message.from);

        if is_address_or_name(&message.normalized) {
            let caption = ctx.replies.address_or_name();
            let outcome = ctx
                .send_image_or_text(&message.from, ctx.account_help_image.as_deref(), &caption)
                .await;
            info!(to = %message.from, "address or name given instead of account number");
            ctx.record_exchange(
                &phone,
                &message.raw,
                Some(&message.id),
                &caption,
                outcome.message_id.as_deref(),
            )
            .await;
            return Ok(HandlerOutcome::Handled);
        }

        let Some(request) = detect_invoice_request(&message.normalized) else {
            return Ok(HandlerOutcome::Declined);
        };
        let mut request = request.with_inferred_year(ctx.clock().today());

        if request.confidence == Confidence::Low {
            if !request.is_corroborated() {
                let caption = ctx.replies.low_confidence();
                let outcome = ctx
                    .send_image_or_text(
                        &message.from,
                        ctx.low_confidence_image.as_deref(),
                        &caption,
                    )
                    .await;
                info!(to = %message.from, "account number not read confidently");
                ctx.record_exchange(
                    &phone,
                    &message.raw,
                    Some(&message.id),
                    &caption,
                    outcome.message_id.as_deref(),
                )
                .await;
                return Ok(HandlerOutcome::Handled);
            }
            debug!(account = %request.account_number, "promoting low confidence request");
            request.confidence = Confidence::Medium;
        }

        let reply = match fulfil(ctx, message, &phone, &request).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, account = %request.account_number, "invoice fulfillment failed");
                let text = ctx.replies.delivery_error();
                let outcome = ctx.send_text_with_retry(&message.from, &text).await;
                Reply {
                    text,
                    message_id: outcome.message_id,
                }
            }
        };

        ctx.record_exchange(
            &phone,
            &message.raw,
            Some(&message.id),
            &reply.text,
            reply.message_id.as_deref(),
        )
        .await;
        Ok(HandlerOutcome::Handled)
    }
}

/// Lookup, download, delivery, ledger and confirmation.
async fn fulfil(
    ctx: &PipelineContext,
    message: &TextMessage,
    phone: &str,
    request: &InvoiceRequest,
) -> Result<Reply, SocioError> {
    let collab = &ctx.collaborators;

    let Some(document) = collab.archive.find_invoice(&request.to_query()).await? else {
        info!(
            account = %request.account_number,
            month = ?request.month,
            year = ?request.year,
            "invoice not found"
        );
        let caption = ctx.replies.not_found(request);
        let outcome = ctx
            .send_image_or_text(&message.from, ctx.account_help_image.as_deref(), &caption)
            .await;
        return Ok(Reply {
            text: caption,
            message_id: outcome.message_id,
        });
    };

    let data = collab.archive.download(&document.file_id).await?;
    let caption = ctx
        .replies
        .document_caption(document.service.or(request.service), &request.account_number);
    let outcome = ctx
        .transport()
        .send_document(
            &message.from,
            OutboundMedia::Bytes {
                data,
                mime_type: PDF_MIME_TYPE.to_string(),
            },
            &document.file_name,
            &caption,
        )
        .await;
    if !outcome.success {
        let reason = outcome
            .error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        return Err(SocioError::Transport {
            message: format!("document delivery failed: {reason}"),
            source: None,
        });
    }
    info!(
        to = %message.from,
        account = %request.account_number,
        file = %document.file_name,
        "invoice delivered"
    );

    // Count before recording so the total includes this delivery exactly once.
    let clock = ctx.clock();
    let previous = match collab.ledger.monthly_count(phone, &clock.year_month()).await {
        Ok(count) => count,
        Err(e) => {
            warn!(error = %e, "failed to read monthly usage");
            0
        }
    };
    let record = InvoiceRequestRecord {
        phone: phone.to_string(),
        account_number: request.account_number.clone(),
        file_name: document.file_name.clone(),
        month: request.month,
        year: request.year,
        requested_at: clock.timestamp(),
    };
    if let Err(e) = collab.ledger.record(&record).await {
        warn!(error = %e, "failed to record invoice delivery");
    }
    let total = previous + 1;

    let text = ctx.replies.confirmation(request, &document, total);
    let outcome = ctx.send_text_with_retry(&message.from, &text).await;
    if !outcome.success {
        warn!(to = %message.from, error = ?outcome.error, "confirmation not delivered");
    }
    Ok(Reply {
        text,
        message_id: outcome.message_id,
    })
}
