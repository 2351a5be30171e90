// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests over mock collaborators and a temp SQLite store.

use socio_agent::Replies;
use socio_core::types::{
    BillingMonth, DeliveryError, InboundKind, MediaDescriptor, OutboundMedia, Role, ServiceType,
};
use socio_test_utils::{
    HELP_IMAGE_URL, OFFICE_PHONE, PAYMENT_URL, SentMessage, StoredInvoice, TestHarness,
};

const MEMBER: &str = "5493543111111";

fn november_light_bill() -> StoredInvoice {
    StoredInvoice {
        account_number: "2862".into(),
        month: BillingMonth::Noviembre,
        year: 2025,
        service: ServiceType::Electricidad,
        bytes: b"%PDF-1.4 factura".to_vec(),
    }
}

fn apology(harness: &TestHarness) -> String {
    Replies::new(&harness.config.invoice, &harness.config.chatbot).apology()
}

#[tokio::test]
async fn invoice_request_delivers_document_and_confirmation() {
    let harness = TestHarness::builder()
        .with_invoice(november_light_bill())
        .build()
        .await
        .unwrap();

    harness
        .send_text(MEMBER, "me pueden pasar la boleta de luz, cuenta 2862, noviembre")
        .await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 2, "got: {sent:?}");
    match &sent[0] {
        SentMessage::Document {
            to,
            media,
            file_name,
            caption,
        } => {
            assert_eq!(to, MEMBER);
            assert_eq!(file_name, "electricidad_2862_noviembre_2025.pdf");
            assert_eq!(caption, "Factura de electricidad - cuenta 2862");
            assert_eq!(
                media,
                &OutboundMedia::Bytes {
                    data: b"%PDF-1.4 factura".to_vec(),
                    mime_type: "application/pdf".into(),
                }
            );
        }
        other => panic!("expected document first, got {other:?}"),
    }
    assert!(sent[1].is_text());
    assert!(sent[1].text().contains("2862"));
    assert!(sent[1].text().contains(PAYMENT_URL));

    let queries = harness.archive.queries().await;
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].month, Some(BillingMonth::Noviembre));
    assert_eq!(queries[0].year, Some(2025));
    assert_eq!(queries[0].service, Some(ServiceType::Electricidad));

    let history = harness.history(MEMBER).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].provider_message_id.as_deref(), Some("wamid.in-1"));
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].content, sent[1].text());
    assert_eq!(history[1].provider_message_id.as_deref(), Some("wamid.mock-2"));

    assert_eq!(harness.monthly_count(MEMBER).await.unwrap(), 1);
    assert_eq!(harness.provider.call_count().await, 0);
}

#[tokio::test]
async fn account_question_sends_only_the_help_image() {
    let harness = TestHarness::builder().build().await.unwrap();

    harness
        .send_text(MEMBER, "dónde encuentro mi número de cuenta")
        .await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        SentMessage::Image { media, .. } => {
            assert_eq!(media, &OutboundMedia::Link(HELP_IMAGE_URL.into()));
        }
        other => panic!("expected image, got {other:?}"),
    }
    assert!(harness.archive.queries().await.is_empty());
    assert_eq!(harness.provider.call_count().await, 0);
    assert_eq!(harness.history(MEMBER).await.unwrap().len(), 2);
}

#[tokio::test]
async fn eleventh_delivery_asks_to_contact_the_office() {
    let harness = TestHarness::builder()
        .with_invoice(november_light_bill())
        .build()
        .await
        .unwrap();

    for _ in 0..10 {
        harness.send_text(MEMBER, "factura de luz cuenta 2862 noviembre").await;
    }
    let sent = harness.transport.sent_messages().await;
    let tenth = sent.last().unwrap().text().to_string();
    assert!(tenth.contains("ya pediste 10 facturas"), "got: {tenth}");
    assert!(!tenth.contains("personalmente"));

    harness.send_text(MEMBER, "factura de luz cuenta 2862 noviembre").await;
    let sent = harness.transport.sent_messages().await;
    let eleventh = sent.last().unwrap().text();
    assert!(
        eleventh.contains(&format!("contactanos personalmente al {OFFICE_PHONE}")),
        "got: {eleventh}"
    );
    assert_eq!(harness.monthly_count(MEMBER).await.unwrap(), 11);
}

#[tokio::test]
async fn second_delivery_carries_the_soft_reminder() {
    let harness = TestHarness::builder()
        .with_invoice(november_light_bill())
        .build()
        .await
        .unwrap();

    harness.send_text(MEMBER, "factura cuenta 2862").await;
    let first = harness.transport.sent_messages().await[1].text().to_string();
    assert!(!first.contains("Este mes"));

    harness.send_text(MEMBER, "factura cuenta 2862").await;
    let second = harness.transport.sent_messages().await[3].text().to_string();
    assert!(second.contains("ya pediste 2 facturas"), "got: {second}");
}

#[tokio::test]
async fn missing_completion_credentials_send_the_apology_verbatim() {
    let harness = TestHarness::builder().without_provider().build().await.unwrap();

    harness.send_text(MEMBER, "hola, a qué hora abren?").await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text(), apology(&harness));
    assert!(sent[0].text().contains(OFFICE_PHONE));
}

#[tokio::test]
async fn failing_completion_sends_the_apology() {
    let harness = TestHarness::builder()
        .with_failing_provider()
        .build()
        .await
        .unwrap();

    harness.send_text(MEMBER, "hay corte de agua?").await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text(), apology(&harness));
    assert_eq!(harness.provider.call_count().await, 1);
    assert_eq!(harness.history(MEMBER).await.unwrap().len(), 2);
}

#[tokio::test]
async fn chatbot_context_is_the_last_ten_turns_plus_the_new_message() {
    let harness = TestHarness::builder().build().await.unwrap();

    for i in 0..6 {
        harness.send_text(MEMBER, &format!("pregunta {i}")).await;
    }

    let requests = harness.provider.requests().await;
    assert_eq!(requests.len(), 6);
    assert_eq!(requests[0].messages.len(), 1);
    assert_eq!(requests[1].messages.len(), 3);

    let last = &requests[5];
    assert_eq!(last.messages.len(), 11);
    assert_eq!(last.messages[0].content, "pregunta 0");
    assert_eq!(last.messages[0].role, Role::User);
    assert_eq!(last.messages[10].content, "pregunta 5");
    assert_eq!(last.max_tokens, 500);
    assert!(last.system.contains(OFFICE_PHONE));
}

#[tokio::test]
async fn conversation_log_keeps_twenty_entries() {
    let harness = TestHarness::builder().build().await.unwrap();

    for i in 0..12 {
        harness.send_text(MEMBER, &format!("mensaje {i}")).await;
    }

    let history = harness.history(MEMBER).await.unwrap();
    assert_eq!(history.len(), 20);
    assert_eq!(history[0].content, "mensaje 2");
}

#[tokio::test]
async fn address_instead_of_account_gets_the_help_image() {
    let harness = TestHarness::builder().build().await.unwrap();

    harness
        .send_text(MEMBER, "mandame la factura de calle Mitre 845")
        .await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is_image());
    assert!(sent[0].text().contains("no la dirección"));
    assert!(harness.archive.queries().await.is_empty());
}

#[tokio::test]
async fn greeting_with_a_name_still_delivers_the_invoice() {
    let harness = TestHarness::builder()
        .with_invoice(november_light_bill())
        .build()
        .await
        .unwrap();

    harness
        .send_text(
            MEMBER,
            "hola soy Juan, necesito la boleta de luz 2862 de noviembre",
        )
        .await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 2, "got: {sent:?}");
    assert!(sent[0].is_document());
    assert!(sent[1].text().contains("2862"));

    let queries = harness.archive.queries().await;
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].account_number, "2862");
    assert_eq!(harness.monthly_count(MEMBER).await.unwrap(), 1);
}

#[tokio::test]
async fn bare_number_gets_the_low_confidence_image() {
    let harness = TestHarness::builder()
        .with_invoice(november_light_bill())
        .build()
        .await
        .unwrap();

    harness.send_text(MEMBER, "2862").await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is_image());
    assert!(sent[0].text().contains("No pude identificar"));
    assert!(harness.archive.queries().await.is_empty());
    assert_eq!(harness.monthly_count(MEMBER).await.unwrap(), 0);
}

#[tokio::test]
async fn bare_number_with_month_is_promoted_and_delivered() {
    let harness = TestHarness::builder()
        .with_invoice(november_light_bill())
        .build()
        .await
        .unwrap();

    harness.send_text(MEMBER, "2862 noviembre").await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].is_document());
    assert_eq!(harness.monthly_count(MEMBER).await.unwrap(), 1);
}

#[tokio::test]
async fn omitted_year_rolls_back_in_january() {
    let harness = TestHarness::builder()
        .on_date(2026, 1, 15)
        .build()
        .await
        .unwrap();

    harness
        .send_text(MEMBER, "factura de luz cuenta 2862 noviembre")
        .await;

    let queries = harness.archive.queries().await;
    assert_eq!(queries[0].year, Some(2025));
}

#[tokio::test]
async fn missing_invoice_sends_not_found_image_without_ledger_write() {
    let harness = TestHarness::builder().build().await.unwrap();

    harness.send_text(MEMBER, "factura cuenta 9999 marzo").await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is_image());
    assert!(sent[0].text().contains("No encontré la factura de la cuenta 9999"));
    assert_eq!(harness.monthly_count(MEMBER).await.unwrap(), 0);
    assert_eq!(harness.history(MEMBER).await.unwrap().len(), 2);
}

#[tokio::test]
async fn archive_failure_sends_the_delivery_error() {
    let harness = TestHarness::builder()
        .with_failing_archive()
        .build()
        .await
        .unwrap();

    harness.send_text(MEMBER, "factura cuenta 2862").await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is_text());
    assert!(sent[0].text().contains("Tuvimos un problema"));
    assert!(sent[0].text().contains(OFFICE_PHONE));
    assert_eq!(harness.provider.call_count().await, 0);
    assert_eq!(harness.history(MEMBER).await.unwrap().len(), 2);
}

#[tokio::test]
async fn slow_archive_sends_the_delivery_error() {
    let harness = TestHarness::builder()
        .with_invoice(november_light_bill())
        .with_timing_out_archive()
        .build()
        .await
        .unwrap();

    harness
        .send_text(MEMBER, "necesito la boleta de luz 2862 de noviembre")
        .await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is_text());
    assert!(sent[0].text().contains("Tuvimos un problema"));
    assert!(sent[0].text().contains(OFFICE_PHONE));
    assert_eq!(harness.archive.queries().await.len(), 1);
    assert_eq!(harness.monthly_count(MEMBER).await.unwrap(), 0);
}

#[tokio::test]
async fn failed_document_send_is_not_counted() {
    let harness = TestHarness::builder()
        .with_invoice(november_light_bill())
        .build()
        .await
        .unwrap();
    harness
        .transport
        .fail_documents(DeliveryError::Rejected {
            status: 400,
            body: "bad media".into(),
        })
        .await;

    harness.send_text(MEMBER, "factura cuenta 2862").await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text().contains("Tuvimos un problema"));
    assert_eq!(harness.monthly_count(MEMBER).await.unwrap(), 0);
}

#[tokio::test]
async fn non_text_messages_get_the_text_only_reply() {
    let harness = TestHarness::builder().build().await.unwrap();

    let message = harness.message(
        MEMBER,
        InboundKind::Image(MediaDescriptor {
            media_id: "MEDIA1".into(),
            ..Default::default()
        }),
    );
    harness.send(message).await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text().contains("solo puedo leer mensajes de texto"));

    let history = harness.history(MEMBER).await.unwrap();
    assert_eq!(history[0].content, "[image]");
    assert_eq!(harness.provider.call_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn text_send_is_retried_once_on_network_failure() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["Abrimos de 7 a 13.".into()])
        .build()
        .await
        .unwrap();
    harness
        .transport
        .fail_next_text(DeliveryError::Network("connection reset".into()))
        .await;

    harness.send_text(MEMBER, "a qué hora abren?").await;

    assert_eq!(harness.transport.attempts().await, 2);
    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text(), "Abrimos de 7 a 13.");
}

#[tokio::test(start_paused = true)]
async fn text_send_is_not_retried_on_timeout() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.transport.fail_next_text(DeliveryError::Timeout).await;

    harness.send_text(MEMBER, "a qué hora abren?").await;

    assert_eq!(harness.transport.attempts().await, 1);
    assert_eq!(harness.transport.sent_count().await, 0);
    // The failed reply is still persisted, without an outbound id.
    let history = harness.history(MEMBER).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[1].provider_message_id.is_none());
}

#[tokio::test]
async fn persistence_failures_do_not_block_replies() {
    let harness = TestHarness::builder()
        .with_failing_store()
        .with_invoice(november_light_bill())
        .build()
        .await
        .unwrap();

    harness.send_text(MEMBER, "factura de luz cuenta 2862").await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].is_document());
    assert!(sent[1].text().contains(PAYMENT_URL));
}

#[tokio::test]
async fn image_failure_falls_back_to_caption_text() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness
        .transport
        .fail_images(DeliveryError::Rejected {
            status: 400,
            body: "media fetch failed".into(),
        })
        .await;

    harness
        .send_text(MEMBER, "dónde encuentro mi número de cuenta")
        .await;

    let sent = harness.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is_text());
    assert!(sent[0].text().contains("parte superior de la factura"));
}

#[tokio::test]
async fn senders_are_normalized_into_one_conversation() {
    let harness = TestHarness::builder().build().await.unwrap();

    harness.send_text("+54 9 3543 111111", "hola").await;
    harness.send_text("5493543111111", "sigo acá").await;

    let history = harness.history(MEMBER).await.unwrap();
    assert_eq!(history.len(), 4);
}
