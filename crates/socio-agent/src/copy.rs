// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Member-facing reply texts.

use socio_config::model::{ChatbotConfig, InvoiceConfig};
use socio_core::types::{InvoiceDocument, ServiceType};
use socio_intent::InvoiceRequest;

/// Reply texts with the cooperative's contact details filled in.
#[derive(Debug, Clone)]
pub struct Replies {
    office_phone: String,
    payment_url: String,
    office_hours: String,
    soft_warning_from: u32,
    hard_limit: u32,
}

/// What to append to a confirmation after `total` deliveries this month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageNotice {
    None,
    Reminder,
    ContactOffice,
}

impl Replies {
    pub fn new(invoice: &InvoiceConfig, chatbot: &ChatbotConfig) -> Self {
        Self {
            office_phone: invoice.office_phone.clone(),
            payment_url: invoice.payment_url.clone(),
            office_hours: chatbot.office_hours.clone(),
            soft_warning_from: invoice.soft_warning_from,
            hard_limit: invoice.hard_limit,
        }
    }

    pub fn office_phone(&self) -> &str {
        &self.office_phone
    }

    /// Caption for the help image sent when an address or name was given.
    pub fn address_or_name(&self) -> String {
        "Para enviarte la factura necesito el número de cuenta, no la dirección ni el \
         nombre del titular. Lo encontrás en la parte superior de tu factura, como \
         te muestro en la imagen. Escribime por ejemplo: \"factura cuenta 1234\"."
            .to_string()
    }

    /// Caption for the account-number location image.
    pub fn account_location(&self) -> String {
        "Tu número de cuenta está en la parte superior de la factura, junto a tus datos \
         de titular (te lo marcamos en la imagen). Con ese número podés pedirme la \
         factura, por ejemplo: \"factura de luz cuenta 1234 noviembre\"."
            .to_string()
    }

    pub fn low_confidence(&self) -> String {
        "No pude identificar con seguridad tu número de cuenta. Escribime el número \
         de cuenta y el mes, por ejemplo: \"factura cuenta 1234 noviembre\"."
            .to_string()
    }

    pub fn not_found(&self, request: &InvoiceRequest) -> String {
        format!(
            "No encontré la factura de la cuenta {} para {}. Revisá que el número de \
             cuenta sea el que figura en la imagen. Si el problema sigue, llamanos al {}.",
            request.account_number,
            period_label(request),
            self.office_phone
        )
    }

    pub fn document_caption(&self, service: Option<ServiceType>, account: &str) -> String {
        match service {
            Some(service) => format!("Factura de {} - cuenta {account}", service_label(service)),
            None => format!("Factura - cuenta {account}"),
        }
    }

    pub fn usage_notice(&self, total: u32) -> UsageNotice {
        if total > self.hard_limit {
            UsageNotice::ContactOffice
        } else if total >= self.soft_warning_from {
            UsageNotice::Reminder
        } else {
            UsageNotice::None
        }
    }

    /// Confirmation sent after the document, `total` counting this delivery.
    pub fn confirmation(
        &self,
        request: &InvoiceRequest,
        document: &InvoiceDocument,
        total: u32,
    ) -> String {
        let mut text = format!(
            "¡Listo! Te enviamos la factura de la cuenta {} ({}).\nArchivo: {}\n\
             Podés pagarla online en {}",
            request.account_number,
            period_label(request),
            document.file_name,
            self.payment_url
        );
        match self.usage_notice(total) {
            UsageNotice::None => {}
            UsageNotice::Reminder => text.push_str(&format!(
                "\n\nEste mes ya pediste {total} facturas por este medio."
            )),
            UsageNotice::ContactOffice => text.push_str(&format!(
                "\n\nYa pediste {total} facturas este mes. Para más pedidos, \
                 contactanos personalmente al {}.",
                self.office_phone
            )),
        }
        text
    }

    /// Sent when lookup, download or delivery failed.
    pub fn delivery_error(&self) -> String {
        format!(
            "Tuvimos un problema al enviarte la factura. Probá de nuevo en unos minutos \
             o llamanos al {}.",
            self.office_phone
        )
    }

    /// Chatbot reply when no completion is available.
    pub fn apology(&self) -> String {
        format!(
            "Disculpá, en este momento no puedo responder tu consulta. Comunicate con \
             nuestra oficina al {} ({}).",
            self.office_phone, self.office_hours
        )
    }

    /// Reply to documents, images, contacts and other non-text messages.
    pub fn text_only(&self) -> String {
        "Por ahora solo puedo leer mensajes de texto. Escribime tu consulta, por \
         ejemplo: \"factura cuenta 1234\"."
            .to_string()
    }
}

fn service_label(service: ServiceType) -> &'static str {
    match service {
        ServiceType::Electricidad => "electricidad",
        ServiceType::Servicios => "servicios",
    }
}

fn period_label(request: &InvoiceRequest) -> String {
    match (request.month, request.year) {
        (Some(month), Some(year)) => format!("{month} {year}"),
        (Some(month), None) => month.to_string(),
        (None, _) => "el último período disponible".to_string(),
    }
}
