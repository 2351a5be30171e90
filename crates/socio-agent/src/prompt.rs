// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt for the chatbot fallback.

use socio_config::model::{ChatbotConfig, InvoiceConfig};
use tracing::{info, warn};

/// Builds the organizational knowledge block from configuration.
pub fn builtin_knowledge(chatbot: &ChatbotConfig, invoice: &InvoiceConfig) -> String {
    format!(
        "Sos el asistente virtual de {org}, una cooperativa de servicios públicos.\n\
         \n\
         Datos de la cooperativa:\n\
         - Teléfono de la oficina: {phone}\n\
         - Horario de atención: {hours}\n\
         - Pago online de facturas: {payment}\n\
         \n\
         Servicios que presta la cooperativa:\n\
         - Electricidad (factura de luz).\n\
         - Agua potable, cloacas, internet y servicio de sepelio, facturados juntos \
           como \"servicios\".\n\
         \n\
         Para pedir una factura el socio escribe su número de cuenta (3 o 4 dígitos, \
         figura en la parte superior de la factura), el servicio y el mes, por ejemplo: \
         \"factura de luz cuenta 1234 noviembre\".",
        org = chatbot.organization_name,
        phone = invoice.office_phone,
        hours = chatbot.office_hours,
        payment = invoice.payment_url,
    )
}

/// Tone and safety rules appended after the knowledge block.
pub fn instructions(office_phone: &str) -> String {
    format!(
        "Instrucciones:\n\
         - Respondé siempre en español rioplatense, con tono cordial y breve (máximo 3 o 4 oraciones).\n\
         - Usá solo la información de arriba. Si no sabés algo, no lo inventes: sugerí \
           llamar a la oficina al {office_phone}.\n\
         - No pidas ni repitas datos personales sensibles (DNI, claves, tarjetas).\n\
         - Para reclamos técnicos o cortes de servicio, indicá que llamen a la oficina.\n\
         - No uses formato Markdown: el mensaje se lee en WhatsApp."
    )
}

/// Loads the system prompt: the knowledge file when configured and readable,
/// else the built-in knowledge, followed by the instructions.
pub async fn load_system_prompt(chatbot: &ChatbotConfig, invoice: &InvoiceConfig) -> String {
    let mut knowledge = None;
    if let Some(ref file_path) = chatbot.knowledge_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    warn!(path = file_path.as_str(), "knowledge file is empty, using built-in");
                } else {
                    info!(path = file_path.as_str(), "loaded chatbot knowledge from file");
                    knowledge = Some(trimmed.to_string());
                }
            }
            Err(e) => {
                warn!(
                    path = file_path.as_str(),
                    error = %e,
                    "failed to read knowledge file, using built-in"
                );
            }
        }
    }

    let knowledge = knowledge.unwrap_or_else(|| builtin_knowledge(chatbot, invoice));
    format!("{knowledge}\n\n{}", instructions(&invoice.office_phone))
}
