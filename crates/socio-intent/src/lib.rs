// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic intent classification for inbound member messages.
//!
//! Every classifier is a pure function over normalized text: no I/O, no
//! clock, no state. [`classify`] combines them into a tagged [`Intent`] in
//! the same priority order the dispatcher uses.

pub mod extract;
pub mod normalize;
pub mod predicates;
pub mod year;

pub use extract::{Confidence, InvoiceRequest, detect_invoice_request, detect_service};
pub use normalize::normalize;
pub use predicates::{is_account_question, is_address_or_name};
pub use year::infer_year;

use tracing::debug;

/// What a text message is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Where to find the account number on the invoice.
    AccountQuestion,
    /// An address or name was given where an account number was expected.
    AddressOrName,
    InvoiceRequest(InvoiceRequest),
    Unclassified,
}

/// Classifies raw message text, highest priority first.
pub fn classify(text: &str) -> Intent {
    let normalized = normalize(text);
    let intent = if is_account_question(&normalized) {
        Intent::AccountQuestion
    } else if is_address_or_name(&normalized) {
        Intent::AddressOrName
    } else {
        match detect_invoice_request(&normalized) {
            Some(request) => Intent::InvoiceRequest(request),
            None => Intent::Unclassified,
        }
    };
    debug!(?intent, "message classified");
    intent
}

#[cfg(test)]
mod tests {
    use super::*;
    use socio_core::ServiceType;

    #[test]
    fn account_question_outranks_invoice_vocabulary() {
        assert_eq!(
            classify("dónde encuentro mi número de cuenta en la factura"),
            Intent::AccountQuestion
        );
    }

    #[test]
    fn address_outranks_a_bare_street_number() {
        assert_eq!(
            classify("mandame la factura de calle Mitre 845"),
            Intent::AddressOrName
        );
    }

    #[test]
    fn invoice_request_is_tagged() {
        match classify("boleta de agua cuenta 1503") {
            Intent::InvoiceRequest(request) => {
                assert_eq!(request.account_number, "1503");
                assert_eq!(request.service, Some(ServiceType::Servicios));
                assert_eq!(request.confidence, Confidence::High);
            }
            other => panic!("expected invoice request, got {other:?}"),
        }
    }

    #[test]
    fn small_talk_is_unclassified() {
        assert_eq!(classify("hola, ¿a qué hora abren?"), Intent::Unclassified);
        assert_eq!(classify(""), Intent::Unclassified);
    }
}
