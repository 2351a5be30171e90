// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invoice request extraction.
//!
//! Pulls an account number, billing period, and service line out of free
//! text. Numbers that only look like account numbers (legacy matriculas,
//! phone numbers, amounts, dates) are blanked out before candidates are
//! collected.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use socio_core::types::InvoiceQuery;
use socio_core::{BillingMonth, ServiceType};
use strum::Display;

use crate::year::infer_year;

/// How sure the extractor is that the number it found is an account number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Confidence {
    /// A bare number with nothing around it saying "invoice".
    Low,
    /// Invoice vocabulary or an account marker, but no period or service.
    Medium,
    /// Invoice vocabulary or a marker, corroborated by a period or service.
    High,
}

/// A structured invoice request read from one message. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRequest {
    pub account_number: String,
    pub month: Option<BillingMonth>,
    pub year: Option<i32>,
    pub service: Option<ServiceType>,
    pub confidence: Confidence,
}

impl InvoiceRequest {
    /// Fills a missing year from the month and `today`.
    pub fn with_inferred_year(mut self, today: NaiveDate) -> Self {
        if let (Some(month), None) = (self.month, self.year) {
            self.year = Some(infer_year(month, today));
        }
        self
    }

    /// True when a period or service backs up the account number.
    pub fn is_corroborated(&self) -> bool {
        self.month.is_some() || self.service.is_some()
    }

    /// The archive lookup key.
    pub fn to_query(&self) -> InvoiceQuery {
        InvoiceQuery {
            account_number: self.account_number.clone(),
            month: self.month,
            year: self.year,
            service: self.service,
        }
    }
}

/// Numeric dates such as `15/11/2025`.
static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b").unwrap());

/// Numeric billing period `MM/YYYY`.
static NUMERIC_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(0?[1-9]|1[0-2])/(20\d{2})\b").unwrap());

/// Patterns whose digits must never become account candidates, applied in order.
static NOISE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Legacy matriculas: 54-0556-A
        Regex::new(r"\b\d{1,3}-\d{3,5}(?:-[a-z])?\b").unwrap(),
        // Phone numbers: +54 9 3543 123456, 3543-421234, 3543421234
        Regex::new(r"\+\d[\d\s-]{6,}\d|\b\d{2,5}[-\s]\d{6,8}\b|\b\d{7,}\b").unwrap(),
        // Amounts: $1.500, $ 2300
        Regex::new(r"\$\s?\d[\d.,]*").unwrap(),
        // Decimals and thousands: 1.500, 12,75
        Regex::new(r"\b\d+[.,]\d+\b").unwrap(),
    ]
});

static MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|octubre|noviembre|diciembre)\b(?:\s+(?:de\s+|del\s+)?(20\d{2})\b)?",
    )
    .unwrap()
});

/// An explicit account marker followed by the number.
static MARKED_ACCOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\b(?:cuenta|cta|nro|numero|num|socio|usuario|suministro)\.?\s*(?:de\s+(?:cuenta|socio|usuario|suministro)\s*)?(?:n[°º]|nro\.?|numero|es|:|#)?\s*:?\s*|\bn[°º]\s*)(\d{3,4})\b",
    )
    .unwrap()
});

static CANDIDATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{3,4}\b").unwrap());

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^20\d{2}$").unwrap());

static INVOICE_VOCABULARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(facturas?|boletas?|recibos?|comprobantes?|cuenta|cta|socio|pdf|liquidacion|resumen|pagar|deuda|vencimiento)\b",
    )
    .unwrap()
});

static ELECTRICITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(luz|electricidad|energia|electric\w*)\b").unwrap());

static SERVICES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(servicios?|agua|sepelio|internet|cloacas?)\b").unwrap()
});

/// Blanks out numbers that must never be read as account numbers.
fn strip_noise(text: &str) -> String {
    let mut cleaned = DATE.replace_all(text, " ").into_owned();
    for pattern in NOISE.iter() {
        cleaned = pattern.replace_all(&cleaned, " ").into_owned();
    }
    cleaned
}

/// Billing month and year, with the matched text blanked out.
fn take_period(text: &str) -> (Option<BillingMonth>, Option<i32>, String) {
    if let Some(caps) = NUMERIC_PERIOD.captures(text) {
        let month = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .and_then(BillingMonth::from_number);
        let year = caps.get(2).and_then(|y| y.as_str().parse::<i32>().ok());
        let rest = NUMERIC_PERIOD.replace(text, " ").into_owned();
        if month.is_some() {
            return (month, year, rest);
        }
    }

    if let Some(caps) = MONTH.captures(text) {
        let month = caps
            .get(1)
            .and_then(|m| BillingMonth::from_str(m.as_str()).ok());
        let year = caps.get(2).and_then(|y| y.as_str().parse::<i32>().ok());
        let rest = MONTH.replace(text, " ").into_owned();
        return (month, year, rest);
    }

    (None, None, text.to_string())
}

/// Service line named in the text. Electricity wins when both appear.
pub fn detect_service(normalized: &str) -> Option<ServiceType> {
    if ELECTRICITY.is_match(normalized) {
        Some(ServiceType::Electricidad)
    } else if SERVICES.is_match(normalized) {
        Some(ServiceType::Servicios)
    } else {
        None
    }
}

/// True when the text uses invoice vocabulary (`factura`, `boleta`, `cuenta`, ...).
pub fn has_invoice_vocabulary(normalized: &str) -> bool {
    INVOICE_VOCABULARY.is_match(normalized)
}

/// The number after an explicit account marker (`cuenta 2862`, `n° 2862`).
pub fn marked_account(normalized: &str) -> Option<String> {
    let cleaned = strip_noise(normalized);
    MARKED_ACCOUNT
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// True when any valid account number, marked or bare, appears in the text.
pub fn mentions_account_number(normalized: &str) -> bool {
    let (_, _, rest) = take_period(&strip_noise(normalized));
    CANDIDATE.is_match(&rest)
}

/// Reads an invoice request from already-normalized text.
///
/// Returns `None` when no account number survives noise stripping.
pub fn detect_invoice_request(normalized: &str) -> Option<InvoiceRequest> {
    let cleaned = strip_noise(normalized);
    let (month, mut year, rest) = take_period(&cleaned);

    let marked = MARKED_ACCOUNT
        .captures(&rest)
        .and_then(|caps| caps.get(1))
        .map(|m| (m.start(), m.as_str().to_string()));

    let candidates: Vec<(usize, &str)> = CANDIDATE
        .find_iter(&rest)
        .map(|m| (m.start(), m.as_str()))
        .collect();

    let account_number = match &marked {
        Some((start, number)) => {
            if year.is_none() {
                year = candidates
                    .iter()
                    .find(|(pos, c)| pos != start && YEAR.is_match(c))
                    .and_then(|(_, c)| c.parse().ok());
            }
            number.clone()
        }
        None => {
            let year_candidate = if year.is_none() && candidates.len() > 1 {
                candidates.iter().position(|(_, c)| YEAR.is_match(c))
            } else {
                None
            };
            if let Some(index) = year_candidate {
                year = candidates[index].1.parse().ok();
            }
            let (_, number) = candidates
                .iter()
                .enumerate()
                .find(|(i, _)| Some(*i) != year_candidate)
                .map(|(_, c)| *c)?;
            number.to_string()
        }
    };

    let service = detect_service(normalized);
    let has_context = marked.is_some() || has_invoice_vocabulary(normalized);
    let confidence = if !has_context {
        Confidence::Low
    } else if month.is_some() || service.is_some() {
        Confidence::High
    } else {
        Confidence::Medium
    };

    Some(InvoiceRequest {
        account_number,
        month,
        year,
        service,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use proptest::prelude::*;

    fn detect(text: &str) -> Option<InvoiceRequest> {
        detect_invoice_request(&normalize(text))
    }

    #[test]
    fn reads_the_canonical_request() {
        let request = detect("me pueden pasar la boleta de luz, cuenta 2862, noviembre").unwrap();
        assert_eq!(request.account_number, "2862");
        assert_eq!(request.month, Some(BillingMonth::Noviembre));
        assert_eq!(request.year, None);
        assert_eq!(request.service, Some(ServiceType::Electricidad));
        assert_eq!(request.confidence, Confidence::High);
    }

    #[test]
    fn legacy_matricula_is_never_extracted() {
        assert_eq!(detect("54-0556-A"), None);
        assert_eq!(detect("mi matricula es 54-0556-A"), None);
        assert_eq!(detect("factura 54-0556"), None);
    }

    #[test]
    fn legacy_matricula_next_to_a_real_account() {
        let request = detect("la 54-0556-A ya no va, la cuenta nueva es 1234").unwrap();
        assert_eq!(request.account_number, "1234");
    }

    #[test]
    fn phone_numbers_and_amounts_are_ignored() {
        assert_eq!(detect("llamame al 3543 421234"), None);
        assert_eq!(detect("+54 9 3543 123456"), None);
        assert_eq!(detect("pague $1.500 ayer"), None);
        assert_eq!(detect("son 2.300 pesos"), None);
    }

    #[test]
    fn dates_are_not_accounts() {
        assert_eq!(detect("vencio el 15/11/2025"), None);
    }

    #[test]
    fn numeric_period_sets_month_and_year() {
        let request = detect("factura 2862 del 11/2025").unwrap();
        assert_eq!(request.account_number, "2862");
        assert_eq!(request.month, Some(BillingMonth::Noviembre));
        assert_eq!(request.year, Some(2025));
        assert_eq!(request.confidence, Confidence::High);
    }

    #[test]
    fn month_with_year_phrase() {
        let request = detect("boleta 431 de noviembre de 2025").unwrap();
        assert_eq!(request.account_number, "431");
        assert_eq!(request.year, Some(2025));

        let request = detect("boleta 431 noviembre 2024").unwrap();
        assert_eq!(request.year, Some(2024));
    }

    #[test]
    fn setiembre_is_accepted() {
        let request = detect("factura 1234 setiembre").unwrap();
        assert_eq!(request.month, Some(BillingMonth::Septiembre));
    }

    #[test]
    fn standalone_year_with_another_candidate() {
        let request = detect("necesito la factura 2025 de la cuenta 3021").unwrap();
        assert_eq!(request.account_number, "3021");
        assert_eq!(request.year, Some(2025));

        let request = detect("factura 512 2024").unwrap();
        assert_eq!(request.account_number, "512");
        assert_eq!(request.year, Some(2024));
    }

    #[test]
    fn lone_year_shaped_number_is_the_account() {
        let request = detect("factura 2024").unwrap();
        assert_eq!(request.account_number, "2024");
        assert_eq!(request.year, None);
    }

    #[test]
    fn marker_beats_earlier_bare_number() {
        let request = detect("tengo 300 facturas, numero de cuenta 4455").unwrap();
        assert_eq!(request.account_number, "4455");
    }

    #[test]
    fn marker_variants() {
        for text in [
            "cuenta 2862",
            "cuenta nro 2862",
            "cta. 2862",
            "socio n° 2862",
            "mi cuenta es 2862",
            "nro de socio: 2862",
            "N° 2862",
        ] {
            let request = detect(text).unwrap_or_else(|| panic!("no request for {text}"));
            assert_eq!(request.account_number, "2862", "{text}");
            assert_ne!(request.confidence, Confidence::Low, "{text}");
        }
    }

    #[test]
    fn service_words() {
        assert_eq!(detect_service("la de agua"), Some(ServiceType::Servicios));
        assert_eq!(detect_service("sepelio"), Some(ServiceType::Servicios));
        assert_eq!(detect_service("energia electrica"), Some(ServiceType::Electricidad));
        assert_eq!(detect_service("servicio de luz"), Some(ServiceType::Electricidad));
        assert_eq!(detect_service("hola"), None);
    }

    #[test]
    fn bare_number_with_month_is_low_but_corroborated() {
        let request = detect("2862 marzo").unwrap();
        assert_eq!(request.confidence, Confidence::Low);
        assert!(request.is_corroborated());
    }

    #[test]
    fn no_number_no_request() {
        assert_eq!(detect("quiero mi factura"), None);
        assert_eq!(detect("12345"), None);
    }

    #[test]
    fn inferred_year_fills_only_missing_year() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let request = detect("factura 2862 noviembre").unwrap().with_inferred_year(today);
        assert_eq!(request.year, Some(2025));

        let request = detect("factura 2862 noviembre 2023")
            .unwrap()
            .with_inferred_year(today);
        assert_eq!(request.year, Some(2023));

        let request = detect("factura 2862").unwrap().with_inferred_year(today);
        assert_eq!(request.year, None);
    }

    #[test]
    fn query_carries_every_field() {
        let query = detect("boleta de agua 2862 marzo 2025").unwrap().to_query();
        assert_eq!(query.account_number, "2862");
        assert_eq!(query.month, Some(BillingMonth::Marzo));
        assert_eq!(query.year, Some(2025));
        assert_eq!(query.service, Some(ServiceType::Servicios));
    }

    proptest! {
        #[test]
        fn vocabulary_lifts_confidence(n in 100u32..10000) {
            let request = detect(&format!("factura {n}")).unwrap();
            prop_assert_eq!(request.account_number, n.to_string());
            prop_assert!(request.confidence >= Confidence::Medium);
        }

        #[test]
        fn bare_number_is_low(n in 100u32..10000) {
            let request = detect(&n.to_string()).unwrap();
            prop_assert_eq!(request.confidence, Confidence::Low);
        }

        #[test]
        fn legacy_format_never_extracted(a in 1u32..1000, b in 100u32..100000, c in "[a-z]") {
            let text = format!("{a}-{b}-{c}");
            prop_assert!(detect(&text).is_none());
        }
    }
}
