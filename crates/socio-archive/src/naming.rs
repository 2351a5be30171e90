// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reads billing metadata out of archive file names.
//!
//! Files are named with loose tokens separated by anything that is not a
//! letter or digit, in any order:
//! `electricidad_2862_noviembre_2025.pdf`, `2862-servicios-11-2025.pdf`.

use std::str::FromStr;

use socio_core::types::{BillingMonth, InvoiceQuery, ServiceType};

/// What a file name says about the document it holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameTokens {
    /// Every 3-4 digit token; one of them is the account number.
    pub numbers: Vec<String>,
    pub month: Option<BillingMonth>,
    pub year: Option<i32>,
    pub service: Option<ServiceType>,
}

impl NameTokens {
    /// Parses a file stem (no extension).
    pub fn parse(stem: &str) -> Self {
        let lower = stem.to_lowercase();
        let mut tokens = NameTokens::default();
        for token in lower.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let all_digits = token.chars().all(|c| c.is_ascii_digit());
            if all_digits && token.len() == 2 {
                if tokens.month.is_none() {
                    tokens.month = token.parse().ok().and_then(BillingMonth::from_number);
                }
            } else if all_digits && token.len() == 4 && token.starts_with("20") {
                // A 20xx token is a year unless a year was already seen.
                match tokens.year {
                    None => tokens.year = token.parse().ok(),
                    Some(_) => tokens.numbers.push(token.to_string()),
                }
            } else if all_digits && (3..=4).contains(&token.len()) {
                tokens.numbers.push(token.to_string());
            } else if let Ok(month) = BillingMonth::from_str(token) {
                tokens.month.get_or_insert(month);
            } else if let Some(service) = service_token(token) {
                tokens.service.get_or_insert(service);
            }
        }
        tokens
    }

    /// True when this file can answer `query`.
    ///
    /// The account must appear. A requested month or year must appear too.
    /// A requested service only excludes files that name a different one.
    pub fn matches(&self, query: &InvoiceQuery) -> bool {
        let account = strip_zeros(&query.account_number);
        let has_account = self.numbers.iter().any(|n| strip_zeros(n) == account)
            || self.year.is_some_and(|y| y.to_string() == account);
        has_account
            && agrees(query.month, self.month)
            && agrees(query.year, self.year)
            && query
                .service
                .is_none_or(|wanted| self.service.is_none_or(|found| found == wanted))
    }

    /// Ordering key: later billing periods first.
    pub fn period(&self) -> (i32, u32) {
        (
            self.year.unwrap_or(0),
            self.month.map(BillingMonth::number).unwrap_or(0),
        )
    }
}

fn agrees<T: PartialEq>(wanted: Option<T>, found: Option<T>) -> bool {
    match (wanted, found) {
        (Some(w), Some(f)) => w == f,
        (Some(_), None) => false,
        (None, _) => true,
    }
}

fn strip_zeros(number: &str) -> &str {
    let trimmed = number.trim_start_matches('0');
    if trimmed.is_empty() { "0" } else { trimmed }
}

fn service_token(token: &str) -> Option<ServiceType> {
    match token {
        "electricidad" | "luz" | "energia" | "electrica" => Some(ServiceType::Electricidad),
        "servicios" | "servicio" | "agua" | "sepelio" | "internet" | "cloacas" => {
            Some(ServiceType::Servicios)
        }
        _ => None,
    }
}
