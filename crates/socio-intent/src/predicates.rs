// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boolean classifiers over normalized text.
//!
//! Both predicates are keyword heuristics. They are tuned for how members
//! of the cooperative usually write and will misfire on unusual phrasing.

use std::sync::LazyLock;

use regex::Regex;

use crate::extract::{has_invoice_vocabulary, marked_account, mentions_account_number};

/// "Where / how do I find" phrasing.
static WHERE_OR_HOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(donde|como|cual es|no se|no encuentro|no lo encuentro|no tengo|busco|ubico|encuentro|figura|aparece)\b",
    )
    .unwrap()
});

/// "Account number" and its spellings.
static ACCOUNT_NUMBER_TERMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\bnumero|\bnro\.?|\bnum\.?|\bn[°º])\s*(de\s+)?(cuenta|socio|usuario|suministro)\b")
        .unwrap()
});

static ADDRESS_CONTEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(cuenta|nombre|titular)\b").unwrap());

static ADDRESS_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bb°|\b(calle|av|avda|avenida|pasaje|pje|barrio|manzana|mz|lote|casa|departamento|dpto|depto|ruta|km)\b",
    )
    .unwrap()
});

static NAME_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(a nombre de|mi nombre es|el titular es|me llamo)\b|\bsoy\s+[a-zñ]{3,}\b").unwrap()
});

/// True when the sender asks where to find their account number and has not given one.
pub fn is_account_question(normalized: &str) -> bool {
    WHERE_OR_HOW.is_match(normalized)
        && ACCOUNT_NUMBER_TERMS.is_match(normalized)
        && !mentions_account_number(normalized)
}

/// True when the sender gave an address or a holder's name instead of an account number.
///
/// A name phrase only counts when no account number appears at all: names
/// carry no digits, so a number next to one is the account. Addresses do
/// carry street numbers, so they are only cleared by an explicit marker.
pub fn is_address_or_name(normalized: &str) -> bool {
    let in_context = has_invoice_vocabulary(normalized) || ADDRESS_CONTEXT.is_match(normalized);
    let names_holder = NAME_PHRASE.is_match(normalized) && !mentions_account_number(normalized);
    let offers_substitute = ADDRESS_KEYWORD.is_match(normalized) || names_holder;
    in_context && offers_substitute && marked_account(normalized).is_none()
}
