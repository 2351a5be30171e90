// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Year inference for a billing month given without a year.

use chrono::{Datelike, NaiveDate};
use socio_core::BillingMonth;

/// Year a customer most likely means when naming `month` on `today`.
///
/// A month later than the current one can only refer to last year. January
/// is called out for November and December, the usual late-arriving bills.
pub fn infer_year(month: BillingMonth, today: NaiveDate) -> i32 {
    let current_month = today.month();
    let current_year = today.year();
    let requested = month.number();

    if current_month == 1 && (requested == 11 || requested == 12) {
        current_year - 1
    } else if requested > current_month {
        current_year - 1
    } else {
        current_year
    }
}
