// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wall-clock access for year inference and monthly ledger periods.

use chrono::{NaiveDate, NaiveDateTime};

/// Source of local wall-clock time.
pub trait Clock: Send + Sync + 'static {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// `YYYY-MM` of the current month, the ledger's counting period.
    fn year_month(&self) -> String {
        self.now().format("%Y-%m").to_string()
    }

    /// Timestamp string stored with ledger and conversation rows.
    fn timestamp(&self) -> String {
        self.now().format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// The process's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Midday on the given date; `None` for an invalid date.
    pub fn on(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .map(FixedClock)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
