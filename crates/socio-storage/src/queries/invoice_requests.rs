// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invoice delivery ledger.

use rusqlite::params;
use socio_core::SocioError;
use socio_core::types::InvoiceRequestRecord;

use crate::database::Database;

/// Appends one delivery row.
pub async fn insert(db: &Database, record: &InvoiceRequestRecord) -> Result<(), SocioError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO invoice_requests (phone, account_number, file_name, month, year, requested_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.phone,
                    record.account_number,
                    record.file_name,
                    record.month.map(|m| m.to_string()),
                    record.year,
                    record.requested_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Deliveries to `phone` whose timestamp starts with `year_month` (e.g. "2025-03").
pub async fn monthly_count(
    db: &Database,
    phone: &str,
    year_month: &str,
) -> Result<u32, SocioError> {
    let phone = phone.to_string();
    let prefix = format!("{year_month}%");
    db.connection()
        .call(move |conn| {
            let count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM invoice_requests WHERE phone = ?1 AND requested_at LIKE ?2",
                params![phone, prefix],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
