// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation lookup keyed by normalized phone.

use rusqlite::{OptionalExtension, params};
use socio_core::SocioError;

use crate::database::Database;

/// Returns the conversation id for `phone`, inserting a row with `new_id` on first contact.
///
/// `INSERT OR IGNORE` on the unique phone column makes concurrent first
/// contacts converge on a single row.
pub async fn get_or_create(
    db: &Database,
    phone: &str,
    new_id: String,
    created_at: String,
) -> Result<String, SocioError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO conversations (id, phone, created_at) VALUES (?1, ?2, ?3)",
                params![new_id, phone, created_at],
            )?;
            let id: String = conn.query_row(
                "SELECT id FROM conversations WHERE phone = ?1",
                params![phone],
                |row| row.get(0),
            )?;
            Ok(id)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Looks a conversation up without creating it.
pub async fn find_by_phone(db: &Database, phone: &str) -> Result<Option<String>, SocioError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id FROM conversations WHERE phone = ?1",
                params![phone],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
