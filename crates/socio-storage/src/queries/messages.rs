// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation turn inserts with bounded retention.

use std::str::FromStr;

use rusqlite::params;
use socio_core::SocioError;
use socio_core::types::{Role, StoredMessage};

use crate::database::Database;

/// A turn about to be written.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    pub provider_message_id: Option<String>,
    pub created_at: String,
}

/// Inserts a turn, then evicts everything but the newest `retain` turns of
/// that conversation. Both statements run in one transaction.
pub async fn insert_message(
    db: &Database,
    msg: NewMessage,
    retain: usize,
) -> Result<(), SocioError> {
    let retain = i64::try_from(retain).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO messages (conversation_id, role, content, provider_message_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    msg.conversation_id,
                    msg.role.to_string(),
                    msg.content,
                    msg.provider_message_id,
                    msg.created_at,
                ],
            )?;
            tx.execute(
                "DELETE FROM messages
                 WHERE conversation_id = ?1
                   AND id NOT IN (
                       SELECT id FROM messages WHERE conversation_id = ?1
                       ORDER BY id DESC LIMIT ?2
                   )",
                params![msg.conversation_id, retain],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The newest `limit` turns of a conversation, oldest first.
pub async fn recent_messages(
    db: &Database,
    conversation_id: &str,
    limit: usize,
) -> Result<Vec<StoredMessage>, SocioError> {
    let conversation_id = conversation_id.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, role, content, provider_message_id, created_at
                 FROM (
                     SELECT * FROM messages WHERE conversation_id = ?1
                     ORDER BY id DESC LIMIT ?2
                 )
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![conversation_id, limit], |row| {
                let role: String = row.get(2)?;
                let role = Role::from_str(&role).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(StoredMessage {
                    id: row.get(0)?,
                    conversation_id: row.get(1)?,
                    role,
                    content: row.get(3)?,
                    provider_message_id: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of turns stored for a conversation.
pub async fn count_messages(db: &Database, conversation_id: &str) -> Result<usize, SocioError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
                params![conversation_id],
                |row| row.get(0),
            )?;
            Ok(usize::try_from(count).unwrap_or(0))
        })
        .await
        .map_err(crate::database::map_tr_err)
}
