//! Connection ledger storage: one record per unordered pair of users

use super::{
    new_id, pair_key, parse_datetime, timestamp, ChatMessage, Conflict, Connection,
    ConnectionStatus, Database, DbError, DbResult, Decision, LastMessage, UserId,
};
use chrono::Utc;
use rusqlite::{params, Connection as SqlConnection, OptionalExtension, Row};
use std::collections::HashSet;

const CONNECTION_COLUMNS: &str = "id, requester, addressee, status, conference_id, \
     last_message_text, last_message_sender, last_message_at, unread_count, created_at";

impl Database {
    /// Record a pending request from `requester` to `addressee`.
    ///
    /// Fails with `AlreadyConnected` if the pair already has a record in any
    /// status, regardless of direction.
    pub fn insert_pending_connection(
        &self,
        requester: UserId,
        addressee: UserId,
        conference_id: Option<&str>,
    ) -> DbResult<Connection> {
        let conn = self.conn()?;
        let (low, high) = pair_key(requester, addressee);
        let id = new_id();

        let inserted = conn.execute(
            "INSERT INTO connections (id, requester, addressee, user_low, user_high, status, conference_id, unread_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6, 0, ?7)
             ON CONFLICT(user_low, user_high) DO NOTHING",
            params![
                id,
                requester,
                addressee,
                low,
                high,
                conference_id,
                timestamp(&Utc::now())
            ],
        )?;

        if inserted == 0 {
            let existing = find_pair(&conn, requester, addressee)?
                .ok_or_else(|| DbError::not_found("connection", format!("{low}:{high}")))?;
            return Err(Conflict::AlreadyConnected {
                status: existing.status,
            }
            .into());
        }

        load_connection(&conn, &id)
    }

    /// Move a pending connection to accepted or rejected.
    ///
    /// Only the addressee may respond. The status check and the write are a
    /// single compare-and-set statement.
    pub fn respond_to_connection(
        &self,
        connection_id: &str,
        responder: UserId,
        decision: Decision,
    ) -> DbResult<Connection> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE connections SET status = ?1
             WHERE id = ?2 AND addressee = ?3 AND status = 'pending'",
            params![decision.resulting_status().as_str(), connection_id, responder],
        )?;

        if updated == 0 {
            let existing = load_connection(&conn, connection_id)?;
            if existing.addressee != responder {
                return Err(DbError::not_found("connection", connection_id));
            }
            return Err(Conflict::InvalidStateTransition {
                from: existing.status,
            }
            .into());
        }

        load_connection(&conn, connection_id)
    }

    #[allow(dead_code)] // Used in tests
    pub fn get_connection(&self, connection_id: &str) -> DbResult<Connection> {
        let conn = self.conn()?;
        load_connection(&conn, connection_id)
    }

    pub fn find_connection(&self, a: UserId, b: UserId) -> DbResult<Option<Connection>> {
        let conn = self.conn()?;
        find_pair(&conn, a, b)
    }

    /// Connections involving `user`, newest first, optionally by status
    pub fn list_connections(
        &self,
        user: UserId,
        status: Option<ConnectionStatus>,
    ) -> DbResult<Vec<Connection>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections
             WHERE (requester = ?1 OR addressee = ?1) AND (?2 IS NULL OR status = ?2)
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map(
            params![user, status.map(ConnectionStatus::as_str)],
            parse_connection_row,
        )?;
        super::collect_rows(rows)
    }

    /// Accepted connections that carry at least one message, most recent first
    pub fn list_chats(&self, user: UserId) -> DbResult<Vec<Connection>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections
             WHERE (requester = ?1 OR addressee = ?1)
               AND status = 'accepted' AND last_message_at IS NOT NULL
             ORDER BY last_message_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map(params![user], parse_connection_row)?;
        super::collect_rows(rows)
    }

    /// Everyone `user` has a connection record with, in any status
    pub fn connected_peer_ids(&self, user: UserId) -> DbResult<HashSet<UserId>> {
        Ok(self
            .list_connections(user, None)?
            .iter()
            .filter_map(|c| c.peer_of(user))
            .collect())
    }

    /// Append a chat message between two accepted connections and update the
    /// denormalized last-message snapshot in the same transaction.
    pub fn append_message(
        &self,
        sender: UserId,
        receiver: UserId,
        text: &str,
    ) -> DbResult<(Connection, ChatMessage)> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let connection = find_pair(&tx, sender, receiver)?.ok_or(Conflict::NotConnected)?;
        if connection.status != ConnectionStatus::Accepted {
            return Err(Conflict::NotConnected.into());
        }

        let now = Utc::now();
        let message = ChatMessage {
            id: new_id(),
            connection_id: connection.id.clone(),
            sender,
            receiver,
            text: text.to_string(),
            created_at: now,
        };
        tx.execute(
            "INSERT INTO messages (id, connection_id, sender, receiver, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                message.id,
                message.connection_id,
                sender,
                receiver,
                text,
                timestamp(&now)
            ],
        )?;
        tx.execute(
            "UPDATE connections SET
                last_message_text = ?1,
                last_message_sender = ?2,
                last_message_at = ?3,
                unread_count = unread_count + 1
             WHERE id = ?4",
            params![text, sender, timestamp(&now), connection.id],
        )?;

        let updated = load_connection(&tx, &connection.id)?;
        tx.commit()?;
        Ok((updated, message))
    }

    /// Clear the unread counter when `reader` opens the chat, unless the
    /// latest message is their own.
    pub fn mark_chat_read(&self, connection_id: &str, reader: UserId) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE connections SET unread_count = 0
             WHERE id = ?1 AND last_message_sender IS NOT NULL AND last_message_sender != ?2",
            params![connection_id, reader],
        )?;
        Ok(())
    }

    /// Most recent messages of a chat, oldest first
    pub fn recent_messages(&self, connection_id: &str, limit: usize) -> DbResult<Vec<ChatMessage>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, connection_id, sender, receiver, text, created_at FROM messages
             WHERE connection_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![connection_id, limit], |row| {
            Ok(ChatMessage {
                id: row.get(0)?,
                connection_id: row.get(1)?,
                sender: row.get(2)?,
                receiver: row.get(3)?,
                text: row.get(4)?,
                created_at: parse_datetime(&row.get::<_, String>(5)?),
            })
        })?;
        let mut messages = super::collect_rows(rows)?;
        messages.reverse();
        Ok(messages)
    }
}

fn find_pair(conn: &SqlConnection, a: UserId, b: UserId) -> DbResult<Option<Connection>> {
    let (low, high) = pair_key(a, b);
    Ok(conn
        .query_row(
            &format!(
                "SELECT {CONNECTION_COLUMNS} FROM connections WHERE user_low = ?1 AND user_high = ?2"
            ),
            params![low, high],
            parse_connection_row,
        )
        .optional()?)
}

fn load_connection(conn: &SqlConnection, id: &str) -> DbResult<Connection> {
    conn.query_row(
        &format!("SELECT {CONNECTION_COLUMNS} FROM connections WHERE id = ?1"),
        params![id],
        parse_connection_row,
    )
    .optional()?
    .ok_or_else(|| DbError::not_found("connection", id))
}

fn parse_connection_row(row: &Row<'_>) -> rusqlite::Result<Connection> {
    let status: String = row.get(3)?;
    let status = ConnectionStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown connection status: {status}").into(),
        )
    })?;

    let last_text: Option<String> = row.get(5)?;
    let last_sender: Option<UserId> = row.get(6)?;
    let last_at: Option<String> = row.get(7)?;
    let last_message = match (last_text, last_sender, last_at) {
        (Some(text), Some(sender), Some(at)) => Some(LastMessage {
            text,
            sender,
            timestamp: parse_datetime(&at),
        }),
        _ => None,
    };

    Ok(Connection {
        id: row.get(0)?,
        requester: row.get(1)?,
        addressee: row.get(2)?,
        status,
        conference_id: row.get(4)?,
        last_message,
        unread_count: row.get(8)?,
        created_at: parse_datetime(&row.get::<_, String>(9)?),
    })
}
