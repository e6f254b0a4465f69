//! Conferences and single-use access codes

use super::{
    new_id, parse_datetime, random_code, timestamp, AccessCode, Conference, Conflict, Database,
    DbError, DbResult, UserId,
};
use chrono::{Duration, Utc};
use rusqlite::{params, Connection as SqlConnection, OptionalExtension, Row};

const CONFERENCE_CODE_LEN: usize = 6;
const ACCESS_CODE_LEN: usize = 8;
const MAX_CODE_ATTEMPTS: usize = 5;

const CONFERENCE_COLUMNS: &str = "id, name, code, is_public, is_active, created_by, created_at";

impl Database {
    /// Create a conference with a fresh 6-character join code
    pub fn create_conference(
        &self,
        name: &str,
        created_by: UserId,
        is_public: bool,
    ) -> DbResult<Conference> {
        let conn = self.conn()?;
        let id = new_id();
        let created_at = timestamp(&Utc::now());

        let mut attempt = 0;
        loop {
            let code = random_code(CONFERENCE_CODE_LEN);
            match conn.execute(
                "INSERT INTO conferences (id, name, code, is_public, is_active, created_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)",
                params![id, name, code, is_public, created_by, created_at],
            ) {
                Ok(_) => break,
                Err(e) if super::is_unique_violation(&e) && attempt + 1 < MAX_CODE_ATTEMPTS => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        load_conference(&conn, &id)
    }

    pub fn get_conference(&self, id: &str) -> DbResult<Conference> {
        let conn = self.conn()?;
        load_conference(&conn, id)
    }

    #[allow(dead_code)] // Used in tests
    pub fn get_conference_by_code(&self, code: &str) -> DbResult<Conference> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {CONFERENCE_COLUMNS} FROM conferences WHERE code = ?1"),
            params![code],
            parse_conference_row,
        )
        .optional()?
        .ok_or_else(|| DbError::not_found("conference", code))
    }

    /// All conferences, newest first
    pub fn list_conferences(&self) -> DbResult<Vec<Conference>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONFERENCE_COLUMNS} FROM conferences ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], parse_conference_row)?;
        super::collect_rows(rows)
    }

    /// Public conferences, optionally restricted to active ones
    pub fn list_public_conferences(&self, only_active: bool) -> DbResult<Vec<Conference>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONFERENCE_COLUMNS} FROM conferences
             WHERE is_public = 1 AND (is_active = 1 OR ?1 = 0)
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map(params![only_active], parse_conference_row)?;
        super::collect_rows(rows)
    }

    pub fn rename_conference(&self, id: &str, name: &str) -> DbResult<Conference> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE conferences SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
        if updated == 0 {
            return Err(DbError::not_found("conference", id));
        }
        load_conference(&conn, id)
    }

    pub fn set_conference_active(&self, id: &str, active: bool) -> DbResult<Conference> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE conferences SET is_active = ?1 WHERE id = ?2",
            params![active, id],
        )?;
        if updated == 0 {
            return Err(DbError::not_found("conference", id));
        }
        load_conference(&conn, id)
    }

    /// Delete a conference, detaching its members. Access codes cascade.
    pub fn delete_conference(&self, id: &str) -> DbResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE profiles SET conference_id = NULL WHERE conference_id = ?1",
            params![id],
        )?;
        let deleted = tx.execute("DELETE FROM conferences WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DbError::not_found("conference", id));
        }
        tx.commit()?;
        Ok(())
    }

    /// Join a conference from the public picker. Private conferences are
    /// only reachable through [`Database::redeem_access_code`].
    pub fn join_conference(&self, user_id: UserId, conference_id: &str) -> DbResult<Conference> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let conference = load_conference(&tx, conference_id)?;
        if !conference.is_public {
            return Err(Conflict::ConferencePrivate.into());
        }
        if !conference.is_active {
            return Err(Conflict::ConferenceInactive.into());
        }
        attach_member(&tx, user_id, conference_id)?;
        tx.commit()?;
        Ok(conference)
    }

    // ==================== Access Codes ====================

    pub fn create_access_code(
        &self,
        conference_id: &str,
        created_by: UserId,
        ttl: Duration,
    ) -> DbResult<AccessCode> {
        let conn = self.conn()?;
        // Fail early with NotFound rather than a foreign key error
        load_conference(&conn, conference_id)?;

        let now = Utc::now();
        let expires_at = timestamp(&(now + ttl));
        let created_at = timestamp(&now);

        let mut attempt = 0;
        let code = loop {
            let code = random_code(ACCESS_CODE_LEN);
            match conn.execute(
                "INSERT INTO access_codes (code, conference_id, created_by, expires_at, used, created_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5)",
                params![code, conference_id, created_by, expires_at, created_at],
            ) {
                Ok(_) => break code,
                Err(e) if super::is_unique_violation(&e) && attempt + 1 < MAX_CODE_ATTEMPTS => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        conn.query_row(
            "SELECT code, conference_id, created_by, expires_at, used, used_by, created_at
             FROM access_codes WHERE code = ?1",
            params![code],
            parse_access_code_row,
        )
        .map_err(DbError::from)
    }

    /// Redeem an access code for the conference with the given join code.
    ///
    /// The unused-and-unexpired check and the write are one statement, so a
    /// code is consumed at most once even under concurrent redemption.
    pub fn redeem_access_code(
        &self,
        user_id: UserId,
        conference_code: &str,
        access_code: &str,
    ) -> DbResult<Conference> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let conference = tx
            .query_row(
                &format!("SELECT {CONFERENCE_COLUMNS} FROM conferences WHERE code = ?1"),
                params![conference_code],
                parse_conference_row,
            )
            .optional()?
            .ok_or_else(|| DbError::not_found("conference", conference_code))?;
        if !conference.is_active {
            return Err(Conflict::ConferenceInactive.into());
        }

        let claimed = tx.execute(
            "UPDATE access_codes SET used = 1, used_by = ?1
             WHERE code = ?2 AND conference_id = ?3 AND used = 0 AND expires_at > ?4",
            params![user_id, access_code, conference.id, timestamp(&Utc::now())],
        )?;
        if claimed == 0 {
            return Err(Conflict::AccessCodeUnavailable.into());
        }

        attach_member(&tx, user_id, &conference.id)?;
        tx.commit()?;
        Ok(conference)
    }

    #[allow(dead_code)] // Used in tests
    pub fn get_access_code(&self, code: &str) -> DbResult<AccessCode> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT code, conference_id, created_by, expires_at, used, used_by, created_at
             FROM access_codes WHERE code = ?1",
            params![code],
            parse_access_code_row,
        )
        .optional()?
        .ok_or_else(|| DbError::not_found("access code", code))
    }
}

fn attach_member(conn: &SqlConnection, user_id: UserId, conference_id: &str) -> DbResult<()> {
    let updated = conn.execute(
        "UPDATE profiles SET conference_id = ?1 WHERE user_id = ?2",
        params![conference_id, user_id],
    )?;
    if updated == 0 {
        return Err(DbError::not_found("profile", user_id.to_string()));
    }
    Ok(())
}

fn load_conference(conn: &SqlConnection, id: &str) -> DbResult<Conference> {
    conn.query_row(
        &format!("SELECT {CONFERENCE_COLUMNS} FROM conferences WHERE id = ?1"),
        params![id],
        parse_conference_row,
    )
    .optional()?
    .ok_or_else(|| DbError::not_found("conference", id))
}

fn parse_conference_row(row: &Row<'_>) -> rusqlite::Result<Conference> {
    Ok(Conference {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        is_public: row.get(3)?,
        is_active: row.get(4)?,
        created_by: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn parse_access_code_row(row: &Row<'_>) -> rusqlite::Result<AccessCode> {
    Ok(AccessCode {
        code: row.get(0)?,
        conference_id: row.get(1)?,
        created_by: row.get(2)?,
        expires_at: parse_datetime(&row.get::<_, String>(3)?),
        used: row.get(4)?,
        used_by: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}
