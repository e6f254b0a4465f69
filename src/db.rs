//! Database module
//!
//! Provides persistence for profiles, conferences, and the ledgers. Every
//! check-then-write that guards a ledger invariant runs inside a single
//! transaction on the shared connection, backed by a uniqueness constraint.

mod conferences;
mod connections;
mod polls;
mod questions;
mod schema;

pub use questions::NewQuestion;
pub use schema::*;

use chrono::{DateTime, SecondsFormat, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::{params, Connection as SqlConnection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Database lock poisoned")]
    LockPoisoned,
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Poll has no option {index}")]
    OptionOutOfRange { index: usize },
    #[error(transparent)]
    Conflict(#[from] Conflict),
}

impl DbError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Ledger rule violations. None of these leave a partial write behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    #[error("Already voted in this poll")]
    AlreadyVoted,
    #[error("Poll is not active")]
    PollInactive,
    #[error("A connection already exists ({status})")]
    AlreadyConnected { status: ConnectionStatus },
    #[error("Connection is {from}, not pending")]
    InvalidStateTransition { from: ConnectionStatus },
    #[error("Users are not connected")]
    NotConnected,
    #[error("Access code is invalid, used, or expired")]
    AccessCodeUnavailable,
    #[error("Conference is not active")]
    ConferenceInactive,
    #[error("Conference is private; an access code is required")]
    ConferencePrivate,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<SqlConnection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = SqlConnection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = SqlConnection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, SqlConnection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    /// Raw SQL for tests that need to break or reshape the store
    #[cfg(test)]
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    // ==================== Profile Operations ====================

    /// Create the profile on first interaction, refreshing the channel-reported
    /// names on later ones. The admin flag is only ever raised here.
    pub fn ensure_profile(&self, new: &NewProfile) -> DbResult<Profile> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO profiles (user_id, first_name, last_name, username, is_admin, created_at, seq)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, (SELECT COALESCE(MAX(seq), 0) + 1 FROM profiles))
             ON CONFLICT(user_id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                username = excluded.username,
                is_admin = profiles.is_admin OR excluded.is_admin",
            params![
                new.user_id,
                new.first_name,
                new.last_name,
                new.username,
                new.is_admin,
                timestamp(&Utc::now()),
            ],
        )?;
        load_profile(&conn, new.user_id)
    }

    pub fn get_profile(&self, user_id: UserId) -> DbResult<Profile> {
        let conn = self.conn()?;
        load_profile(&conn, user_id)
    }

    pub fn set_profile_tags(
        &self,
        user_id: UserId,
        field: TagField,
        tags: &[String],
    ) -> DbResult<()> {
        let conn = self.conn()?;
        let tags_json = serde_json::to_string(tags)?;
        // Column name comes from a closed enum, never from input
        let sql = format!(
            "UPDATE profiles SET {} = ?1 WHERE user_id = ?2",
            field.column()
        );
        let updated = conn.execute(&sql, params![tags_json, user_id])?;
        if updated == 0 {
            return Err(DbError::not_found("profile", user_id.to_string()));
        }
        Ok(())
    }

    pub fn set_profile_contact(
        &self,
        user_id: UserId,
        field: ContactField,
        value: &str,
    ) -> DbResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut contacts = load_profile(&tx, user_id)?.contacts;
        contacts.set(field, value.to_string());
        tx.execute(
            "UPDATE profiles SET contacts = ?1 WHERE user_id = ?2",
            params![serde_json::to_string(&contacts)?, user_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn set_profile_photo(&self, user_id: UserId, file_id: &str) -> DbResult<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE profiles SET photo = ?1 WHERE user_id = ?2",
            params![file_id, user_id],
        )?;
        if updated == 0 {
            return Err(DbError::not_found("profile", user_id.to_string()));
        }
        Ok(())
    }

    pub fn set_profile_conference(
        &self,
        user_id: UserId,
        conference_id: Option<&str>,
    ) -> DbResult<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE profiles SET conference_id = ?1 WHERE user_id = ?2",
            params![conference_id, user_id],
        )?;
        if updated == 0 {
            return Err(DbError::not_found("profile", user_id.to_string()));
        }
        Ok(())
    }

    /// Profiles are never deleted; deactivation hides them from discovery
    #[allow(dead_code)] // Used in tests
    pub fn set_profile_active(&self, user_id: UserId, active: bool) -> DbResult<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE profiles SET is_active = ?1 WHERE user_id = ?2",
            params![active, user_id],
        )?;
        if updated == 0 {
            return Err(DbError::not_found("profile", user_id.to_string()));
        }
        Ok(())
    }

    /// Active profiles of a conference, in discovery (insertion) order
    pub fn list_active_profiles(&self, conference_id: &str) -> DbResult<Vec<Profile>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles
             WHERE conference_id = ?1 AND is_active = 1
             ORDER BY seq ASC"
        ))?;
        let rows = stmt.query_map(params![conference_id], parse_profile_row)?;
        collect_rows(rows)
    }

    pub fn list_admins(&self, conference_id: &str) -> DbResult<Vec<Profile>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles
             WHERE conference_id = ?1 AND is_admin = 1
             ORDER BY seq ASC"
        ))?;
        let rows = stmt.query_map(params![conference_id], parse_profile_row)?;
        collect_rows(rows)
    }

    // ==================== Display Queries ====================

    pub fn conference_stats(&self, conference_id: &str) -> DbResult<ConferenceStats> {
        let conn = self.conn()?;
        let count = |sql: &str| -> DbResult<i64> {
            Ok(conn.query_row(sql, params![conference_id], |row| row.get(0))?)
        };

        Ok(ConferenceStats {
            participants: count(
                "SELECT COUNT(*) FROM profiles WHERE conference_id = ?1 AND is_active = 1",
            )?,
            connections: count(
                "SELECT COUNT(*) FROM connections WHERE conference_id = ?1 AND status = 'accepted'",
            )?,
            active_polls: count(
                "SELECT COUNT(*) FROM polls WHERE conference_id = ?1 AND is_active = 1",
            )?,
            unanswered_questions: count(
                "SELECT COUNT(*) FROM questions WHERE conference_id = ?1 AND is_answered = 0",
            )?,
        })
    }
}

const PROFILE_COLUMNS: &str = "user_id, first_name, last_name, username, photo, contacts, \
     interests, offerings, looking_for, conference_id, is_active, is_admin, created_at";

fn load_profile(conn: &SqlConnection, user_id: UserId) -> DbResult<Profile> {
    conn.query_row(
        &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"),
        params![user_id],
        parse_profile_row,
    )
    .optional()?
    .ok_or_else(|| DbError::not_found("profile", user_id.to_string()))
}

fn parse_profile_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        user_id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        username: row.get(3)?,
        photo: row.get(4)?,
        contacts: serde_json::from_str(&row.get::<_, String>(5)?).unwrap_or_default(),
        interests: parse_tags(&row.get::<_, String>(6)?),
        offerings: parse_tags(&row.get::<_, String>(7)?),
        looking_for: parse_tags(&row.get::<_, String>(8)?),
        conference_id: row.get(9)?,
        is_active: row.get(10)?,
        is_admin: row.get(11)?,
        created_at: parse_datetime(&row.get::<_, String>(12)?),
    })
}

fn parse_tags(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> DbResult<Vec<T>> {
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering
fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Uppercase alphanumeric code for conferences and access codes
fn random_code(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attendee(user_id: UserId, name: &str) -> NewProfile {
        NewProfile {
            user_id,
            first_name: name.to_string(),
            ..NewProfile::default()
        }
    }

    #[test]
    fn test_ensure_profile_creates_once() {
        let db = Database::open_in_memory().unwrap();

        let first = db.ensure_profile(&attendee(1, "Ada")).unwrap();
        assert_eq!(first.first_name, "Ada");
        assert!(first.is_active);
        assert!(!first.is_admin);
        assert!(first.interests.is_empty());

        db.set_profile_tags(1, TagField::Interests, &["rust".to_string()])
            .unwrap();

        // Second interaction refreshes names but keeps edits
        let second = db.ensure_profile(&attendee(1, "Ada L.")).unwrap();
        assert_eq!(second.first_name, "Ada L.");
        assert_eq!(second.interests, vec!["rust".to_string()]);
        assert_eq!(second.created_at, first.created_at);
    }

    #[test]
    fn test_admin_flag_is_sticky() {
        let db = Database::open_in_memory().unwrap();
        let mut new = attendee(7, "Root");
        new.is_admin = true;
        db.ensure_profile(&new).unwrap();

        new.is_admin = false;
        let profile = db.ensure_profile(&new).unwrap();
        assert!(profile.is_admin);
    }

    #[test]
    fn test_contact_edit_keeps_other_fields() {
        let db = Database::open_in_memory().unwrap();
        db.ensure_profile(&attendee(1, "Ada")).unwrap();

        db.set_profile_contact(1, ContactField::Email, "ada@example.com")
            .unwrap();
        db.set_profile_contact(1, ContactField::Phone, "+100").unwrap();

        let contacts = db.get_profile(1).unwrap().contacts;
        assert_eq!(contacts.email.as_deref(), Some("ada@example.com"));
        assert_eq!(contacts.phone.as_deref(), Some("+100"));
        assert!(contacts.telegram.is_none());
    }

    #[test]
    fn test_missing_profile_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db.set_profile_photo(99, "file").unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity: "profile", .. }));
    }

    #[test]
    fn test_active_profiles_in_discovery_order() {
        let db = Database::open_in_memory().unwrap();
        for (id, name) in [(3, "C"), (1, "A"), (2, "B")] {
            db.ensure_profile(&attendee(id, name)).unwrap();
            db.set_profile_conference(id, Some("conf")).unwrap();
        }
        db.set_profile_active(1, false).unwrap();

        let ids: Vec<_> = db
            .list_active_profiles("conf")
            .unwrap()
            .into_iter()
            .map(|p| p.user_id)
            .collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_admins_in_registration_order() {
        let db = Database::open_in_memory().unwrap();
        for id in [8, 4, 6] {
            db.ensure_profile(&NewProfile {
                user_id: id,
                first_name: format!("Admin {id}"),
                is_admin: true,
                ..NewProfile::default()
            })
            .unwrap();
            db.set_profile_conference(id, Some("conf")).unwrap();
        }
        // Refreshing names on a later event keeps the original position
        db.ensure_profile(&NewProfile {
            user_id: 8,
            first_name: "Renamed".to_string(),
            ..NewProfile::default()
        })
        .unwrap();

        let ids: Vec<_> = db
            .list_admins("conf")
            .unwrap()
            .into_iter()
            .map(|p| p.user_id)
            .collect();
        assert_eq!(ids, vec![8, 4, 6]);
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("confnet.db");

        {
            let db = Database::open(&path).unwrap();
            db.ensure_profile(&attendee(5, "Eve")).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_profile(5).unwrap().first_name, "Eve");
    }

    #[test]
    fn test_random_code_shape() {
        let code = random_code(8);
        assert_eq!(code.len(), 8);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
