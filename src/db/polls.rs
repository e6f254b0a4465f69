//! Poll ledger storage
//!
//! Options live in their own table keyed by position; each voter has at most
//! one row in `poll_votes` per poll, enforced by the primary key.

use super::{
    new_id, parse_datetime, timestamp, Conflict, Database, DbError, DbResult, Poll, PollOption,
    UserId,
};
use chrono::Utc;
use rusqlite::{params, Connection as SqlConnection, OptionalExtension};

impl Database {
    pub fn create_poll(
        &self,
        question: &str,
        options: &[String],
        conference_id: &str,
        created_by: UserId,
    ) -> DbResult<Poll> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = new_id();

        tx.execute(
            "INSERT INTO polls (id, question, conference_id, created_by, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            params![id, question, conference_id, created_by, timestamp(&Utc::now())],
        )?;
        for (position, text) in options.iter().enumerate() {
            tx.execute(
                "INSERT INTO poll_options (poll_id, position, text, votes) VALUES (?1, ?2, ?3, 0)",
                params![id, position_param(position), text],
            )?;
        }

        let poll = load_poll(&tx, &id)?;
        tx.commit()?;
        Ok(poll)
    }

    pub fn get_poll(&self, poll_id: &str) -> DbResult<Poll> {
        let conn = self.conn()?;
        load_poll(&conn, poll_id)
    }

    /// Polls of a conference, newest first
    pub fn list_polls(&self, conference_id: &str, only_active: bool) -> DbResult<Vec<Poll>> {
        let conn = self.conn()?;
        let ids: Vec<String> = {
            let mut stmt = conn.prepare(
                "SELECT id FROM polls
                 WHERE conference_id = ?1 AND (is_active = 1 OR ?2 = 0)
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt.query_map(params![conference_id, only_active], |row| row.get(0))?;
            super::collect_rows(rows)?
        };
        ids.iter().map(|id| load_poll(&conn, id)).collect()
    }

    /// Record one vote. The whole check-and-count runs in one transaction and
    /// the `(poll_id, voter_id)` key makes a second vote impossible.
    pub fn cast_vote(&self, poll_id: &str, position: usize, voter: UserId) -> DbResult<Poll> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let is_active: bool = tx
            .query_row(
                "SELECT is_active FROM polls WHERE id = ?1",
                params![poll_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| DbError::not_found("poll", poll_id))?;
        if !is_active {
            return Err(Conflict::PollInactive.into());
        }

        let option_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM poll_options WHERE poll_id = ?1 AND position = ?2)",
            params![poll_id, position_param(position)],
            |row| row.get(0),
        )?;
        if !option_exists {
            return Err(DbError::OptionOutOfRange { index: position });
        }

        let inserted = tx.execute(
            "INSERT INTO poll_votes (poll_id, voter_id, position, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(poll_id, voter_id) DO NOTHING",
            params![poll_id, voter, position_param(position), timestamp(&Utc::now())],
        )?;
        if inserted == 0 {
            return Err(Conflict::AlreadyVoted.into());
        }

        tx.execute(
            "UPDATE poll_options SET votes = votes + 1 WHERE poll_id = ?1 AND position = ?2",
            params![poll_id, position_param(position)],
        )?;

        let poll = load_poll(&tx, poll_id)?;
        tx.commit()?;
        Ok(poll)
    }

    pub fn set_poll_question(&self, poll_id: &str, question: &str) -> DbResult<Poll> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE polls SET question = ?1 WHERE id = ?2",
            params![question, poll_id],
        )?;
        if updated == 0 {
            return Err(DbError::not_found("poll", poll_id));
        }
        load_poll(&conn, poll_id)
    }

    /// Rename an option in place. Votes stay attached to the position.
    pub fn set_poll_option_text(
        &self,
        poll_id: &str,
        position: usize,
        text: &str,
    ) -> DbResult<Poll> {
        let conn = self.conn()?;
        load_poll(&conn, poll_id)?;
        let updated = conn.execute(
            "UPDATE poll_options SET text = ?1 WHERE poll_id = ?2 AND position = ?3",
            params![text, poll_id, position_param(position)],
        )?;
        if updated == 0 {
            return Err(DbError::OptionOutOfRange { index: position });
        }
        load_poll(&conn, poll_id)
    }

    /// Append an option after the existing ones
    pub fn add_poll_option(&self, poll_id: &str, text: &str) -> DbResult<Poll> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        load_poll(&tx, poll_id)?;
        tx.execute(
            "INSERT INTO poll_options (poll_id, position, text, votes)
             SELECT ?1, COALESCE(MAX(position) + 1, 0), ?2, 0 FROM poll_options WHERE poll_id = ?1",
            params![poll_id, text],
        )?;
        let poll = load_poll(&tx, poll_id)?;
        tx.commit()?;
        Ok(poll)
    }

    pub fn set_poll_active(&self, poll_id: &str, active: bool) -> DbResult<Poll> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE polls SET is_active = ?1 WHERE id = ?2",
            params![active, poll_id],
        )?;
        if updated == 0 {
            return Err(DbError::not_found("poll", poll_id));
        }
        load_poll(&conn, poll_id)
    }

    /// Delete a poll with its options and votes
    pub fn delete_poll(&self, poll_id: &str) -> DbResult<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM polls WHERE id = ?1", params![poll_id])?;
        if deleted == 0 {
            return Err(DbError::not_found("poll", poll_id));
        }
        Ok(())
    }
}

fn position_param(position: usize) -> i64 {
    i64::try_from(position).unwrap_or(i64::MAX)
}

fn load_poll(conn: &SqlConnection, poll_id: &str) -> DbResult<Poll> {
    let header = conn
        .query_row(
            "SELECT id, question, conference_id, created_by, is_active, created_at
             FROM polls WHERE id = ?1",
            params![poll_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, UserId>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?
        .ok_or_else(|| DbError::not_found("poll", poll_id))?;
    let (id, question, conference_id, created_by, is_active, created_at) = header;

    let mut options: Vec<PollOption> = {
        let mut stmt = conn.prepare(
            "SELECT text, votes FROM poll_options WHERE poll_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt.query_map(params![poll_id], |row| {
            Ok(PollOption {
                text: row.get(0)?,
                votes: row.get(1)?,
                voters: Vec::new(),
            })
        })?;
        super::collect_rows(rows)?
    };

    let mut stmt = conn.prepare(
        "SELECT position, voter_id FROM poll_votes WHERE poll_id = ?1 ORDER BY created_at ASC",
    )?;
    let votes = stmt.query_map(params![poll_id], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, UserId>(1)?))
    })?;
    for vote in votes {
        let (position, voter) = vote?;
        if let Some(option) = usize::try_from(position)
            .ok()
            .and_then(|p| options.get_mut(p))
        {
            option.voters.push(voter);
        }
    }

    Ok(Poll {
        id,
        question,
        options,
        conference_id,
        created_by,
        is_active,
        created_at: parse_datetime(&created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll_with(db: &Database, options: &[&str]) -> Poll {
        let options: Vec<String> = options.iter().map(ToString::to_string).collect();
        db.create_poll("Best talk?", &options, "conf", 100).unwrap()
    }

    #[test]
    fn test_second_vote_rejected() {
        let db = Database::open_in_memory().unwrap();
        let poll = poll_with(&db, &["A", "B"]);

        let after = db.cast_vote(&poll.id, 0, 1).unwrap();
        let counts: Vec<_> = after.options.iter().map(|o| o.votes).collect();
        assert_eq!(counts, vec![1, 0]);
        assert_eq!(after.options[0].voters, vec![1]);

        let err = db.cast_vote(&poll.id, 1, 1).unwrap_err();
        assert!(matches!(err, DbError::Conflict(Conflict::AlreadyVoted)));

        let counts: Vec<_> = db
            .get_poll(&poll.id)
            .unwrap()
            .options
            .iter()
            .map(|o| o.votes)
            .collect();
        assert_eq!(counts, vec![1, 0]);
    }

    #[test]
    fn test_vote_on_inactive_poll() {
        let db = Database::open_in_memory().unwrap();
        let poll = poll_with(&db, &["A", "B"]);
        db.set_poll_active(&poll.id, false).unwrap();

        let err = db.cast_vote(&poll.id, 0, 1).unwrap_err();
        assert!(matches!(err, DbError::Conflict(Conflict::PollInactive)));
        assert_eq!(db.get_poll(&poll.id).unwrap().total_votes(), 0);
    }

    #[test]
    fn test_vote_out_of_range() {
        let db = Database::open_in_memory().unwrap();
        let poll = poll_with(&db, &["A", "B"]);

        let err = db.cast_vote(&poll.id, 2, 1).unwrap_err();
        assert!(matches!(err, DbError::OptionOutOfRange { index: 2 }));

        // The failed attempt did not consume the voter's ballot
        db.cast_vote(&poll.id, 1, 1).unwrap();
    }

    #[test]
    fn test_vote_unknown_poll() {
        let db = Database::open_in_memory().unwrap();
        let err = db.cast_vote("missing", 0, 1).unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity: "poll", .. }));
    }

    #[test]
    fn test_edit_keeps_votes_attached() {
        let db = Database::open_in_memory().unwrap();
        let poll = poll_with(&db, &["A", "B"]);
        db.cast_vote(&poll.id, 1, 7).unwrap();

        db.set_poll_option_text(&poll.id, 1, "Bee").unwrap();
        let poll = db.add_poll_option(&poll.id, "C").unwrap();

        assert_eq!(poll.options.len(), 3);
        assert_eq!(poll.options[1].text, "Bee");
        assert_eq!(poll.options[1].votes, 1);
        assert_eq!(poll.options[1].voters, vec![7]);
        assert_eq!(poll.options[2].text, "C");
        assert!(poll.has_voted(7));

        let err = db.set_poll_option_text(&poll.id, 9, "Z").unwrap_err();
        assert!(matches!(err, DbError::OptionOutOfRange { index: 9 }));
    }

    #[test]
    fn test_delete_poll_cascades() {
        let db = Database::open_in_memory().unwrap();
        let poll = poll_with(&db, &["A", "B"]);
        db.cast_vote(&poll.id, 0, 1).unwrap();

        db.delete_poll(&poll.id).unwrap();
        assert!(matches!(
            db.get_poll(&poll.id).unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert!(db.list_polls("conf", false).unwrap().is_empty());
    }

    #[test]
    fn test_list_active_polls_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let first = poll_with(&db, &["A", "B"]);
        let second = poll_with(&db, &["C", "D"]);
        let closed = poll_with(&db, &["E", "F"]);
        db.set_poll_active(&closed.id, false).unwrap();

        let ids: Vec<_> = db
            .list_polls("conf", true)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(db.list_polls("conf", false).unwrap().len(), 3);
    }

    #[test]
    fn test_concurrent_votes_counted_once() {
        let db = Database::open_in_memory().unwrap();
        let poll = poll_with(&db, &["A", "B"]);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = db.clone();
                let poll_id = poll.id.clone();
                std::thread::spawn(move || db.cast_vote(&poll_id, i % 2, 42))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(db.get_poll(&poll.id).unwrap().total_votes(), 1);
    }
}
