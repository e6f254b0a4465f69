//! Speaker questions

use super::{new_id, parse_datetime, timestamp, Database, DbError, DbResult, Question, UserId};
use chrono::Utc;
use rusqlite::{params, Connection as SqlConnection, OptionalExtension, Row};

const QUESTION_COLUMNS: &str = "id, speaker, text, asked_by, asked_by_name, answer, \
     answered_by, is_answered, conference_id, created_at";

/// Fields of a newly asked question
#[derive(Debug, Clone)]
pub struct NewQuestion<'a> {
    pub speaker: &'a str,
    pub text: &'a str,
    pub asked_by: UserId,
    pub asked_by_name: &'a str,
    pub conference_id: Option<&'a str>,
}

impl Database {
    pub fn create_question(&self, new: &NewQuestion<'_>) -> DbResult<Question> {
        let conn = self.conn()?;
        let id = new_id();
        conn.execute(
            "INSERT INTO questions (id, speaker, text, asked_by, asked_by_name, is_answered, conference_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7)",
            params![
                id,
                new.speaker,
                new.text,
                new.asked_by,
                new.asked_by_name,
                new.conference_id,
                timestamp(&Utc::now())
            ],
        )?;
        load_question(&conn, &id)
    }

    pub fn get_question(&self, id: &str) -> DbResult<Question> {
        let conn = self.conn()?;
        load_question(&conn, id)
    }

    /// Record the answer; answering again overwrites the previous one
    pub fn answer_question(
        &self,
        id: &str,
        answer: &str,
        answered_by: UserId,
    ) -> DbResult<Question> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE questions SET answer = ?1, answered_by = ?2, is_answered = 1 WHERE id = ?3",
            params![answer, answered_by, id],
        )?;
        if updated == 0 {
            return Err(DbError::not_found("question", id));
        }
        load_question(&conn, id)
    }

    pub fn delete_question(&self, id: &str) -> DbResult<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM questions WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DbError::not_found("question", id));
        }
        Ok(())
    }

    /// Unanswered questions of a conference, newest first
    pub fn list_unanswered_questions(
        &self,
        conference_id: &str,
        limit: Option<usize>,
    ) -> DbResult<Vec<Question>> {
        let conn = self.conn()?;
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let mut stmt = conn.prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions
             WHERE conference_id = ?1 AND is_answered = 0
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![conference_id, limit], parse_question_row)?;
        super::collect_rows(rows)
    }
}

fn load_question(conn: &SqlConnection, id: &str) -> DbResult<Question> {
    conn.query_row(
        &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
        params![id],
        parse_question_row,
    )
    .optional()?
    .ok_or_else(|| DbError::not_found("question", id))
}

fn parse_question_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    Ok(Question {
        id: row.get(0)?,
        speaker: row.get(1)?,
        text: row.get(2)?,
        asked_by: row.get(3)?,
        asked_by_name: row.get(4)?,
        answer: row.get(5)?,
        answered_by: row.get(6)?,
        is_answered: row.get(7)?,
        conference_id: row.get(8)?,
        created_at: parse_datetime(&row.get::<_, String>(9)?),
    })
}
