//! Speaker questions: asking notifies conference admins, answering notifies
//! the asker

use crate::db::{Database, DbResult, NewQuestion, Profile, Question};
use crate::dialog::{keyboards, views, Reply};
use crate::relay::{DisplayEventKind, NotificationRelay};

#[derive(Clone)]
pub struct QuestionBoard {
    db: Database,
    relay: NotificationRelay,
}

impl QuestionBoard {
    pub fn new(db: Database, relay: NotificationRelay) -> Self {
        Self { db, relay }
    }

    pub async fn ask(&self, asker: &Profile, speaker: &str, text: &str) -> DbResult<Question> {
        let asked_by_name = asker.display_name();
        let question = self.db.create_question(&NewQuestion {
            speaker,
            text,
            asked_by: asker.user_id,
            asked_by_name: &asked_by_name,
            conference_id: asker.conference_id.as_deref(),
        })?;
        tracing::info!(question_id = %question.id, asked_by = asker.user_id, "Question asked");

        let Some(conference_id) = question.conference_id.as_deref() else {
            return Ok(question);
        };

        self.relay
            .broadcast(conference_id, DisplayEventKind::NewQuestion, &question);

        let admins = match self.db.list_admins(conference_id) {
            Ok(admins) => admins,
            Err(e) => {
                tracing::warn!(question_id = %question.id, error = %e, "Could not load question recipients");
                return Ok(question);
            }
        };
        let alert = Reply::text(format!("❓ New question\n\n{}", views::question(&question)))
            .with_keyboard(keyboards::question_actions(&question.id));
        self.relay
            .notify_all(
                admins
                    .into_iter()
                    .map(|admin| (admin.user_id, alert.clone()))
                    .collect(),
            )
            .await;

        Ok(question)
    }

    pub async fn answer(
        &self,
        question_id: &str,
        answer: &str,
        admin: &Profile,
    ) -> DbResult<Question> {
        let question = self.db.answer_question(question_id, answer, admin.user_id)?;
        tracing::info!(question_id, answered_by = admin.user_id, "Question answered");

        if let Some(conference_id) = question.conference_id.as_deref() {
            self.relay
                .broadcast(conference_id, DisplayEventKind::QuestionAnswered, &question);
        }
        self.relay
            .notify(
                question.asked_by,
                Reply::text(views::answered_question(&question)),
            )
            .await;

        Ok(question)
    }

    pub fn delete(&self, question_id: &str) -> DbResult<()> {
        self.db.delete_question(question_id)?;
        tracing::info!(question_id, "Question deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_admin, seed_profile, RecordingNotifier};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ask_notifies_conference_admins() {
        let notifier = Arc::new(RecordingNotifier::new());
        let db = Database::open_in_memory().unwrap();
        let relay = NotificationRelay::new(notifier.clone());
        let mut display = relay.subscribe();
        let board = QuestionBoard::new(db.clone(), relay);

        let asker = seed_profile(&db, 1, "Ada", Some("conf"));
        seed_admin(&db, 9, Some("conf"));
        seed_admin(&db, 8, Some("other"));

        let question = board.ask(&asker, "Grace", "Why COBOL?").await.unwrap();
        assert_eq!(question.asked_by_name, "Ada");

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 9);
        assert!(sent[0].1.text.contains("Why COBOL?"));

        let event = display.recv().await.unwrap();
        assert_eq!(event.kind, DisplayEventKind::NewQuestion);
        assert_eq!(event.payload["speaker"], "Grace");
        assert_eq!(event.payload["askedByName"], "Ada");
    }

    #[tokio::test]
    async fn test_ask_succeeds_when_admins_unreadable() {
        let notifier = Arc::new(RecordingNotifier::new());
        let db = Database::open_in_memory().unwrap();
        let board = QuestionBoard::new(db.clone(), NotificationRelay::new(notifier.clone()));
        let asker = seed_profile(&db, 1, "Ada", Some("conf"));
        seed_admin(&db, 9, Some("conf"));
        db.execute_batch("DROP TABLE profiles").unwrap();

        let question = board.ask(&asker, "Grace", "Why COBOL?").await.unwrap();

        let stored = db.list_unanswered_questions("conf", None).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, question.id);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_answer_notifies_asker() {
        let notifier = Arc::new(RecordingNotifier::new());
        let db = Database::open_in_memory().unwrap();
        let board = QuestionBoard::new(db.clone(), NotificationRelay::new(notifier.clone()));
        let asker = seed_profile(&db, 1, "Ada", Some("conf"));
        let admin = seed_admin(&db, 9, Some("conf"));

        let q = board.ask(&asker, "Grace", "Why?").await.unwrap();
        board.answer(&q.id, "Because.", &admin).await.unwrap();

        let (to, reply) = notifier.sent().pop().unwrap();
        assert_eq!(to, 1);
        assert!(reply.text.contains("Because."));
        assert!(db
            .list_unanswered_questions("conf", None)
            .unwrap()
            .is_empty());
    }
}
