//! Poll voting ledger and tallies

use crate::db::{Database, DbResult, Poll, UserId};
use crate::dialog::{keyboards, views, Reply};
use crate::relay::{DisplayEventKind, NotificationRelay};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Share of `votes` in `total` as a percentage with one decimal place.
/// Zero when nobody has voted.
#[allow(clippy::cast_precision_loss)] // vote counts are far below 2^52
pub fn percent(votes: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (votes as f64 / total as f64 * 1000.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    pub text: String,
    pub votes: i64,
    pub percent: f64,
}

/// Poll with per-option percentages, as shown to voters and on the display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollTally {
    pub id: String,
    pub question: String,
    pub conference_id: String,
    pub options: Vec<OptionTally>,
    pub total_votes: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl PollTally {
    pub fn from_poll(poll: &Poll) -> Self {
        let total = poll.total_votes();
        Self {
            id: poll.id.clone(),
            question: poll.question.clone(),
            conference_id: poll.conference_id.clone(),
            options: poll
                .options
                .iter()
                .map(|o| OptionTally {
                    text: o.text.clone(),
                    votes: o.votes,
                    percent: percent(o.votes, total),
                })
                .collect(),
            total_votes: total,
            is_active: poll.is_active,
            created_at: poll.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PollLedger {
    db: Database,
    relay: NotificationRelay,
}

impl PollLedger {
    pub fn new(db: Database, relay: NotificationRelay) -> Self {
        Self { db, relay }
    }

    /// Persist a finished draft, then push it to the conference's members
    pub async fn create(
        &self,
        question: &str,
        options: &[String],
        conference_id: &str,
        created_by: UserId,
    ) -> DbResult<Poll> {
        let poll = self
            .db
            .create_poll(question, options, conference_id, created_by)?;
        tracing::info!(poll_id = %poll.id, conference_id, options = options.len(), "Poll created");

        self.relay.broadcast(
            conference_id,
            DisplayEventKind::NewPoll,
            PollTally::from_poll(&poll),
        );

        // The poll is committed; from here on failures only cost notifications
        let members = match self.db.list_active_profiles(conference_id) {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!(poll_id = %poll.id, error = %e, "Could not load poll recipients");
                return Ok(poll);
            }
        };
        let invite = Reply::text(format!("🆕 New poll!\n{}", views::poll_question(&poll)))
            .with_keyboard(keyboards::vote(&poll));
        let deliveries = members
            .into_iter()
            .filter(|member| member.user_id != created_by)
            .map(|member| (member.user_id, invite.clone()))
            .collect();
        self.relay.notify_all(deliveries).await;

        Ok(poll)
    }

    /// Count one vote; a voter's second vote on the same poll is a conflict
    pub fn cast_vote(&self, poll_id: &str, option: usize, voter: UserId) -> DbResult<PollTally> {
        let poll = self.db.cast_vote(poll_id, option, voter)?;
        tracing::info!(poll_id, option, voter, "Vote recorded");

        let tally = PollTally::from_poll(&poll);
        self.relay
            .broadcast(&poll.conference_id, DisplayEventKind::PollUpdate, &tally);
        Ok(tally)
    }

    pub fn set_question(&self, poll_id: &str, question: &str) -> DbResult<Poll> {
        let poll = self.db.set_poll_question(poll_id, question)?;
        tracing::info!(poll_id, "Poll question edited");
        self.publish_update(&poll);
        Ok(poll)
    }

    pub fn add_option(&self, poll_id: &str, text: &str) -> DbResult<Poll> {
        let poll = self.db.add_poll_option(poll_id, text)?;
        tracing::info!(poll_id, options = poll.options.len(), "Poll option added");
        self.publish_update(&poll);
        Ok(poll)
    }

    pub fn set_option_text(&self, poll_id: &str, index: usize, text: &str) -> DbResult<Poll> {
        let poll = self.db.set_poll_option_text(poll_id, index, text)?;
        tracing::info!(poll_id, index, "Poll option edited");
        self.publish_update(&poll);
        Ok(poll)
    }

    pub fn close(&self, poll_id: &str) -> DbResult<Poll> {
        let poll = self.db.set_poll_active(poll_id, false)?;
        tracing::info!(poll_id, "Poll closed");
        self.publish_update(&poll);
        Ok(poll)
    }

    pub fn delete(&self, poll_id: &str) -> DbResult<()> {
        let poll = self.db.get_poll(poll_id)?;
        self.db.delete_poll(poll_id)?;
        tracing::info!(poll_id, "Poll deleted");
        self.relay.broadcast(
            &poll.conference_id,
            DisplayEventKind::PollUpdate,
            serde_json::json!({ "id": poll.id, "deleted": true }),
        );
        Ok(())
    }

    fn publish_update(&self, poll: &Poll) {
        self.relay.broadcast(
            &poll.conference_id,
            DisplayEventKind::PollUpdate,
            PollTally::from_poll(poll),
        );
    }
}
