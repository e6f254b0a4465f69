//! Dialog router
//!
//! Runs one inbound event to completion: ensure the profile, read the
//! session, resolve the intent, apply the pure transition, execute the
//! effects against the ledgers, and store the next session state.
//! Events from the same user are processed one at a time.

mod executor;

use crate::config::Config;
use crate::db::{Conflict, ConnectionStatus, Database, DbError, NewProfile, UserId};
use crate::dialog::{
    keyboards, transition, DialogContext, InboundEvent, Reply, SessionState, TransitionError,
};
use crate::ledger::{ConnectionLedger, PollLedger, QuestionBoard};
use crate::relay::NotificationRelay;
use crate::session::SessionStore;
use chrono::Duration;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

const RETRY_MESSAGE: &str = "❌ Something went wrong. Please try again.";

/// Failure while executing an effect
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Malformed or out-of-range input; the user may retry
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Conflict(Conflict),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<DbError> for DispatchError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { entity, .. } => DispatchError::NotFound(entity),
            DbError::OptionOutOfRange { index } => {
                DispatchError::Validation(format!("There is no option {}.", index + 1))
            }
            DbError::Conflict(c) => DispatchError::Conflict(c),
            DbError::Sqlite(_) | DbError::Json(_) | DbError::LockPoisoned => {
                DispatchError::Storage(e.to_string())
            }
        }
    }
}

/// User-facing wording of a ledger conflict
fn conflict_message(conflict: &Conflict) -> String {
    match conflict {
        Conflict::AlreadyVoted => "⚠️ You have already voted in this poll.".to_string(),
        Conflict::PollInactive => "⏹️ This poll is closed.".to_string(),
        Conflict::AlreadyConnected {
            status: ConnectionStatus::Pending,
        } => "⏳ A connection request is already pending.".to_string(),
        Conflict::AlreadyConnected {
            status: ConnectionStatus::Accepted,
        } => "🤝 You are already connected.".to_string(),
        Conflict::AlreadyConnected {
            status: ConnectionStatus::Rejected,
        } => "This connection request was declined earlier.".to_string(),
        Conflict::InvalidStateTransition { from } => {
            format!("This request has already been {from}.")
        }
        Conflict::NotConnected => "You can only chat with your connections.".to_string(),
        Conflict::AccessCodeUnavailable => {
            "❌ This access code is invalid, already used, or expired.".to_string()
        }
        Conflict::ConferenceInactive => "⏸️ This conference is not active.".to_string(),
        Conflict::ConferencePrivate => {
            "🔒 This conference is private. Ask an organizer for an invite link.".to_string()
        }
    }
}

/// Router settings taken from the service configuration
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub admin_ids: HashSet<UserId>,
    pub bot_link: Option<String>,
    pub access_code_ttl: Duration,
}

impl From<&Config> for RouterSettings {
    fn from(config: &Config) -> Self {
        Self {
            admin_ids: config.admin_ids.clone(),
            bot_link: config.bot_link.clone(),
            access_code_ttl: config.access_code_ttl,
        }
    }
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            admin_ids: HashSet::new(),
            bot_link: None,
            access_code_ttl: Duration::hours(24),
        }
    }
}

/// Effect result: replies for the actor and an optional next-state override
#[derive(Debug, Default)]
struct Outcome {
    replies: Vec<Reply>,
    next_state: Option<SessionState>,
}

impl Outcome {
    fn reply(reply: Reply) -> Self {
        Self {
            replies: vec![reply],
            next_state: None,
        }
    }

    fn replies(replies: Vec<Reply>) -> Self {
        Self {
            replies,
            next_state: None,
        }
    }

    fn then(mut self, state: SessionState) -> Self {
        self.next_state = Some(state);
        self
    }
}

pub struct DialogRouter {
    db: Database,
    sessions: Arc<dyn SessionStore>,
    connections: ConnectionLedger,
    polls: PollLedger,
    questions: QuestionBoard,
    settings: RouterSettings,
    user_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl DialogRouter {
    pub fn new(
        db: Database,
        relay: NotificationRelay,
        sessions: Arc<dyn SessionStore>,
        settings: RouterSettings,
    ) -> Self {
        Self {
            connections: ConnectionLedger::new(db.clone(), relay.clone()),
            polls: PollLedger::new(db.clone(), relay.clone()),
            questions: QuestionBoard::new(db.clone(), relay),
            db,
            sessions,
            settings,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn user_lock(&self, user_id: UserId) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        Arc::clone(locks.entry(user_id).or_default())
    }

    /// Process one inbound event and return the replies for its sender
    pub async fn dispatch(&self, event: InboundEvent) -> Vec<Reply> {
        let user_id = event.user_id;
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let profile = match self.db.ensure_profile(&NewProfile {
            user_id,
            first_name: event.sender.first_name.clone(),
            last_name: event.sender.last_name.clone(),
            username: event.sender.username.clone(),
            is_admin: self.settings.admin_ids.contains(&user_id),
        }) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to load profile");
                return vec![Reply::text(RETRY_MESSAGE)];
            }
        };

        let state = self.sessions.get(user_id).await;
        let intent = event.resolve();
        let ctx = DialogContext::new(user_id, profile.is_admin, profile.conference_id.clone());

        let result = match transition(&state, &ctx, intent) {
            Ok(result) => result,
            Err(TransitionError::Ignored) => {
                tracing::debug!(user_id, state = state.name(), "Event ignored");
                return vec![];
            }
            Err(TransitionError::Rejected(message)) => {
                tracing::debug!(user_id, state = state.name(), %message, "Input rejected");
                return vec![Reply::text(message)];
            }
        };

        let mut next_state = result.new_state;
        let mut replies = Vec::new();

        for effect in result.effects {
            match self.execute_effect(&profile, effect).await {
                Ok(outcome) => {
                    replies.extend(outcome.replies);
                    if let Some(state) = outcome.next_state {
                        next_state = state;
                    }
                }
                Err(e) => {
                    let (reply, recovered) = recover(user_id, &e, &state, next_state, ctx.is_admin);
                    replies.push(reply);
                    next_state = recovered;
                    break;
                }
            }
        }

        if next_state != state {
            tracing::debug!(user_id, from = state.name(), to = next_state.name(), "Session state changed");
        }
        self.sessions.put(user_id, next_state).await;
        replies
    }
}

/// Reply and session state after a failed effect
fn recover(
    user_id: UserId,
    error: &DispatchError,
    previous: &SessionState,
    planned: SessionState,
    is_admin: bool,
) -> (Reply, SessionState) {
    match error {
        DispatchError::Validation(message) => (Reply::text(message.clone()), previous.clone()),
        DispatchError::NotFound(entity) => {
            tracing::debug!(user_id, entity, "Referenced entity not found");
            (
                Reply::text(format!("❌ {} not found.", capitalize(entity)))
                    .with_keyboard(keyboards::main_menu(is_admin)),
                SessionState::Idle,
            )
        }
        DispatchError::Conflict(conflict) => {
            tracing::debug!(user_id, %conflict, "Ledger conflict");
            (Reply::text(conflict_message(conflict)), planned)
        }
        DispatchError::Storage(message) => {
            tracing::error!(user_id, error = %message, "Storage failure during dispatch");
            (Reply::text(RETRY_MESSAGE), previous.clone())
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
