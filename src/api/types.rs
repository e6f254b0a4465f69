//! API request and response types

use crate::db::{ConferenceStats, Question};
use crate::dialog::Reply;
use crate::ledger::PollTally;
use serde::Serialize;

/// Replies for the sender of an ingested event
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub replies: Vec<Reply>,
}

/// Snapshot sent first on every display stream
#[derive(Debug, Serialize)]
pub struct DisplaySnapshot {
    pub polls: Vec<PollTally>,
    pub questions: Vec<Question>,
    pub stats: ConferenceStats,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
