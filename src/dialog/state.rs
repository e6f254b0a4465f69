//! Per-user session state

use crate::db::{ContactField, TagField, UserId};
use serde::{Deserialize, Serialize};

pub const MIN_POLL_OPTIONS: usize = 2;
pub const MAX_POLL_OPTIONS: usize = 5;

/// Which multi-step input flow a user is in, with its typed context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,

    AwaitingProfileField {
        field: ProfileField,
    },

    AwaitingSpeakerName,

    AwaitingQuestionText {
        speaker: String,
    },

    AwaitingChatMessage {
        peer: UserId,
    },

    AwaitingAdminPollQuestion,

    AwaitingPollOption {
        draft: PollDraft,
    },

    AwaitingAdminConferenceName,

    AwaitingPollEdit {
        poll_id: String,
        mode: PollEditMode,
    },

    AwaitingConferenceEdit {
        conference_id: String,
    },

    AwaitingAnswerText {
        question_id: String,
    },
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingProfileField { .. } => "awaiting_profile_field",
            SessionState::AwaitingSpeakerName => "awaiting_speaker_name",
            SessionState::AwaitingQuestionText { .. } => "awaiting_question_text",
            SessionState::AwaitingChatMessage { .. } => "awaiting_chat_message",
            SessionState::AwaitingAdminPollQuestion => "awaiting_admin_poll_question",
            SessionState::AwaitingPollOption { .. } => "awaiting_poll_option",
            SessionState::AwaitingAdminConferenceName => "awaiting_admin_conference_name",
            SessionState::AwaitingPollEdit { .. } => "awaiting_poll_edit",
            SessionState::AwaitingConferenceEdit { .. } => "awaiting_conference_edit",
            SessionState::AwaitingAnswerText { .. } => "awaiting_answer_text",
        }
    }
}

/// Profile field targeted by an edit flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum ProfileField {
    Photo,
    Tags(TagField),
    Contact(ContactField),
}

/// Poll being assembled by an admin. Never persisted until finished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollDraft {
    pub question: String,
    pub options: Vec<String>,
}

impl PollDraft {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            options: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.options.len() >= MAX_POLL_OPTIONS
    }

    pub fn is_complete(&self) -> bool {
        self.options.len() >= MIN_POLL_OPTIONS
    }
}

/// Sub-step of an admin poll edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PollEditMode {
    /// Waiting for the replacement question text
    Question,
    /// Waiting for the text of an appended option
    AddOption,
    /// Waiting for the 1-based number of the option to rename
    ChooseOption,
    /// Waiting for the new text of option `index`
    OptionText { index: usize },
}

/// Facts about the acting user that transitions may consult
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogContext {
    pub user_id: UserId,
    pub is_admin: bool,
    pub conference_id: Option<String>,
}

impl DialogContext {
    pub fn new(user_id: UserId, is_admin: bool, conference_id: Option<String>) -> Self {
        Self {
            user_id,
            is_admin,
            conference_id,
        }
    }
}
