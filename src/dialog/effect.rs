//! Effects produced by dialog transitions
//!
//! Every storage read or write, and every notification, is requested here and
//! carried out by the router after the transition.

use super::{PollDraft, PollEditMode, Reply};
use crate::db::{ContactField, Decision, TagField, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a fixed reply
    Reply(Reply),

    // Conference membership
    Welcome,
    RedeemAccessCode {
        conference_code: String,
        access_code: String,
    },
    JoinConference {
        conference_id: String,
    },
    LeaveConference,

    // Profile
    ShowProfile,
    SavePhoto {
        file_id: String,
    },
    SaveTags {
        field: TagField,
        tags: Vec<String>,
    },
    SaveContact {
        field: ContactField,
        value: String,
    },

    // Networking
    FindMatches,
    ShowConnections,
    ShowFeatured,
    ShowChats,
    RequestConnection {
        target: UserId,
    },
    RespondToConnection {
        connection_id: String,
        decision: Decision,
    },
    OpenChat {
        peer: UserId,
    },
    SendMessage {
        peer: UserId,
        text: String,
    },

    // Polls and questions
    ShowActivePolls,
    CastVote {
        poll_id: String,
        option: usize,
    },
    AskQuestion {
        speaker: String,
        text: String,
    },

    // Admin
    CreatePoll {
        draft: PollDraft,
    },
    CreateConference {
        name: String,
    },
    ShowAccessCodePicker,
    IssueAccessCode {
        conference_id: String,
    },
    ShowUnansweredQuestions,
    PromptAnswer {
        question_id: String,
    },
    AnswerQuestion {
        question_id: String,
        answer: String,
    },
    DeleteQuestion {
        question_id: String,
    },
    ShowPollList,
    /// Resolve the poll and prompt for the given edit step
    PromptPollEdit {
        poll_id: String,
        mode: PollEditMode,
    },
    SetPollQuestion {
        poll_id: String,
        text: String,
    },
    AddPollOption {
        poll_id: String,
        text: String,
    },
    /// Check the chosen option exists, then ask for its new text
    SelectPollOption {
        poll_id: String,
        index: usize,
    },
    SetPollOptionText {
        poll_id: String,
        index: usize,
        text: String,
    },
    ClosePoll {
        poll_id: String,
    },
    DeletePoll {
        poll_id: String,
    },
    ShowConferenceList,
    PromptConferenceRename {
        conference_id: String,
    },
    RenameConference {
        conference_id: String,
        name: String,
    },
    DeleteConference {
        conference_id: String,
    },
    SetConferenceActive {
        conference_id: String,
        active: bool,
    },
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply(Reply::text(text))
    }

    /// Whether executing this effect writes to storage
    #[allow(dead_code)] // Used in tests
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Effect::Reply(_)
                | Effect::Welcome
                | Effect::ShowProfile
                | Effect::FindMatches
                | Effect::ShowConnections
                | Effect::ShowFeatured
                | Effect::ShowChats
                | Effect::ShowActivePolls
                | Effect::ShowAccessCodePicker
                | Effect::ShowUnansweredQuestions
                | Effect::PromptAnswer { .. }
                | Effect::ShowPollList
                | Effect::PromptPollEdit { .. }
                | Effect::SelectPollOption { .. }
                | Effect::ShowConferenceList
                | Effect::PromptConferenceRename { .. }
        )
    }
}
