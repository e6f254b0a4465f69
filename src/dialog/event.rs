//! Inbound events and the typed intents they resolve to
//!
//! The messaging channel hands us raw text, photos, and button payloads.
//! They are resolved into an `Intent` once, here, and the state machine only
//! ever sees the typed form.

use super::keyboards::HOME_LABEL;
use crate::db::{ContactField, Decision, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Text,
    Photo,
    ButtonPress,
}

/// Identity fields the channel reports with each event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Raw event from the messaging channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub kind: EventKind,
    pub user_id: UserId,
    /// Message text, photo file id, or button payload
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub sender: Sender,
}

impl InboundEvent {
    pub fn resolve(&self) -> Intent {
        match self.kind {
            EventKind::Photo => Intent::Photo(self.payload.clone()),
            EventKind::ButtonPress => {
                ButtonAction::parse(&self.payload).map_or(Intent::Unknown, Intent::Button)
            }
            EventKind::Text => resolve_text(&self.payload),
        }
    }
}

fn resolve_text(text: &str) -> Intent {
    let text = text.trim();

    if let Some(rest) = text.strip_prefix("/start") {
        let arg = rest.trim();
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Intent::Start {
                join: JoinCode::parse(arg),
            };
        }
    }

    match text {
        "/cancel" => return Intent::Cancel,
        "/menu" | "/home" | HOME_LABEL => return Intent::Home,
        "/admin" => return Intent::Menu(MenuCommand::AdminPanel),
        _ => {}
    }

    if let Some(command) = MenuCommand::from_label(text) {
        return Intent::Menu(command);
    }

    Intent::Text(text.to_string())
}

/// Typed intent resolved from an inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// `/start`, optionally carrying a join deep link
    Start { join: Option<JoinCode> },
    Menu(MenuCommand),
    Button(ButtonAction),
    /// Return to the main menu from anywhere, discarding any flow in progress
    Home,
    Cancel,
    Text(String),
    /// Photo upload, by channel file id
    Photo(String),
    Unknown,
}

/// Deep-link payload `join_<conferenceCode>_<accessCode>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCode {
    pub conference_code: String,
    pub access_code: String,
}

impl JoinCode {
    pub fn parse(s: &str) -> Option<Self> {
        let rest = s.strip_prefix("join_")?;
        let (conference_code, access_code) = rest.split_once('_')?;
        if conference_code.is_empty() || access_code.is_empty() {
            return None;
        }
        Some(Self {
            conference_code: conference_code.to_string(),
            access_code: access_code.to_string(),
        })
    }

    pub fn encode(&self) -> String {
        format!("join_{}_{}", self.conference_code, self.access_code)
    }
}

// ============================================================================
// Menu commands
// ============================================================================

/// Reply-keyboard selections. Always allowed, whatever the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuCommand {
    MyProfile,
    FindPeople,
    ActivePolls,
    AskSpeaker,
    MyConnections,
    FeaturedProfiles,
    MyChats,
    AdminPanel,

    EditPhoto,
    EditContacts,
    EditInterests,
    EditOfferings,
    EditLookingFor,

    CreatePoll,
    ManageQuestions,
    CreateConference,
    GenerateAccessCode,
    PollList,
    ConferenceList,
}

impl MenuCommand {
    pub const ALL: [MenuCommand; 19] = [
        MenuCommand::MyProfile,
        MenuCommand::FindPeople,
        MenuCommand::ActivePolls,
        MenuCommand::AskSpeaker,
        MenuCommand::MyConnections,
        MenuCommand::FeaturedProfiles,
        MenuCommand::MyChats,
        MenuCommand::AdminPanel,
        MenuCommand::EditPhoto,
        MenuCommand::EditContacts,
        MenuCommand::EditInterests,
        MenuCommand::EditOfferings,
        MenuCommand::EditLookingFor,
        MenuCommand::CreatePoll,
        MenuCommand::ManageQuestions,
        MenuCommand::CreateConference,
        MenuCommand::GenerateAccessCode,
        MenuCommand::PollList,
        MenuCommand::ConferenceList,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuCommand::MyProfile => "👤 My profile",
            MenuCommand::FindPeople => "🔍 Find people",
            MenuCommand::ActivePolls => "📊 Active polls",
            MenuCommand::AskSpeaker => "❓ Ask a speaker",
            MenuCommand::MyConnections => "🤝 My connections",
            MenuCommand::FeaturedProfiles => "⭐ Featured profiles",
            MenuCommand::MyChats => "💬 My chats",
            MenuCommand::AdminPanel => "🛠️ Admin panel",
            MenuCommand::EditPhoto => "📸 Change photo",
            MenuCommand::EditContacts => "📞 Change contacts",
            MenuCommand::EditInterests => "🎯 Change interests",
            MenuCommand::EditOfferings => "💼 Change offerings",
            MenuCommand::EditLookingFor => "🔎 Change what I'm looking for",
            MenuCommand::CreatePoll => "📊 Create poll",
            MenuCommand::ManageQuestions => "📋 Manage questions",
            MenuCommand::CreateConference => "🏢 Create conference",
            MenuCommand::GenerateAccessCode => "🔑 Generate access code",
            MenuCommand::PollList => "🗳️ Poll list",
            MenuCommand::ConferenceList => "🗂️ Conference list",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    pub fn requires_admin(self) -> bool {
        matches!(
            self,
            MenuCommand::AdminPanel
                | MenuCommand::CreatePoll
                | MenuCommand::ManageQuestions
                | MenuCommand::CreateConference
                | MenuCommand::GenerateAccessCode
                | MenuCommand::PollList
                | MenuCommand::ConferenceList
        )
    }
}

// ============================================================================
// Button actions
// ============================================================================

/// Inline button presses, carried over the wire as `verb:arg:arg`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    JoinConference { conference_id: String },
    LeaveConference,
    EditContact(ContactField),
    Connect { user: UserId },
    Respond { connection_id: String, decision: Decision },
    OpenChat { peer: UserId },
    Vote { poll_id: String, option: usize },

    AddMoreOption,
    FinishPoll,
    IssueAccessCode { conference_id: String },
    AnswerQuestion { question_id: String },
    DeleteQuestion { question_id: String },
    EditPollQuestion { poll_id: String },
    AddPollOption { poll_id: String },
    EditPollOption { poll_id: String },
    ClosePoll { poll_id: String },
    DeletePoll { poll_id: String },
    RenameConference { conference_id: String },
    DeleteConference { conference_id: String },
    SetConferenceActive { conference_id: String, active: bool },
}

impl ButtonAction {
    pub fn encode(&self) -> String {
        match self {
            ButtonAction::JoinConference { conference_id } => format!("join:{conference_id}"),
            ButtonAction::LeaveConference => "leave".to_string(),
            ButtonAction::EditContact(field) => format!("contact:{}", field.as_str()),
            ButtonAction::Connect { user } => format!("connect:{user}"),
            ButtonAction::Respond {
                connection_id,
                decision: Decision::Accept,
            } => format!("accept:{connection_id}"),
            ButtonAction::Respond {
                connection_id,
                decision: Decision::Reject,
            } => format!("reject:{connection_id}"),
            ButtonAction::OpenChat { peer } => format!("chat:{peer}"),
            ButtonAction::Vote { poll_id, option } => format!("vote:{poll_id}:{option}"),
            ButtonAction::AddMoreOption => "poll_more".to_string(),
            ButtonAction::FinishPoll => "poll_finish".to_string(),
            ButtonAction::IssueAccessCode { conference_id } => format!("access:{conference_id}"),
            ButtonAction::AnswerQuestion { question_id } => format!("answer:{question_id}"),
            ButtonAction::DeleteQuestion { question_id } => format!("question_del:{question_id}"),
            ButtonAction::EditPollQuestion { poll_id } => format!("poll_question:{poll_id}"),
            ButtonAction::AddPollOption { poll_id } => format!("poll_add:{poll_id}"),
            ButtonAction::EditPollOption { poll_id } => format!("poll_option:{poll_id}"),
            ButtonAction::ClosePoll { poll_id } => format!("poll_close:{poll_id}"),
            ButtonAction::DeletePoll { poll_id } => format!("poll_del:{poll_id}"),
            ButtonAction::RenameConference { conference_id } => format!("conf_rename:{conference_id}"),
            ButtonAction::DeleteConference { conference_id } => format!("conf_del:{conference_id}"),
            ButtonAction::SetConferenceActive {
                conference_id,
                active: true,
            } => format!("conf_on:{conference_id}"),
            ButtonAction::SetConferenceActive {
                conference_id,
                active: false,
            } => format!("conf_off:{conference_id}"),
        }
    }

    pub fn parse(payload: &str) -> Option<Self> {
        let mut parts = payload.split(':');
        let verb = parts.next()?;
        let args: Vec<&str> = parts.collect();
        if args.iter().any(|a| a.is_empty()) {
            return None;
        }

        let id = || -> Option<String> {
            match args.as_slice() {
                [id] => Some((*id).to_string()),
                _ => None,
            }
        };
        let user = || -> Option<UserId> {
            match args.as_slice() {
                [id] => id.parse().ok(),
                _ => None,
            }
        };
        let bare = |action: ButtonAction| args.is_empty().then_some(action);

        match verb {
            "join" => Some(ButtonAction::JoinConference { conference_id: id()? }),
            "leave" => bare(ButtonAction::LeaveConference),
            "contact" => match args.as_slice() {
                [field] => ContactField::parse(field).map(ButtonAction::EditContact),
                _ => None,
            },
            "connect" => Some(ButtonAction::Connect { user: user()? }),
            "accept" => Some(ButtonAction::Respond {
                connection_id: id()?,
                decision: Decision::Accept,
            }),
            "reject" => Some(ButtonAction::Respond {
                connection_id: id()?,
                decision: Decision::Reject,
            }),
            "chat" => Some(ButtonAction::OpenChat { peer: user()? }),
            "vote" => match args.as_slice() {
                [poll_id, option] => Some(ButtonAction::Vote {
                    poll_id: (*poll_id).to_string(),
                    option: option.parse().ok()?,
                }),
                _ => None,
            },
            "poll_more" => bare(ButtonAction::AddMoreOption),
            "poll_finish" => bare(ButtonAction::FinishPoll),
            "access" => Some(ButtonAction::IssueAccessCode { conference_id: id()? }),
            "answer" => Some(ButtonAction::AnswerQuestion { question_id: id()? }),
            "question_del" => Some(ButtonAction::DeleteQuestion { question_id: id()? }),
            "poll_question" => Some(ButtonAction::EditPollQuestion { poll_id: id()? }),
            "poll_add" => Some(ButtonAction::AddPollOption { poll_id: id()? }),
            "poll_option" => Some(ButtonAction::EditPollOption { poll_id: id()? }),
            "poll_close" => Some(ButtonAction::ClosePoll { poll_id: id()? }),
            "poll_del" => Some(ButtonAction::DeletePoll { poll_id: id()? }),
            "conf_rename" => Some(ButtonAction::RenameConference { conference_id: id()? }),
            "conf_del" => Some(ButtonAction::DeleteConference { conference_id: id()? }),
            "conf_on" => Some(ButtonAction::SetConferenceActive {
                conference_id: id()?,
                active: true,
            }),
            "conf_off" => Some(ButtonAction::SetConferenceActive {
                conference_id: id()?,
                active: false,
            }),
            _ => None,
        }
    }

    pub fn requires_admin(&self) -> bool {
        !matches!(
            self,
            ButtonAction::JoinConference { .. }
                | ButtonAction::LeaveConference
                | ButtonAction::EditContact(_)
                | ButtonAction::Connect { .. }
                | ButtonAction::Respond { .. }
                | ButtonAction::OpenChat { .. }
                | ButtonAction::Vote { .. }
        )
    }
}
