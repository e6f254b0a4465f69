//! Database schema and record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Messaging-channel user identity
pub type UserId = i64;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS profiles (
    user_id INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT,
    username TEXT,
    photo TEXT,
    contacts TEXT NOT NULL DEFAULT '{}',
    interests TEXT NOT NULL DEFAULT '[]',
    offerings TEXT NOT NULL DEFAULT '[]',
    looking_for TEXT NOT NULL DEFAULT '[]',
    conference_id TEXT,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    is_admin BOOLEAN NOT NULL DEFAULT 0,
    -- Registration order; user_id aliases rowid so rowid order is id order
    seq INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_profiles_conference ON profiles(conference_id, is_active);

CREATE TABLE IF NOT EXISTS conferences (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    code TEXT NOT NULL UNIQUE,
    is_public BOOLEAN NOT NULL DEFAULT 1,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    created_by INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS access_codes (
    code TEXT PRIMARY KEY,
    conference_id TEXT NOT NULL,
    created_by INTEGER NOT NULL,
    expires_at TEXT NOT NULL,
    used BOOLEAN NOT NULL DEFAULT 0,
    used_by INTEGER,
    created_at TEXT NOT NULL,

    FOREIGN KEY (conference_id) REFERENCES conferences(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS connections (
    id TEXT PRIMARY KEY,
    requester INTEGER NOT NULL,
    addressee INTEGER NOT NULL,
    user_low INTEGER NOT NULL,
    user_high INTEGER NOT NULL,
    status TEXT NOT NULL,
    conference_id TEXT,
    last_message_text TEXT,
    last_message_sender INTEGER,
    last_message_at TEXT,
    unread_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,

    UNIQUE (user_low, user_high)
);

CREATE INDEX IF NOT EXISTS idx_connections_low ON connections(user_low);
CREATE INDEX IF NOT EXISTS idx_connections_high ON connections(user_high);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    connection_id TEXT NOT NULL,
    sender INTEGER NOT NULL,
    receiver INTEGER NOT NULL,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL,

    FOREIGN KEY (connection_id) REFERENCES connections(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_connection ON messages(connection_id, created_at);

CREATE TABLE IF NOT EXISTS polls (
    id TEXT PRIMARY KEY,
    question TEXT NOT NULL,
    conference_id TEXT NOT NULL,
    created_by INTEGER NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_polls_conference ON polls(conference_id, is_active);

CREATE TABLE IF NOT EXISTS poll_options (
    poll_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    text TEXT NOT NULL,
    votes INTEGER NOT NULL DEFAULT 0,

    PRIMARY KEY (poll_id, position),
    FOREIGN KEY (poll_id) REFERENCES polls(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS poll_votes (
    poll_id TEXT NOT NULL,
    voter_id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    created_at TEXT NOT NULL,

    PRIMARY KEY (poll_id, voter_id),
    FOREIGN KEY (poll_id) REFERENCES polls(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS questions (
    id TEXT PRIMARY KEY,
    speaker TEXT NOT NULL,
    text TEXT NOT NULL,
    asked_by INTEGER NOT NULL,
    asked_by_name TEXT NOT NULL,
    answer TEXT,
    answered_by INTEGER,
    is_answered BOOLEAN NOT NULL DEFAULT 0,
    conference_id TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_questions_conference ON questions(conference_id, is_answered, created_at DESC);
";

// ============================================================================
// Profiles
// ============================================================================

/// Contact sub-fields of a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vkontakte: Option<String>,
}

impl Contacts {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none()
            && self.email.is_none()
            && self.telegram.is_none()
            && self.vkontakte.is_none()
    }

    pub fn set(&mut self, field: ContactField, value: String) {
        let slot = match field {
            ContactField::Phone => &mut self.phone,
            ContactField::Email => &mut self.email,
            ContactField::Telegram => &mut self.telegram,
            ContactField::Vkontakte => &mut self.vkontakte,
        };
        *slot = Some(value);
    }
}

/// Which contact sub-field an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Phone,
    Email,
    Telegram,
    Vkontakte,
}

impl ContactField {
    pub const ALL: [ContactField; 4] = [
        ContactField::Phone,
        ContactField::Email,
        ContactField::Telegram,
        ContactField::Vkontakte,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContactField::Phone => "phone",
            ContactField::Email => "email",
            ContactField::Telegram => "telegram",
            ContactField::Vkontakte => "vkontakte",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }

    pub fn label(self) -> &'static str {
        match self {
            ContactField::Phone => "Phone",
            ContactField::Email => "Email",
            ContactField::Telegram => "Telegram",
            ContactField::Vkontakte => "VKontakte",
        }
    }
}

/// Which tag set an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagField {
    Interests,
    Offerings,
    LookingFor,
}

impl TagField {
    pub(crate) fn column(self) -> &'static str {
        match self {
            TagField::Interests => "interests",
            TagField::Offerings => "offerings",
            TagField::LookingFor => "looking_for",
        }
    }
}

/// Attendee profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub photo: Option<String>,
    pub contacts: Contacts,
    pub interests: Vec<String>,
    pub offerings: Vec<String>,
    pub looking_for: Vec<String>,
    pub conference_id: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }

    pub fn tags(&self, field: TagField) -> &[String] {
        match field {
            TagField::Interests => &self.interests,
            TagField::Offerings => &self.offerings,
            TagField::LookingFor => &self.looking_for,
        }
    }
}

/// Identity fields reported by the messaging channel with each event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfile {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub is_admin: bool,
}

// ============================================================================
// Conferences and access codes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conference {
    pub id: String,
    pub name: String,
    pub code: String,
    pub is_public: bool,
    pub is_active: bool,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Single-use join token bound to a conference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCode {
    pub code: String,
    pub conference_id: String,
    pub created_by: UserId,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub used_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counts shown on the shared display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceStats {
    pub participants: i64,
    pub connections: i64,
    pub active_polls: i64,
    pub unanswered_questions: i64,
}

// ============================================================================
// Connections and messages
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
            ConnectionStatus::Rejected => "rejected",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ConnectionStatus::Pending),
            "accepted" => Some(ConnectionStatus::Accepted),
            "rejected" => Some(ConnectionStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer to a pending connection request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn resulting_status(self) -> ConnectionStatus {
        match self {
            Decision::Accept => ConnectionStatus::Accepted,
            Decision::Reject => ConnectionStatus::Rejected,
        }
    }
}

/// Denormalized snapshot of the latest chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMessage {
    pub text: String,
    pub sender: UserId,
    pub timestamp: DateTime<Utc>,
}

/// Relationship record for an unordered pair of users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub requester: UserId,
    pub addressee: UserId,
    pub status: ConnectionStatus,
    pub conference_id: Option<String>,
    pub last_message: Option<LastMessage>,
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Connection {
    /// The other side of the pair, if `user` is part of it
    pub fn peer_of(&self, user: UserId) -> Option<UserId> {
        if self.requester == user {
            Some(self.addressee)
        } else if self.addressee == user {
            Some(self.requester)
        } else {
            None
        }
    }
}

/// Normalized key of an unordered pair
pub(crate) fn pair_key(a: UserId, b: UserId) -> (UserId, UserId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Immutable chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub connection_id: String,
    pub sender: UserId,
    pub receiver: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Polls and questions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub text: String,
    pub votes: i64,
    pub voters: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: String,
    pub question: String,
    pub options: Vec<PollOption>,
    pub conference_id: String,
    pub created_by: UserId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Poll {
    pub fn total_votes(&self) -> i64 {
        self.options.iter().map(|o| o.votes).sum()
    }

    pub fn has_voted(&self, voter: UserId) -> bool {
        self.options.iter().any(|o| o.voters.contains(&voter))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub speaker: String,
    pub text: String,
    pub asked_by: UserId,
    pub asked_by_name: String,
    pub answer: Option<String>,
    pub answered_by: Option<UserId>,
    pub is_answered: bool,
    pub conference_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
