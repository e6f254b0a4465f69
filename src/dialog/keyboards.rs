//! Keyboards shown with replies

use super::{ButtonAction, InlineButton, Keyboard, MenuCommand};
use crate::db::{Conference, ContactField, Decision, Poll, UserId};

pub const HOME_LABEL: &str = "⬅️ Back to main menu";

pub fn main_menu(is_admin: bool) -> Keyboard {
    let last: &[&str] = if is_admin {
        &[MenuCommand::MyChats.label(), MenuCommand::AdminPanel.label()]
    } else {
        &[MenuCommand::MyChats.label()]
    };
    Keyboard::menu(&[
        &[MenuCommand::MyProfile.label(), MenuCommand::FindPeople.label()],
        &[MenuCommand::ActivePolls.label(), MenuCommand::AskSpeaker.label()],
        &[
            MenuCommand::MyConnections.label(),
            MenuCommand::FeaturedProfiles.label(),
        ],
        last,
    ])
}

pub fn profile_menu() -> Keyboard {
    Keyboard::menu(&[
        &[MenuCommand::EditPhoto.label(), MenuCommand::EditContacts.label()],
        &[
            MenuCommand::EditInterests.label(),
            MenuCommand::EditOfferings.label(),
        ],
        &[MenuCommand::EditLookingFor.label(), HOME_LABEL],
    ])
}

pub fn admin_menu() -> Keyboard {
    Keyboard::menu(&[
        &[
            MenuCommand::CreatePoll.label(),
            MenuCommand::ManageQuestions.label(),
        ],
        &[
            MenuCommand::CreateConference.label(),
            MenuCommand::GenerateAccessCode.label(),
        ],
        &[MenuCommand::PollList.label(), MenuCommand::ConferenceList.label()],
        &[HOME_LABEL],
    ])
}

pub fn back_menu() -> Keyboard {
    Keyboard::menu(&[&[HOME_LABEL]])
}

// ============================================================================
// Inline keyboards
// ============================================================================

pub fn contact_fields() -> Keyboard {
    Keyboard::column(
        ContactField::ALL
            .into_iter()
            .map(|f| InlineButton::new(f.label(), &ButtonAction::EditContact(f))),
    )
}

pub fn conference_picker(conferences: &[Conference]) -> Keyboard {
    let buttons: Vec<InlineButton> = conferences
        .iter()
        .map(|c| {
            InlineButton::new(
                &c.name,
                &ButtonAction::JoinConference {
                    conference_id: c.id.clone(),
                },
            )
        })
        .collect();
    Keyboard::Inline {
        rows: buttons.chunks(2).map(<[InlineButton]>::to_vec).collect(),
    }
}

pub fn leave_conference() -> Keyboard {
    Keyboard::row([InlineButton::new(
        "🚪 Leave conference",
        &ButtonAction::LeaveConference,
    )])
}

pub fn connect(user: UserId) -> Keyboard {
    Keyboard::row([InlineButton::new(
        "🤝 Connect",
        &ButtonAction::Connect { user },
    )])
}

pub fn connection_request(connection_id: &str) -> Keyboard {
    let respond = |decision| ButtonAction::Respond {
        connection_id: connection_id.to_string(),
        decision,
    };
    Keyboard::row([
        InlineButton::new("✅ Accept", &respond(Decision::Accept)),
        InlineButton::new("❌ Reject", &respond(Decision::Reject)),
    ])
}

pub fn open_chat(peer: UserId, label: &str) -> Keyboard {
    Keyboard::row([InlineButton::new(label, &ButtonAction::OpenChat { peer })])
}

pub fn vote(poll: &Poll) -> Keyboard {
    Keyboard::column(poll.options.iter().enumerate().map(|(option, o)| {
        InlineButton::new(
            &o.text,
            &ButtonAction::Vote {
                poll_id: poll.id.clone(),
                option,
            },
        )
    }))
}

pub fn poll_draft() -> Keyboard {
    Keyboard::row([
        InlineButton::new("➕ Add option", &ButtonAction::AddMoreOption),
        InlineButton::new("✅ Finish", &ButtonAction::FinishPoll),
    ])
}

pub fn question_actions(question_id: &str) -> Keyboard {
    Keyboard::row([
        InlineButton::new(
            "💬 Answer",
            &ButtonAction::AnswerQuestion {
                question_id: question_id.to_string(),
            },
        ),
        InlineButton::new(
            "❌ Delete",
            &ButtonAction::DeleteQuestion {
                question_id: question_id.to_string(),
            },
        ),
    ])
}

pub fn poll_admin(poll_id: &str) -> Keyboard {
    let poll_id = poll_id.to_string();
    Keyboard::Inline {
        rows: vec![
            vec![
                InlineButton::new(
                    "✏️ Question",
                    &ButtonAction::EditPollQuestion {
                        poll_id: poll_id.clone(),
                    },
                ),
                InlineButton::new(
                    "➕ Option",
                    &ButtonAction::AddPollOption {
                        poll_id: poll_id.clone(),
                    },
                ),
                InlineButton::new(
                    "📝 Edit option",
                    &ButtonAction::EditPollOption {
                        poll_id: poll_id.clone(),
                    },
                ),
            ],
            vec![
                InlineButton::new(
                    "⏹️ Close",
                    &ButtonAction::ClosePoll {
                        poll_id: poll_id.clone(),
                    },
                ),
                InlineButton::new("🗑️ Delete", &ButtonAction::DeletePoll { poll_id }),
            ],
        ],
    }
}

pub fn conference_admin(conference: &Conference) -> Keyboard {
    let id = conference.id.clone();
    let toggle = if conference.is_active {
        InlineButton::new(
            "⏸️ Deactivate",
            &ButtonAction::SetConferenceActive {
                conference_id: id.clone(),
                active: false,
            },
        )
    } else {
        InlineButton::new(
            "▶️ Activate",
            &ButtonAction::SetConferenceActive {
                conference_id: id.clone(),
                active: true,
            },
        )
    };
    Keyboard::row([
        InlineButton::new(
            "✏️ Rename",
            &ButtonAction::RenameConference {
                conference_id: id.clone(),
            },
        ),
        toggle,
        InlineButton::new(
            "🗑️ Delete",
            &ButtonAction::DeleteConference { conference_id: id },
        ),
    ])
}

pub fn access_code_picker(conferences: &[Conference]) -> Keyboard {
    Keyboard::column(conferences.iter().map(|c| {
        InlineButton::new(
            &c.name,
            &ButtonAction::IssueAccessCode {
                conference_id: c.id.clone(),
            },
        )
    }))
}
