//! Pure dialog transition function
//!
//! Given the current session state, the acting user's context, and one
//! intent, decide the next state and the effects to run. No I/O happens here.

use super::keyboards;
use super::{
    ButtonAction, DialogContext, Effect, Intent, MenuCommand, PollDraft, PollEditMode,
    ProfileField, Reply, SessionState,
};
use crate::db::TagField;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Why an intent produced no transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// Nothing to do; no reply, state unchanged
    #[error("Event ignored")]
    Ignored,
    /// Input refused; the message is shown and the state is unchanged
    #[error("{0}")]
    Rejected(String),
}

fn rejected(msg: &str) -> TransitionError {
    TransitionError::Rejected(msg.to_string())
}

const NOT_ADMIN: &str = "⛔ This action is only available to administrators.";
const NO_CONFERENCE: &str =
    "You haven't joined a conference yet. Send /start to choose one.";
const NO_DRAFT: &str = "❌ No poll is being created right now.";

/// Pure transition function
pub fn transition(
    state: &SessionState,
    ctx: &DialogContext,
    intent: Intent,
) -> Result<TransitionResult, TransitionError> {
    match intent {
        Intent::Home => Ok(TransitionResult::new(SessionState::Idle).with_effect(
            Effect::Reply(
                Reply::text("🏠 Main menu").with_keyboard(keyboards::main_menu(ctx.is_admin)),
            ),
        )),

        Intent::Start { join: Some(code) } => Ok(TransitionResult::new(SessionState::Idle)
            .with_effect(Effect::RedeemAccessCode {
                conference_code: code.conference_code,
                access_code: code.access_code,
            })),

        Intent::Start { join: None } => {
            Ok(TransitionResult::new(SessionState::Idle).with_effect(Effect::Welcome))
        }

        Intent::Cancel if state.is_idle() => Err(TransitionError::Ignored),
        Intent::Cancel => Ok(TransitionResult::new(SessionState::Idle).with_effect(
            Effect::Reply(
                Reply::text("Cancelled.").with_keyboard(keyboards::main_menu(ctx.is_admin)),
            ),
        )),

        Intent::Menu(command) => {
            if command.requires_admin() && !ctx.is_admin {
                return Err(rejected(NOT_ADMIN));
            }
            menu(ctx, command)
        }

        Intent::Button(action) => {
            if action.requires_admin() && !ctx.is_admin {
                return Err(rejected(NOT_ADMIN));
            }
            button(state, ctx, action)
        }

        Intent::Text(text) => text_input(state, text),
        Intent::Photo(file_id) => photo_input(state, file_id),
        Intent::Unknown => Err(TransitionError::Ignored),
    }
}

// ============================================================================
// Menu selections: always allowed, overwrite the current state
// ============================================================================

fn menu(ctx: &DialogContext, command: MenuCommand) -> Result<TransitionResult, TransitionError> {
    let idle = |effect| Ok(TransitionResult::new(SessionState::Idle).with_effect(effect));
    let prompt = |state, text: &str| {
        Ok(TransitionResult::new(state).with_effect(Effect::Reply(
            Reply::text(text).with_keyboard(keyboards::back_menu()),
        )))
    };
    let needs_conference = || {
        if ctx.conference_id.is_none() {
            Err(rejected(NO_CONFERENCE))
        } else {
            Ok(())
        }
    };

    match command {
        MenuCommand::MyProfile => idle(Effect::ShowProfile),
        MenuCommand::FindPeople => {
            needs_conference()?;
            idle(Effect::FindMatches)
        }
        MenuCommand::ActivePolls => {
            needs_conference()?;
            idle(Effect::ShowActivePolls)
        }
        MenuCommand::AskSpeaker => {
            needs_conference()?;
            prompt(
                SessionState::AwaitingSpeakerName,
                "🎤 Enter the speaker's name:",
            )
        }
        MenuCommand::MyConnections => idle(Effect::ShowConnections),
        MenuCommand::FeaturedProfiles => {
            needs_conference()?;
            idle(Effect::ShowFeatured)
        }
        MenuCommand::MyChats => idle(Effect::ShowChats),
        MenuCommand::AdminPanel => idle(Effect::Reply(
            Reply::text("🛠️ Admin panel").with_keyboard(keyboards::admin_menu()),
        )),

        MenuCommand::EditPhoto => prompt(
            SessionState::AwaitingProfileField {
                field: ProfileField::Photo,
            },
            "📸 Send your new profile photo:",
        ),
        MenuCommand::EditContacts => idle(Effect::Reply(
            Reply::text("📞 Which contact would you like to change?")
                .with_keyboard(keyboards::contact_fields()),
        )),
        MenuCommand::EditInterests => tags_prompt(TagField::Interests),
        MenuCommand::EditOfferings => tags_prompt(TagField::Offerings),
        MenuCommand::EditLookingFor => tags_prompt(TagField::LookingFor),

        MenuCommand::CreatePoll => {
            needs_conference()?;
            prompt(
                SessionState::AwaitingAdminPollQuestion,
                "📊 Enter the poll question:",
            )
        }
        MenuCommand::ManageQuestions => {
            needs_conference()?;
            idle(Effect::ShowUnansweredQuestions)
        }
        MenuCommand::CreateConference => prompt(
            SessionState::AwaitingAdminConferenceName,
            "🏢 Enter the conference name:",
        ),
        MenuCommand::GenerateAccessCode => idle(Effect::ShowAccessCodePicker),
        MenuCommand::PollList => {
            needs_conference()?;
            idle(Effect::ShowPollList)
        }
        MenuCommand::ConferenceList => idle(Effect::ShowConferenceList),
    }
}

fn tags_prompt(field: TagField) -> Result<TransitionResult, TransitionError> {
    let what = match field {
        TagField::Interests => "your interests",
        TagField::Offerings => "what you can offer",
        TagField::LookingFor => "what you are looking for",
    };
    Ok(TransitionResult::new(SessionState::AwaitingProfileField {
        field: ProfileField::Tags(field),
    })
    .with_effect(Effect::Reply(
        Reply::text(format!("Enter {what}, separated by commas:"))
            .with_keyboard(keyboards::back_menu()),
    )))
}

// ============================================================================
// Button presses
// ============================================================================

fn button(
    state: &SessionState,
    ctx: &DialogContext,
    action: ButtonAction,
) -> Result<TransitionResult, TransitionError> {
    // One-shot actions leave any flow in progress untouched
    let same = |effect| Ok(TransitionResult::new(state.clone()).with_effect(effect));

    match action {
        ButtonAction::JoinConference { conference_id } => Ok(TransitionResult::new(
            SessionState::Idle,
        )
        .with_effect(Effect::JoinConference { conference_id })),

        ButtonAction::LeaveConference => {
            Ok(TransitionResult::new(SessionState::Idle).with_effect(Effect::LeaveConference))
        }

        ButtonAction::EditContact(field) => Ok(TransitionResult::new(
            SessionState::AwaitingProfileField {
                field: ProfileField::Contact(field),
            },
        )
        .with_effect(Effect::Reply(
            Reply::text(format!("Enter your {}:", field.label()))
                .with_keyboard(keyboards::back_menu()),
        ))),

        ButtonAction::Connect { user } if user == ctx.user_id => {
            Err(rejected("You can't connect with yourself."))
        }
        ButtonAction::Connect { user } => same(Effect::RequestConnection { target: user }),

        ButtonAction::Respond {
            connection_id,
            decision,
        } => same(Effect::RespondToConnection {
            connection_id,
            decision,
        }),

        ButtonAction::OpenChat { peer } if peer == ctx.user_id => Err(TransitionError::Ignored),
        ButtonAction::OpenChat { peer } => Ok(TransitionResult::new(
            SessionState::AwaitingChatMessage { peer },
        )
        .with_effect(Effect::OpenChat { peer })),

        ButtonAction::Vote { poll_id, option } => same(Effect::CastVote { poll_id, option }),

        ButtonAction::AddMoreOption => match state {
            SessionState::AwaitingPollOption { draft } if draft.is_full() => Err(rejected(
                &format!("A poll can have at most {} options.", super::MAX_POLL_OPTIONS),
            )),
            SessionState::AwaitingPollOption { draft } => same(Effect::reply(format!(
                "Enter option {}:",
                draft.options.len() + 1
            ))),
            _ => Ok(TransitionResult::new(SessionState::Idle).with_effect(Effect::reply(NO_DRAFT))),
        },

        ButtonAction::FinishPoll => match state {
            SessionState::AwaitingPollOption { draft } if !draft.is_complete() => Err(rejected(
                &format!("A poll needs at least {} options.", super::MIN_POLL_OPTIONS),
            )),
            SessionState::AwaitingPollOption { draft } => Ok(TransitionResult::new(
                SessionState::Idle,
            )
            .with_effect(Effect::CreatePoll {
                draft: draft.clone(),
            })),
            _ => Ok(TransitionResult::new(SessionState::Idle).with_effect(Effect::reply(NO_DRAFT))),
        },

        ButtonAction::IssueAccessCode { conference_id } => Ok(TransitionResult::new(
            SessionState::Idle,
        )
        .with_effect(Effect::IssueAccessCode { conference_id })),

        ButtonAction::AnswerQuestion { question_id } => Ok(TransitionResult::new(
            SessionState::AwaitingAnswerText {
                question_id: question_id.clone(),
            },
        )
        .with_effect(Effect::PromptAnswer { question_id })),

        ButtonAction::DeleteQuestion { question_id } => {
            same(Effect::DeleteQuestion { question_id })
        }

        ButtonAction::EditPollQuestion { poll_id } => poll_edit(poll_id, PollEditMode::Question),
        ButtonAction::AddPollOption { poll_id } => poll_edit(poll_id, PollEditMode::AddOption),
        ButtonAction::EditPollOption { poll_id } => {
            poll_edit(poll_id, PollEditMode::ChooseOption)
        }
        ButtonAction::ClosePoll { poll_id } => same(Effect::ClosePoll { poll_id }),
        ButtonAction::DeletePoll { poll_id } => same(Effect::DeletePoll { poll_id }),

        ButtonAction::RenameConference { conference_id } => Ok(TransitionResult::new(
            SessionState::AwaitingConferenceEdit {
                conference_id: conference_id.clone(),
            },
        )
        .with_effect(Effect::PromptConferenceRename { conference_id })),
        ButtonAction::DeleteConference { conference_id } => {
            same(Effect::DeleteConference { conference_id })
        }
        ButtonAction::SetConferenceActive {
            conference_id,
            active,
        } => same(Effect::SetConferenceActive {
            conference_id,
            active,
        }),
    }
}

fn poll_edit(poll_id: String, mode: PollEditMode) -> Result<TransitionResult, TransitionError> {
    Ok(TransitionResult::new(SessionState::AwaitingPollEdit {
        poll_id: poll_id.clone(),
        mode,
    })
    .with_effect(Effect::PromptPollEdit { poll_id, mode }))
}

// ============================================================================
// Raw input: consumed once by the flow in progress
// ============================================================================

fn text_input(state: &SessionState, text: String) -> Result<TransitionResult, TransitionError> {
    if state.is_idle() {
        return Err(TransitionError::Ignored);
    }
    if let SessionState::AwaitingProfileField {
        field: ProfileField::Photo,
    } = state
    {
        return Err(rejected("📸 Please send a photo."));
    }
    if text.is_empty() {
        return Err(rejected("Please send some text."));
    }

    let idle = |effect| Ok(TransitionResult::new(SessionState::Idle).with_effect(effect));

    match state {
        SessionState::Idle
        | SessionState::AwaitingProfileField {
            field: ProfileField::Photo,
        } => Err(TransitionError::Ignored),

        SessionState::AwaitingProfileField {
            field: ProfileField::Tags(field),
        } => {
            let tags = parse_tags(&text);
            if tags.is_empty() {
                return Err(rejected("Enter at least one item, separated by commas."));
            }
            idle(Effect::SaveTags {
                field: *field,
                tags,
            })
        }

        SessionState::AwaitingProfileField {
            field: ProfileField::Contact(field),
        } => idle(Effect::SaveContact {
            field: *field,
            value: text,
        }),

        SessionState::AwaitingSpeakerName => {
            let reply = Effect::reply(format!("✍️ Enter your question for {text}:"));
            Ok(TransitionResult::new(SessionState::AwaitingQuestionText { speaker: text })
                .with_effect(reply))
        }

        SessionState::AwaitingQuestionText { speaker } => idle(Effect::AskQuestion {
            speaker: speaker.clone(),
            text,
        }),

        SessionState::AwaitingChatMessage { peer } => {
            idle(Effect::SendMessage { peer: *peer, text })
        }

        SessionState::AwaitingAdminPollQuestion => Ok(TransitionResult::new(
            SessionState::AwaitingPollOption {
                draft: PollDraft::new(text),
            },
        )
        .with_effect(Effect::reply("Enter option 1:"))),

        SessionState::AwaitingPollOption { draft } => {
            if draft.is_full() {
                return Err(rejected(&format!(
                    "A poll can have at most {} options. Press Finish.",
                    super::MAX_POLL_OPTIONS
                )));
            }
            let mut draft = draft.clone();
            draft.options.push(text);

            let reply = if draft.is_complete() {
                Reply::text(format!(
                    "✅ Option {} added. Add another or finish the poll.",
                    draft.options.len()
                ))
                .with_keyboard(keyboards::poll_draft())
            } else {
                Reply::text(format!("Enter option {}:", draft.options.len() + 1))
            };
            Ok(TransitionResult::new(SessionState::AwaitingPollOption { draft })
                .with_effect(Effect::Reply(reply)))
        }

        SessionState::AwaitingAdminConferenceName => idle(Effect::CreateConference { name: text }),

        SessionState::AwaitingPollEdit { poll_id, mode } => match mode {
            PollEditMode::Question => idle(Effect::SetPollQuestion {
                poll_id: poll_id.clone(),
                text,
            }),
            PollEditMode::AddOption => idle(Effect::AddPollOption {
                poll_id: poll_id.clone(),
                text,
            }),
            PollEditMode::ChooseOption => match text.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(TransitionResult::new(state.clone()).with_effect(
                    Effect::SelectPollOption {
                        poll_id: poll_id.clone(),
                        index: n - 1,
                    },
                )),
                _ => Err(rejected("Send the number of the option to change.")),
            },
            PollEditMode::OptionText { index } => idle(Effect::SetPollOptionText {
                poll_id: poll_id.clone(),
                index: *index,
                text,
            }),
        },

        SessionState::AwaitingConferenceEdit { conference_id } => {
            idle(Effect::RenameConference {
                conference_id: conference_id.clone(),
                name: text,
            })
        }

        SessionState::AwaitingAnswerText { question_id } => idle(Effect::AnswerQuestion {
            question_id: question_id.clone(),
            answer: text,
        }),
    }
}

fn photo_input(state: &SessionState, file_id: String) -> Result<TransitionResult, TransitionError> {
    match state {
        SessionState::Idle => Err(TransitionError::Ignored),
        SessionState::AwaitingProfileField {
            field: ProfileField::Photo,
        } => Ok(TransitionResult::new(SessionState::Idle)
            .with_effect(Effect::SavePhoto { file_id })),
        _ => Err(rejected("Please send text.")),
    }
}

/// Comma-separated list, trimmed, without empties or duplicates
pub fn parse_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ContactField, Decision};
    use crate::dialog::{Keyboard, JoinCode};

    fn attendee() -> DialogContext {
        DialogContext::new(1, false, Some("conf".to_string()))
    }

    fn admin() -> DialogContext {
        DialogContext::new(1, true, Some("conf".to_string()))
    }

    fn text(s: &str) -> Intent {
        Intent::Text(s.to_string())
    }

    #[test]
    fn test_idle_text_is_silent() {
        let err = transition(&SessionState::Idle, &attendee(), text("hello")).unwrap_err();
        assert_eq!(err, TransitionError::Ignored);
        let err = transition(&SessionState::Idle, &attendee(), Intent::Unknown).unwrap_err();
        assert_eq!(err, TransitionError::Ignored);
    }

    #[test]
    fn test_home_discards_flow() {
        let state = SessionState::AwaitingPollOption {
            draft: PollDraft {
                question: "Q".to_string(),
                options: vec!["a".to_string()],
            },
        };
        let result = transition(&state, &admin(), Intent::Home).unwrap();
        assert_eq!(result.new_state, SessionState::Idle);
        let Effect::Reply(reply) = &result.effects[0] else {
            panic!("expected reply");
        };
        assert!(matches!(reply.keyboard, Some(Keyboard::Menu { .. })));
    }

    #[test]
    fn test_cancel() {
        let err = transition(&SessionState::Idle, &attendee(), Intent::Cancel).unwrap_err();
        assert_eq!(err, TransitionError::Ignored);

        let state = SessionState::AwaitingChatMessage { peer: 2 };
        let result = transition(&state, &attendee(), Intent::Cancel).unwrap();
        assert_eq!(result.new_state, SessionState::Idle);
    }

    #[test]
    fn test_start_with_join_code() {
        let intent = Intent::Start {
            join: Some(JoinCode {
                conference_code: "ABCDEF".to_string(),
                access_code: "12345678".to_string(),
            }),
        };
        let result = transition(&SessionState::AwaitingSpeakerName, &attendee(), intent).unwrap();
        assert_eq!(result.new_state, SessionState::Idle);
        assert_eq!(
            result.effects,
            vec![Effect::RedeemAccessCode {
                conference_code: "ABCDEF".to_string(),
                access_code: "12345678".to_string(),
            }]
        );
    }

    #[test]
    fn test_menu_overwrites_state() {
        let state = SessionState::AwaitingQuestionText {
            speaker: "Grace".to_string(),
        };
        let result =
            transition(&state, &attendee(), Intent::Menu(MenuCommand::FindPeople)).unwrap();
        assert_eq!(result.new_state, SessionState::Idle);
        assert_eq!(result.effects, vec![Effect::FindMatches]);
    }

    #[test]
    fn test_admin_commands_require_flag() {
        for command in MenuCommand::ALL.into_iter().filter(|c| c.requires_admin()) {
            let err =
                transition(&SessionState::Idle, &attendee(), Intent::Menu(command)).unwrap_err();
            assert!(matches!(err, TransitionError::Rejected(_)));
        }
        let err = transition(
            &SessionState::Idle,
            &attendee(),
            Intent::Button(ButtonAction::DeletePoll {
                poll_id: "p".to_string(),
            }),
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::Rejected(_)));
    }

    #[test]
    fn test_conference_required() {
        let ctx = DialogContext::new(1, false, None);
        let err =
            transition(&SessionState::Idle, &ctx, Intent::Menu(MenuCommand::FindPeople))
                .unwrap_err();
        assert_eq!(err, TransitionError::Rejected(NO_CONFERENCE.to_string()));

        // Profile does not need one
        assert!(transition(&SessionState::Idle, &ctx, Intent::Menu(MenuCommand::MyProfile)).is_ok());
    }

    #[test]
    fn test_poll_creation_flow() {
        let ctx = admin();
        let r = transition(&SessionState::Idle, &ctx, Intent::Menu(MenuCommand::CreatePoll))
            .unwrap();
        assert_eq!(r.new_state, SessionState::AwaitingAdminPollQuestion);

        let r = transition(&r.new_state, &ctx, text("What's your favorite track?")).unwrap();
        assert_eq!(
            r.new_state,
            SessionState::AwaitingPollOption {
                draft: PollDraft::new("What's your favorite track?")
            }
        );

        let r = transition(&r.new_state, &ctx, text("Systems")).unwrap();
        let one_option = r.new_state.clone();

        // Finishing with one option is refused and leaves the draft alone
        let err = transition(&one_option, &ctx, Intent::Button(ButtonAction::FinishPoll))
            .unwrap_err();
        assert!(matches!(err, TransitionError::Rejected(_)));

        let r = transition(&one_option, &ctx, text("Web")).unwrap();
        let SessionState::AwaitingPollOption { draft } = &r.new_state else {
            panic!("expected draft state");
        };
        assert_eq!(draft.options, vec!["Systems", "Web"]);

        let r = transition(&r.new_state, &ctx, Intent::Button(ButtonAction::FinishPoll)).unwrap();
        assert_eq!(r.new_state, SessionState::Idle);
        assert!(matches!(&r.effects[0], Effect::CreatePoll { draft } if draft.options.len() == 2));
    }

    #[test]
    fn test_sixth_option_rejected() {
        let state = SessionState::AwaitingPollOption {
            draft: PollDraft {
                question: "Q".to_string(),
                options: (1..=5).map(|i| i.to_string()).collect(),
            },
        };
        let err = transition(&state, &admin(), text("six")).unwrap_err();
        assert!(matches!(err, TransitionError::Rejected(_)));
        let err = transition(&state, &admin(), Intent::Button(ButtonAction::AddMoreOption))
            .unwrap_err();
        assert!(matches!(err, TransitionError::Rejected(_)));
    }

    #[test]
    fn test_finish_without_draft_resets() {
        let r = transition(
            &SessionState::AwaitingSpeakerName,
            &admin(),
            Intent::Button(ButtonAction::FinishPoll),
        )
        .unwrap();
        assert_eq!(r.new_state, SessionState::Idle);
        assert_eq!(r.effects, vec![Effect::reply(NO_DRAFT)]);
    }

    #[test]
    fn test_one_shot_buttons_keep_flow() {
        let state = SessionState::AwaitingSpeakerName;
        let r = transition(
            &state,
            &attendee(),
            Intent::Button(ButtonAction::Vote {
                poll_id: "p".to_string(),
                option: 0,
            }),
        )
        .unwrap();
        assert_eq!(r.new_state, state);

        let r = transition(
            &state,
            &attendee(),
            Intent::Button(ButtonAction::Respond {
                connection_id: "c".to_string(),
                decision: Decision::Accept,
            }),
        )
        .unwrap();
        assert_eq!(r.new_state, state);
    }

    #[test]
    fn test_connect_to_self_rejected() {
        let err = transition(
            &SessionState::Idle,
            &attendee(),
            Intent::Button(ButtonAction::Connect { user: 1 }),
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::Rejected(_)));
    }

    #[test]
    fn test_question_flow() {
        let ctx = attendee();
        let r = transition(&SessionState::Idle, &ctx, Intent::Menu(MenuCommand::AskSpeaker))
            .unwrap();
        let r = transition(&r.new_state, &ctx, text("Grace")).unwrap();
        assert_eq!(
            r.new_state,
            SessionState::AwaitingQuestionText {
                speaker: "Grace".to_string()
            }
        );
        let r = transition(&r.new_state, &ctx, text("How?")).unwrap();
        assert_eq!(r.new_state, SessionState::Idle);
        assert_eq!(
            r.effects,
            vec![Effect::AskQuestion {
                speaker: "Grace".to_string(),
                text: "How?".to_string()
            }]
        );
    }

    #[test]
    fn test_profile_edits() {
        let ctx = attendee();
        let photo = SessionState::AwaitingProfileField {
            field: ProfileField::Photo,
        };
        assert!(matches!(
            transition(&photo, &ctx, text("not a photo")).unwrap_err(),
            TransitionError::Rejected(_)
        ));
        let r = transition(&photo, &ctx, Intent::Photo("f1".to_string())).unwrap();
        assert_eq!(
            r.effects,
            vec![Effect::SavePhoto {
                file_id: "f1".to_string()
            }]
        );

        let tags = SessionState::AwaitingProfileField {
            field: ProfileField::Tags(TagField::Interests),
        };
        let r = transition(&tags, &ctx, text("rust, ai ,, rust")).unwrap();
        assert_eq!(
            r.effects,
            vec![Effect::SaveTags {
                field: TagField::Interests,
                tags: vec!["rust".to_string(), "ai".to_string()]
            }]
        );
        assert!(transition(&tags, &ctx, text(" , ")).is_err());

        let r = transition(
            &SessionState::Idle,
            &ctx,
            Intent::Button(ButtonAction::EditContact(ContactField::Email)),
        )
        .unwrap();
        let r = transition(&r.new_state, &ctx, text("a@b.c")).unwrap();
        assert_eq!(
            r.effects,
            vec![Effect::SaveContact {
                field: ContactField::Email,
                value: "a@b.c".to_string()
            }]
        );
    }

    #[test]
    fn test_choose_option_number() {
        let state = SessionState::AwaitingPollEdit {
            poll_id: "p".to_string(),
            mode: PollEditMode::ChooseOption,
        };
        let r = transition(&state, &admin(), text("2")).unwrap();
        assert_eq!(r.new_state, state);
        assert_eq!(
            r.effects,
            vec![Effect::SelectPollOption {
                poll_id: "p".to_string(),
                index: 1
            }]
        );
        assert!(transition(&state, &admin(), text("0")).is_err());
        assert!(transition(&state, &admin(), text("two")).is_err());
    }
}
