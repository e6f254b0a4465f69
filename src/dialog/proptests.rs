//! Property-based tests for the dialog state machine

use super::*;
use crate::db::{ContactField, Decision, TagField};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,]{0,20}"
}

fn arb_id() -> impl Strategy<Value = String> {
    "[a-f0-9]{8}"
}

fn arb_tag_field() -> impl Strategy<Value = TagField> {
    prop_oneof![
        Just(TagField::Interests),
        Just(TagField::Offerings),
        Just(TagField::LookingFor),
    ]
}

fn arb_contact_field() -> impl Strategy<Value = ContactField> {
    prop::sample::select(ContactField::ALL.to_vec())
}

fn arb_profile_field() -> impl Strategy<Value = ProfileField> {
    prop_oneof![
        Just(ProfileField::Photo),
        arb_tag_field().prop_map(ProfileField::Tags),
        arb_contact_field().prop_map(ProfileField::Contact),
    ]
}

fn arb_draft() -> impl Strategy<Value = PollDraft> {
    (arb_text(), prop::collection::vec(arb_text(), 0..=MAX_POLL_OPTIONS))
        .prop_map(|(question, options)| PollDraft { question, options })
}

fn arb_edit_mode() -> impl Strategy<Value = PollEditMode> {
    prop_oneof![
        Just(PollEditMode::Question),
        Just(PollEditMode::AddOption),
        Just(PollEditMode::ChooseOption),
        (0usize..5).prop_map(|index| PollEditMode::OptionText { index }),
    ]
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::Idle),
        arb_profile_field().prop_map(|field| SessionState::AwaitingProfileField { field }),
        Just(SessionState::AwaitingSpeakerName),
        arb_text().prop_map(|speaker| SessionState::AwaitingQuestionText { speaker }),
        (2i64..10).prop_map(|peer| SessionState::AwaitingChatMessage { peer }),
        Just(SessionState::AwaitingAdminPollQuestion),
        arb_draft().prop_map(|draft| SessionState::AwaitingPollOption { draft }),
        Just(SessionState::AwaitingAdminConferenceName),
        (arb_id(), arb_edit_mode())
            .prop_map(|(poll_id, mode)| SessionState::AwaitingPollEdit { poll_id, mode }),
        arb_id().prop_map(|conference_id| SessionState::AwaitingConferenceEdit { conference_id }),
        arb_id().prop_map(|question_id| SessionState::AwaitingAnswerText { question_id }),
    ]
}

fn arb_button() -> impl Strategy<Value = ButtonAction> {
    prop_oneof![
        arb_id().prop_map(|conference_id| ButtonAction::JoinConference { conference_id }),
        Just(ButtonAction::LeaveConference),
        arb_contact_field().prop_map(ButtonAction::EditContact),
        (1i64..10).prop_map(|user| ButtonAction::Connect { user }),
        (arb_id(), any::<bool>()).prop_map(|(connection_id, accept)| ButtonAction::Respond {
            connection_id,
            decision: if accept { Decision::Accept } else { Decision::Reject },
        }),
        (1i64..10).prop_map(|peer| ButtonAction::OpenChat { peer }),
        (arb_id(), 0usize..6).prop_map(|(poll_id, option)| ButtonAction::Vote { poll_id, option }),
        Just(ButtonAction::AddMoreOption),
        Just(ButtonAction::FinishPoll),
        arb_id().prop_map(|conference_id| ButtonAction::IssueAccessCode { conference_id }),
        arb_id().prop_map(|question_id| ButtonAction::AnswerQuestion { question_id }),
        arb_id().prop_map(|question_id| ButtonAction::DeleteQuestion { question_id }),
        arb_id().prop_map(|poll_id| ButtonAction::EditPollQuestion { poll_id }),
        arb_id().prop_map(|poll_id| ButtonAction::AddPollOption { poll_id }),
        arb_id().prop_map(|poll_id| ButtonAction::EditPollOption { poll_id }),
        arb_id().prop_map(|poll_id| ButtonAction::ClosePoll { poll_id }),
        arb_id().prop_map(|poll_id| ButtonAction::DeletePoll { poll_id }),
        arb_id().prop_map(|conference_id| ButtonAction::RenameConference { conference_id }),
        arb_id().prop_map(|conference_id| ButtonAction::DeleteConference { conference_id }),
        (arb_id(), any::<bool>()).prop_map(|(conference_id, active)| {
            ButtonAction::SetConferenceActive {
                conference_id,
                active,
            }
        }),
    ]
}

fn arb_intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        Just(Intent::Home),
        Just(Intent::Cancel),
        Just(Intent::Unknown),
        Just(Intent::Start { join: None }),
        prop::sample::select(MenuCommand::ALL.to_vec()).prop_map(Intent::Menu),
        arb_button().prop_map(Intent::Button),
        arb_text().prop_map(Intent::Text),
        arb_id().prop_map(Intent::Photo),
    ]
}

fn arb_context() -> impl Strategy<Value = DialogContext> {
    (any::<bool>(), prop::option::of(arb_id()))
        .prop_map(|(is_admin, conference_id)| DialogContext::new(1, is_admin, conference_id))
}

fn is_admin_effect(effect: &Effect) -> bool {
    matches!(
        effect,
        Effect::CreatePoll { .. }
            | Effect::CreateConference { .. }
            | Effect::ShowAccessCodePicker
            | Effect::IssueAccessCode { .. }
            | Effect::ShowUnansweredQuestions
            | Effect::PromptAnswer { .. }
            | Effect::AnswerQuestion { .. }
            | Effect::DeleteQuestion { .. }
            | Effect::ShowPollList
            | Effect::PromptPollEdit { .. }
            | Effect::SetPollQuestion { .. }
            | Effect::AddPollOption { .. }
            | Effect::SelectPollOption { .. }
            | Effect::SetPollOptionText { .. }
            | Effect::ClosePoll { .. }
            | Effect::DeletePoll { .. }
            | Effect::ShowConferenceList
            | Effect::PromptConferenceRename { .. }
            | Effect::RenameConference { .. }
            | Effect::DeleteConference { .. }
            | Effect::SetConferenceActive { .. }
    )
}

fn is_admin_state(state: &SessionState) -> bool {
    matches!(
        state,
        SessionState::AwaitingAdminPollQuestion
            | SessionState::AwaitingPollOption { .. }
            | SessionState::AwaitingAdminConferenceName
            | SessionState::AwaitingPollEdit { .. }
            | SessionState::AwaitingConferenceEdit { .. }
            | SessionState::AwaitingAnswerText { .. }
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_home_always_resets(state in arb_state(), ctx in arb_context()) {
        let result = transition(&state, &ctx, Intent::Home).unwrap();
        prop_assert_eq!(result.new_state, SessionState::Idle);
    }

    #[test]
    fn prop_idle_free_input_is_silent(ctx in arb_context(), text in arb_text(), photo in arb_id()) {
        prop_assert_eq!(
            transition(&SessionState::Idle, &ctx, Intent::Text(text)).unwrap_err(),
            TransitionError::Ignored
        );
        prop_assert_eq!(
            transition(&SessionState::Idle, &ctx, Intent::Photo(photo)).unwrap_err(),
            TransitionError::Ignored
        );
    }

    #[test]
    fn prop_draft_stays_within_bounds(
        draft in arb_draft(),
        inputs in prop::collection::vec(arb_text(), 0..10),
    ) {
        let ctx = DialogContext::new(1, true, Some("conf".to_string()));
        let mut state = SessionState::AwaitingPollOption { draft };
        for text in inputs {
            if let Ok(result) = transition(&state, &ctx, Intent::Text(text)) {
                state = result.new_state;
            }
            if let SessionState::AwaitingPollOption { draft } = &state {
                prop_assert!(draft.options.len() <= MAX_POLL_OPTIONS);
            }
        }
    }

    #[test]
    fn prop_finished_polls_have_enough_options(state in arb_state(), ctx in arb_context()) {
        if let Ok(result) = transition(&state, &ctx, Intent::Button(ButtonAction::FinishPoll)) {
            for effect in &result.effects {
                if let Effect::CreatePoll { draft } = effect {
                    prop_assert!(draft.options.len() >= MIN_POLL_OPTIONS);
                    prop_assert!(draft.options.len() <= MAX_POLL_OPTIONS);
                }
            }
            prop_assert_eq!(result.new_state, SessionState::Idle);
        }
    }

    #[test]
    fn prop_non_admin_gets_no_admin_effects(state in arb_state(), intent in arb_intent()) {
        prop_assume!(!is_admin_state(&state));
        let ctx = DialogContext::new(1, false, Some("conf".to_string()));
        if let Ok(result) = transition(&state, &ctx, intent) {
            prop_assert!(!result.effects.iter().any(is_admin_effect));
            prop_assert!(!is_admin_state(&result.new_state));
        }
    }

    #[test]
    fn prop_menu_commands_leave_no_stale_context(
        state in arb_state(),
        ctx in arb_context(),
        command in prop::sample::select(MenuCommand::ALL.to_vec()),
    ) {
        if let Ok(result) = transition(&state, &ctx, Intent::Menu(command)) {
            // A menu selection starts fresh: either idle or the first step of a new flow
            let fresh = matches!(
                result.new_state,
                SessionState::Idle
                    | SessionState::AwaitingProfileField { .. }
                    | SessionState::AwaitingSpeakerName
                    | SessionState::AwaitingAdminPollQuestion
                    | SessionState::AwaitingAdminConferenceName
            );
            prop_assert!(fresh, "menu left stale state: {:?}", result.new_state);
        }
    }

    #[test]
    fn prop_transition_is_deterministic(
        state in arb_state(),
        ctx in arb_context(),
        intent in arb_intent(),
    ) {
        let a = transition(&state, &ctx, intent.clone());
        let b = transition(&state, &ctx, intent);
        match (a, b) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.new_state, b.new_state);
                prop_assert_eq!(a.effects, b.effects);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "transition is not deterministic"),
        }
    }

    #[test]
    fn prop_cancel_outside_idle_resets(state in arb_state(), ctx in arb_context()) {
        prop_assume!(!state.is_idle());
        let result = transition(&state, &ctx, Intent::Cancel).unwrap();
        prop_assert_eq!(result.new_state, SessionState::Idle);
    }
}
