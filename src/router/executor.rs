//! Effect execution against storage and the ledgers

use super::{DialogRouter, DispatchError, Outcome};
use crate::db::{
    Conference, ConnectionStatus, ContactField, Decision, DbError, Profile, TagField, UserId,
};
use crate::dialog::{
    keyboards, views, Effect, JoinCode, PollDraft, PollEditMode, Reply, SessionState,
    MAX_POLL_OPTIONS,
};
use crate::ledger::PollTally;
use crate::matching::rank_candidates;

const MAX_MATCHES: usize = 10;
const FEATURED_COUNT: usize = 3;
const CHAT_HISTORY: usize = 10;
const QUESTION_PAGE: usize = 10;

type EffectResult = Result<Outcome, DispatchError>;

impl DialogRouter {
    pub(super) async fn execute_effect(&self, actor: &Profile, effect: Effect) -> EffectResult {
        match effect {
            Effect::Reply(reply) => Ok(Outcome::reply(reply)),

            // Conference membership
            Effect::Welcome => self.welcome(actor),
            Effect::RedeemAccessCode {
                conference_code,
                access_code,
            } => {
                let conference =
                    self.db
                        .redeem_access_code(actor.user_id, &conference_code, &access_code)?;
                tracing::info!(user_id = actor.user_id, conference_id = %conference.id, "Access code redeemed");
                Ok(Outcome::reply(joined(&conference, actor.is_admin)))
            }
            Effect::JoinConference { conference_id } => {
                let conference = self.db.join_conference(actor.user_id, &conference_id)?;
                tracing::info!(user_id = actor.user_id, %conference_id, "Joined conference");
                Ok(Outcome::reply(joined(&conference, actor.is_admin)))
            }
            Effect::LeaveConference => {
                self.db.set_profile_conference(actor.user_id, None)?;
                tracing::info!(user_id = actor.user_id, "Left conference");
                Ok(Outcome::reply(
                    Reply::text("🚪 You left the conference. Send /start to choose another one.")
                        .with_keyboard(keyboards::main_menu(actor.is_admin)),
                ))
            }

            // Profile
            Effect::ShowProfile => {
                let conference = self.actor_conference(actor)?;
                Ok(Outcome::reply(
                    Reply::text(views::profile(actor, conference.as_ref()))
                        .with_photo(actor.photo.clone())
                        .with_keyboard(keyboards::profile_menu()),
                ))
            }
            Effect::SavePhoto { file_id } => {
                self.db.set_profile_photo(actor.user_id, &file_id)?;
                Ok(Outcome::reply(
                    Reply::text("✅ Photo updated!").with_keyboard(keyboards::profile_menu()),
                ))
            }
            Effect::SaveTags { field, tags } => {
                self.db.set_profile_tags(actor.user_id, field, &tags)?;
                Ok(Outcome::reply(
                    Reply::text(format!("✅ {} saved: {}", tag_label(field), tags.join(", ")))
                        .with_keyboard(keyboards::profile_menu()),
                ))
            }
            Effect::SaveContact { field, value } => {
                validate_contact(field, &value)?;
                self.db.set_profile_contact(actor.user_id, field, &value)?;
                Ok(Outcome::reply(
                    Reply::text(format!("✅ {} saved.", field.label()))
                        .with_keyboard(keyboards::profile_menu()),
                ))
            }

            // Networking
            Effect::FindMatches => self.find_matches(actor),
            Effect::ShowConnections => self.show_connections(actor),
            Effect::ShowFeatured => self.show_featured(actor),
            Effect::ShowChats => self.show_chats(actor),
            Effect::RequestConnection { target } => {
                self.connections.request(actor, target).await?;
                Ok(Outcome::reply(Reply::text("✅ Connection request sent!")))
            }
            Effect::RespondToConnection {
                connection_id,
                decision,
            } => {
                let connection = self
                    .connections
                    .respond(&connection_id, actor, decision)
                    .await?;
                let reply = match decision {
                    Decision::Accept => self.accepted_reply(&connection.id, connection.requester),
                    Decision::Reject => Reply::text("Request declined."),
                };
                Ok(Outcome::reply(reply))
            }
            Effect::OpenChat { peer } => self.open_chat(actor, peer),
            Effect::SendMessage { peer, text } => {
                self.connections.send_message(actor, peer, &text).await?;
                Ok(Outcome::reply(
                    Reply::text("✅ Message sent!")
                        .with_keyboard(keyboards::main_menu(actor.is_admin)),
                ))
            }

            // Polls and questions
            Effect::ShowActivePolls => self.show_active_polls(actor),
            Effect::CastVote { poll_id, option } => {
                // Polls of other conferences are invisible to the voter
                let poll = self.db.get_poll(&poll_id)?;
                if actor.conference_id.as_deref() != Some(poll.conference_id.as_str()) {
                    return Err(DispatchError::NotFound("poll"));
                }
                let tally = self.polls.cast_vote(&poll_id, option, actor.user_id)?;
                Ok(Outcome::reply(Reply::text(format!(
                    "✅ Your vote is counted!\n\n{}",
                    views::poll_results(&tally)
                ))))
            }
            Effect::AskQuestion { speaker, text } => {
                self.questions.ask(actor, &speaker, &text).await?;
                Ok(Outcome::reply(
                    Reply::text("✅ Your question has been sent to the organizers!")
                        .with_keyboard(keyboards::main_menu(actor.is_admin)),
                ))
            }

            // Admin
            Effect::CreatePoll { draft } => self.create_poll(actor, draft).await,
            Effect::CreateConference { name } => {
                let conference = self.db.create_conference(&name, actor.user_id, true)?;
                tracing::info!(conference_id = %conference.id, created_by = actor.user_id, "Conference created");
                Ok(Outcome::reply(
                    Reply::text(format!(
                        "✅ Conference created!\n\n{}",
                        views::conference_admin(&conference)
                    ))
                    .with_keyboard(keyboards::admin_menu()),
                ))
            }
            Effect::ShowAccessCodePicker => {
                let conferences: Vec<Conference> = self
                    .db
                    .list_conferences()?
                    .into_iter()
                    .filter(|c| c.is_active)
                    .collect();
                if conferences.is_empty() {
                    return Ok(Outcome::reply(Reply::text(
                        "No active conferences. Create one first.",
                    )));
                }
                Ok(Outcome::reply(
                    Reply::text("🔑 Choose a conference for the access code:")
                        .with_keyboard(keyboards::access_code_picker(&conferences)),
                ))
            }
            Effect::IssueAccessCode { conference_id } => {
                let conference = self.db.get_conference(&conference_id)?;
                let code = self.db.create_access_code(
                    &conference.id,
                    actor.user_id,
                    self.settings.access_code_ttl,
                )?;
                tracing::info!(%conference_id, created_by = actor.user_id, "Access code issued");
                let link = self.join_link(&conference, &code.code);
                Ok(Outcome::reply(Reply::text(views::access_code(
                    &code,
                    &conference,
                    &link,
                ))))
            }
            Effect::ShowUnansweredQuestions => {
                let conference_id = require_conference(actor)?;
                let questions = self
                    .db
                    .list_unanswered_questions(conference_id, Some(QUESTION_PAGE))?;
                if questions.is_empty() {
                    return Ok(Outcome::reply(Reply::text("✅ No unanswered questions.")));
                }
                Ok(Outcome::replies(
                    questions
                        .iter()
                        .map(|q| {
                            Reply::text(views::question(q))
                                .with_keyboard(keyboards::question_actions(&q.id))
                        })
                        .collect(),
                ))
            }
            Effect::PromptAnswer { question_id } => {
                let question = self.db.get_question(&question_id)?;
                Ok(Outcome::reply(
                    Reply::text(format!(
                        "{}\n\n✍️ Enter your answer:",
                        views::question(&question)
                    ))
                    .with_keyboard(keyboards::back_menu()),
                ))
            }
            Effect::AnswerQuestion {
                question_id,
                answer,
            } => {
                self.questions.answer(&question_id, &answer, actor).await?;
                Ok(Outcome::reply(
                    Reply::text("✅ Answer sent to the participant.")
                        .with_keyboard(keyboards::admin_menu()),
                ))
            }
            Effect::DeleteQuestion { question_id } => {
                self.questions.delete(&question_id)?;
                Ok(Outcome::reply(Reply::text("🗑️ Question deleted.")))
            }
            Effect::ShowPollList => {
                let conference_id = require_conference(actor)?;
                let polls = self.db.list_polls(conference_id, false)?;
                if polls.is_empty() {
                    return Ok(Outcome::reply(Reply::text("No polls yet.")));
                }
                Ok(Outcome::replies(
                    polls
                        .iter()
                        .map(|p| {
                            Reply::text(views::poll_admin(p))
                                .with_keyboard(keyboards::poll_admin(&p.id))
                        })
                        .collect(),
                ))
            }
            Effect::PromptPollEdit { poll_id, mode } => self.prompt_poll_edit(&poll_id, mode),
            Effect::SetPollQuestion { poll_id, text } => {
                self.polls.set_question(&poll_id, &text)?;
                Ok(admin_done("✅ Poll question updated."))
            }
            Effect::AddPollOption { poll_id, text } => {
                let poll = self.db.get_poll(&poll_id)?;
                if poll.options.len() >= MAX_POLL_OPTIONS {
                    return Err(too_many_options());
                }
                self.polls.add_option(&poll_id, &text)?;
                Ok(admin_done("✅ Option added."))
            }
            Effect::SelectPollOption { poll_id, index } => {
                let poll = self.db.get_poll(&poll_id)?;
                let Some(option) = poll.options.get(index) else {
                    return Err(DbError::OptionOutOfRange { index }.into());
                };
                Ok(Outcome::reply(Reply::text(format!(
                    "Current text of option {}: {}\n✍️ Enter the new text:",
                    index + 1,
                    option.text
                )))
                .then(SessionState::AwaitingPollEdit {
                    poll_id,
                    mode: PollEditMode::OptionText { index },
                }))
            }
            Effect::SetPollOptionText {
                poll_id,
                index,
                text,
            } => {
                self.polls.set_option_text(&poll_id, index, &text)?;
                Ok(admin_done("✅ Option updated."))
            }
            Effect::ClosePoll { poll_id } => {
                self.polls.close(&poll_id)?;
                Ok(Outcome::reply(Reply::text("⏹️ Poll closed.")))
            }
            Effect::DeletePoll { poll_id } => {
                self.polls.delete(&poll_id)?;
                Ok(Outcome::reply(Reply::text("🗑️ Poll deleted.")))
            }
            Effect::ShowConferenceList => {
                let conferences = self.db.list_conferences()?;
                if conferences.is_empty() {
                    return Ok(Outcome::reply(Reply::text("No conferences yet.")));
                }
                Ok(Outcome::replies(
                    conferences
                        .iter()
                        .map(|c| {
                            Reply::text(views::conference_admin(c))
                                .with_keyboard(keyboards::conference_admin(c))
                        })
                        .collect(),
                ))
            }
            Effect::PromptConferenceRename { conference_id } => {
                let conference = self.db.get_conference(&conference_id)?;
                Ok(Outcome::reply(
                    Reply::text(format!(
                        "Current name: {}\n✍️ Enter the new name:",
                        conference.name
                    ))
                    .with_keyboard(keyboards::back_menu()),
                ))
            }
            Effect::RenameConference {
                conference_id,
                name,
            } => {
                let conference = self.db.rename_conference(&conference_id, &name)?;
                tracing::info!(%conference_id, "Conference renamed");
                Ok(admin_done(&format!(
                    "✅ Conference renamed to {}.",
                    conference.name
                )))
            }
            Effect::DeleteConference { conference_id } => {
                self.db.delete_conference(&conference_id)?;
                tracing::info!(%conference_id, "Conference deleted");
                Ok(Outcome::reply(Reply::text("🗑️ Conference deleted.")))
            }
            Effect::SetConferenceActive {
                conference_id,
                active,
            } => {
                let conference = self.db.set_conference_active(&conference_id, active)?;
                tracing::info!(%conference_id, active, "Conference status changed");
                let text = if conference.is_active {
                    "▶️ Conference activated."
                } else {
                    "⏸️ Conference deactivated."
                };
                Ok(Outcome::reply(Reply::text(text)))
            }
        }
    }

    // ========================================================================
    // Membership
    // ========================================================================

    fn welcome(&self, actor: &Profile) -> EffectResult {
        if let Some(conference) = self.actor_conference(actor)? {
            return Ok(Outcome::replies(vec![
                Reply::text(format!(
                    "👋 Welcome back, {}! You are at {}.",
                    actor.first_name, conference.name
                ))
                .with_keyboard(keyboards::main_menu(actor.is_admin)),
                Reply::text("Want to switch conferences?")
                    .with_keyboard(keyboards::leave_conference()),
            ]));
        }

        let conferences = self.db.list_public_conferences(true)?;
        if conferences.is_empty() {
            return Ok(Outcome::reply(
                Reply::text(format!(
                    "👋 Welcome, {}! No conferences are open right now. \
                     Ask an organizer for an access code.",
                    actor.first_name
                ))
                .with_keyboard(keyboards::main_menu(actor.is_admin)),
            ));
        }
        Ok(Outcome::reply(
            Reply::text(format!(
                "👋 Welcome, {}! Choose your conference:",
                actor.first_name
            ))
            .with_keyboard(keyboards::conference_picker(&conferences)),
        ))
    }

    /// The actor's conference; a dangling reference reads as none
    fn actor_conference(&self, actor: &Profile) -> Result<Option<Conference>, DispatchError> {
        let Some(conference_id) = actor.conference_id.as_deref() else {
            return Ok(None);
        };
        match self.db.get_conference(conference_id) {
            Ok(conference) => Ok(Some(conference)),
            Err(DbError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn join_link(&self, conference: &Conference, access_code: &str) -> String {
        let start = JoinCode {
            conference_code: conference.code.clone(),
            access_code: access_code.to_string(),
        }
        .encode();
        match &self.settings.bot_link {
            Some(base) => format!("{base}?start={start}"),
            None => format!("/start {start}"),
        }
    }

    // ========================================================================
    // Networking
    // ========================================================================

    fn find_matches(&self, actor: &Profile) -> EffectResult {
        let conference_id = require_conference(actor)?;
        let pool = self.db.list_active_profiles(conference_id)?;
        let excluded = self.db.connected_peer_ids(actor.user_id)?;
        let matches = rank_candidates(actor, &pool, &excluded);
        tracing::debug!(user_id = actor.user_id, candidates = pool.len(), matches = matches.len(), "Ranked candidates");

        if matches.is_empty() {
            let hint = if actor.interests.is_empty() {
                "😔 No matches yet. Add your interests to the profile so we can find people for you."
            } else {
                "😔 No matches right now. Try adding more interests or check back later."
            };
            return Ok(Outcome::reply(Reply::text(hint)));
        }

        let mut replies = vec![Reply::text(format!(
            "🔍 Found {} people with common interests:",
            matches.len().min(MAX_MATCHES)
        ))];
        replies.extend(matches.iter().take(MAX_MATCHES).map(|m| {
            Reply::text(views::match_card(m))
                .with_photo(m.profile.photo.clone())
                .with_keyboard(keyboards::connect(m.profile.user_id))
        }));
        Ok(Outcome::replies(replies))
    }

    fn show_connections(&self, actor: &Profile) -> EffectResult {
        let connections = self
            .db
            .list_connections(actor.user_id, Some(ConnectionStatus::Accepted))?;
        if connections.is_empty() {
            return Ok(Outcome::reply(Reply::text(
                "You have no connections yet. Use 🔍 Find people to meet someone!",
            )));
        }

        let mut replies = Vec::with_capacity(connections.len());
        for connection in &connections {
            let Some(peer_id) = connection.peer_of(actor.user_id) else {
                continue;
            };
            let peer = self.optional_profile(peer_id)?;
            replies.push(
                Reply::text(views::connection_line(connection, actor.user_id, peer.as_ref()))
                    .with_keyboard(keyboards::open_chat(peer_id, "💬 Write")),
            );
        }
        Ok(Outcome::replies(replies))
    }

    fn show_featured(&self, actor: &Profile) -> EffectResult {
        let conference_id = require_conference(actor)?;
        let featured: Vec<Profile> = self
            .db
            .list_active_profiles(conference_id)?
            .into_iter()
            .filter(|p| p.user_id != actor.user_id)
            .take(FEATURED_COUNT)
            .collect();
        if featured.is_empty() {
            return Ok(Outcome::reply(Reply::text(
                "No other participants have joined yet.",
            )));
        }

        let mut replies = vec![Reply::text("⭐ Featured participants:")];
        replies.extend(featured.iter().map(|p| {
            Reply::text(views::profile_card(p))
                .with_photo(p.photo.clone())
                .with_keyboard(keyboards::connect(p.user_id))
        }));
        Ok(Outcome::replies(replies))
    }

    fn show_chats(&self, actor: &Profile) -> EffectResult {
        let chats = self.db.list_chats(actor.user_id)?;
        if chats.is_empty() {
            return Ok(Outcome::reply(Reply::text("💬 No chats yet.")));
        }

        let mut replies = Vec::with_capacity(chats.len());
        for chat in &chats {
            let Some(peer_id) = chat.peer_of(actor.user_id) else {
                continue;
            };
            let peer_name = self.peer_name(peer_id)?;
            replies.push(
                Reply::text(views::chat_preview(chat, &peer_name))
                    .with_keyboard(keyboards::open_chat(peer_id, "Open chat")),
            );
        }
        Ok(Outcome::replies(replies))
    }

    fn open_chat(&self, actor: &Profile, peer: UserId) -> EffectResult {
        let connection = match self.db.find_connection(actor.user_id, peer)? {
            Some(c) if c.status == ConnectionStatus::Accepted => c,
            _ => {
                return Ok(Outcome::reply(Reply::text(
                    "You can only chat with your connections.",
                ))
                .then(SessionState::Idle));
            }
        };

        self.db.mark_chat_read(&connection.id, actor.user_id)?;
        let messages = self.db.recent_messages(&connection.id, CHAT_HISTORY)?;
        let peer_name = self.peer_name(peer)?;
        Ok(Outcome::reply(
            Reply::text(views::chat_history(&messages, actor.user_id, &peer_name))
                .with_keyboard(keyboards::back_menu()),
        ))
    }

    fn optional_profile(&self, user_id: UserId) -> Result<Option<Profile>, DispatchError> {
        match self.db.get_profile(user_id) {
            Ok(p) => Ok(Some(p)),
            Err(DbError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn peer_name(&self, user_id: UserId) -> Result<String, DispatchError> {
        Ok(self
            .optional_profile(user_id)?
            .map_or_else(|| format!("user {user_id}"), |p| p.display_name()))
    }

    /// Confirmation for an accepted request. The answer is already stored,
    /// so a failed name lookup degrades the text instead of the outcome.
    fn accepted_reply(&self, connection_id: &str, requester: UserId) -> Reply {
        let peer_name = self.peer_name(requester).unwrap_or_else(|e| {
            tracing::warn!(connection_id, requester, error = %e, "Could not load requester name");
            format!("user {requester}")
        });
        Reply::text(format!("✅ You are now connected with {peer_name}!"))
            .with_keyboard(keyboards::open_chat(requester, "💬 Write a message"))
    }

    // ========================================================================
    // Polls
    // ========================================================================

    fn show_active_polls(&self, actor: &Profile) -> EffectResult {
        let conference_id = require_conference(actor)?;
        let polls = self.db.list_polls(conference_id, true)?;
        if polls.is_empty() {
            return Ok(Outcome::reply(Reply::text("📊 No active polls right now.")));
        }

        Ok(Outcome::replies(
            polls
                .iter()
                .map(|poll| {
                    if poll.has_voted(actor.user_id) {
                        Reply::text(views::poll_results(&PollTally::from_poll(poll)))
                    } else {
                        Reply::text(views::poll_question(poll))
                            .with_keyboard(keyboards::vote(poll))
                    }
                })
                .collect(),
        ))
    }

    async fn create_poll(&self, actor: &Profile, draft: PollDraft) -> EffectResult {
        let conference_id = require_conference(actor)?;
        if !draft.is_complete() {
            return Err(DispatchError::Validation(format!(
                "A poll needs at least {} options.",
                crate::dialog::MIN_POLL_OPTIONS
            )));
        }
        let poll = self
            .polls
            .create(&draft.question, &draft.options, conference_id, actor.user_id)
            .await?;
        Ok(Outcome::reply(
            Reply::text(format!(
                "✅ Poll created and sent to participants!\n\n{}",
                views::poll_admin(&poll)
            ))
            .with_keyboard(keyboards::admin_menu()),
        ))
    }

    fn prompt_poll_edit(&self, poll_id: &str, mode: PollEditMode) -> EffectResult {
        let poll = self.db.get_poll(poll_id)?;
        let text = match mode {
            PollEditMode::Question => {
                format!("Current question: {}\n✍️ Enter the new question:", poll.question)
            }
            PollEditMode::AddOption => {
                if poll.options.len() >= MAX_POLL_OPTIONS {
                    return Err(too_many_options());
                }
                "✍️ Enter the text of the new option:".to_string()
            }
            PollEditMode::ChooseOption => format!(
                "{}\n\nSend the number of the option to change:",
                views::poll_admin(&poll)
            ),
            PollEditMode::OptionText { index } => {
                format!("✍️ Enter the new text for option {}:", index + 1)
            }
        };
        Ok(Outcome::reply(
            Reply::text(text).with_keyboard(keyboards::back_menu()),
        ))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn joined(conference: &Conference, is_admin: bool) -> Reply {
    Reply::text(format!("🎉 You joined {}!", conference.name))
        .with_keyboard(keyboards::main_menu(is_admin))
}

fn admin_done(text: &str) -> Outcome {
    Outcome::reply(Reply::text(text).with_keyboard(keyboards::admin_menu()))
}

fn require_conference(actor: &Profile) -> Result<&str, DispatchError> {
    actor.conference_id.as_deref().ok_or_else(|| {
        DispatchError::Validation(
            "You haven't joined a conference yet. Send /start to choose one.".to_string(),
        )
    })
}

fn too_many_options() -> DispatchError {
    DispatchError::Validation(format!(
        "A poll can have at most {MAX_POLL_OPTIONS} options."
    ))
}

fn tag_label(field: TagField) -> &'static str {
    match field {
        TagField::Interests => "Interests",
        TagField::Offerings => "Offerings",
        TagField::LookingFor => "Looking for",
    }
}

fn validate_contact(field: ContactField, value: &str) -> Result<(), DispatchError> {
    let ok = match field {
        ContactField::Email => {
            value.split_once('@').is_some_and(|(user, domain)| {
                !user.is_empty() && domain.contains('.') && !value.contains(char::is_whitespace)
            })
        }
        ContactField::Phone => value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')')),
        ContactField::Telegram | ContactField::Vkontakte => !value.contains(char::is_whitespace),
    };
    if ok {
        Ok(())
    } else {
        Err(DispatchError::Validation(format!(
            "That doesn't look like a valid {}. Try again or /cancel.",
            field.label().to_lowercase()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::relay::NotificationRelay;
    use crate::router::RouterSettings;
    use crate::session::InMemorySessionStore;
    use crate::testing::{seed_profile, RecordingNotifier};
    use std::sync::Arc;

    fn router(db: &Database) -> DialogRouter {
        DialogRouter::new(
            db.clone(),
            NotificationRelay::new(Arc::new(RecordingNotifier::new())),
            Arc::new(InMemorySessionStore::new()),
            RouterSettings::default(),
        )
    }

    #[test]
    fn test_accepted_reply_names_requester() {
        let db = Database::open_in_memory().unwrap();
        seed_profile(&db, 1, "Ann", None);

        let reply = router(&db).accepted_reply("c1", 1);
        assert!(reply.text.contains("connected with Ann"));
        assert!(reply.keyboard.is_some());
    }

    #[test]
    fn test_accepted_reply_survives_unreadable_profiles() {
        let db = Database::open_in_memory().unwrap();
        seed_profile(&db, 1, "Ann", None);
        db.execute_batch("DROP TABLE profiles").unwrap();

        let reply = router(&db).accepted_reply("c1", 1);
        assert!(reply.text.contains("connected with user 1"));
    }

    #[test]
    fn test_validate_contact() {
        assert!(validate_contact(ContactField::Email, "ada@example.com").is_ok());
        assert!(validate_contact(ContactField::Email, "ada").is_err());
        assert!(validate_contact(ContactField::Email, "@example.com").is_err());
        assert!(validate_contact(ContactField::Phone, "+1 (555) 010-9999").is_ok());
        assert!(validate_contact(ContactField::Phone, "call me").is_err());
        assert!(validate_contact(ContactField::Telegram, "@ada").is_ok());
        assert!(validate_contact(ContactField::Vkontakte, "ada lovelace").is_err());
    }
}
