//! Text rendering of stored entities

use crate::db::{
    AccessCode, ChatMessage, Conference, Connection, Poll, Profile, Question, UserId,
};
use crate::ledger::PollTally;
use crate::matching::Match;
use std::fmt::Write;

pub fn profile(profile: &Profile, conference: Option<&Conference>) -> String {
    let mut out = format!("👤 {}\n", profile.display_name());
    if let Some(username) = &profile.username {
        let _ = writeln!(out, "@{username}");
    }
    let _ = writeln!(
        out,
        "🏢 Conference: {}",
        conference.map_or("not selected", |c| c.name.as_str())
    );
    if profile.is_admin {
        out.push_str("🛠️ Role: administrator\n");
    }
    if profile.photo.is_none() {
        out.push_str("📸 No photo yet\n");
    }

    out.push_str("\n📞 Contacts:\n");
    let contacts = &profile.contacts;
    if contacts.is_empty() {
        out.push_str("  not provided\n");
    }
    for (label, value) in [
        ("Phone", &contacts.phone),
        ("Email", &contacts.email),
        ("Telegram", &contacts.telegram),
        ("VKontakte", &contacts.vkontakte),
    ] {
        if let Some(value) = value {
            let _ = writeln!(out, "  {label}: {value}");
        }
    }

    let _ = write!(
        out,
        "\n🎯 Interests: {}\n💼 Offerings: {}\n🔎 Looking for: {}",
        tag_list(&profile.interests),
        tag_list(&profile.offerings),
        tag_list(&profile.looking_for),
    );
    out
}

fn tag_list(tags: &[String]) -> String {
    if tags.is_empty() {
        "not specified".to_string()
    } else {
        tags.join(", ")
    }
}

pub fn profile_card(profile: &Profile) -> String {
    let mut out = format!("👤 {}", profile.display_name());
    if let Some(username) = &profile.username {
        let _ = write!(out, " (@{username})");
    }
    if !profile.interests.is_empty() {
        let _ = write!(out, "\n🎯 {}", profile.interests.join(", "));
    }
    if !profile.offerings.is_empty() {
        let _ = write!(out, "\n💼 {}", profile.offerings.join(", "));
    }
    out
}

pub fn match_card(m: &Match) -> String {
    format!(
        "{}\n🔗 Common interests: {}\n⭐ Score: {}",
        profile_card(&m.profile),
        m.common_interests.join(", "),
        m.score
    )
}

pub fn connection_line(connection: &Connection, me: UserId, peer: Option<&Profile>) -> String {
    let peer_name = peer.map_or_else(
        || connection.peer_of(me).unwrap_or_default().to_string(),
        Profile::display_name,
    );
    match peer.and_then(|p| p.username.as_ref()) {
        Some(username) => format!("🤝 {peer_name} (@{username})"),
        None => format!("🤝 {peer_name}"),
    }
}

pub fn chat_preview(connection: &Connection, peer_name: &str) -> String {
    let mut out = format!("💬 {peer_name}");
    if let Some(last) = &connection.last_message {
        let _ = write!(out, "\n{}", truncate(&last.text, 50));
    }
    if connection.unread_count > 0 {
        let _ = write!(out, "\n📩 Unread: {}", connection.unread_count);
    }
    out
}

pub fn chat_history(messages: &[ChatMessage], me: UserId, peer_name: &str) -> String {
    let mut out = format!("💬 Chat with {peer_name}\n");
    for m in messages {
        let who = if m.sender == me { "You" } else { peer_name };
        let _ = write!(out, "\n{who}: {}", m.text);
    }
    out.push_str("\n\nType your message, or /cancel to stop.");
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}

pub fn poll_question(poll: &Poll) -> String {
    format!("📊 {}", poll.question)
}

pub fn poll_results(tally: &PollTally) -> String {
    let mut out = format!("📊 Results: {}\n", tally.question);
    for option in &tally.options {
        let _ = write!(
            out,
            "\n{}: {} ({:.1}%)",
            option.text, option.votes, option.percent
        );
    }
    let _ = write!(out, "\n\nTotal votes: {}", tally.total_votes);
    out
}

pub fn poll_admin(poll: &Poll) -> String {
    let mut out = format!("📊 {}\n", poll.question);
    for (i, option) in poll.options.iter().enumerate() {
        let _ = write!(out, "\n{}. {} ({} votes)", i + 1, option.text, option.votes);
    }
    if !poll.is_active {
        out.push_str("\n\n⏹️ Closed");
    }
    out
}

pub fn question(q: &Question) -> String {
    format!(
        "❓ To {}\n{}\n\nFrom: {}",
        q.speaker, q.text, q.asked_by_name
    )
}

pub fn answered_question(q: &Question) -> String {
    format!(
        "❓ Your question:\n{}\n\n💡 Answer:\n{}",
        q.text,
        q.answer.as_deref().unwrap_or_default()
    )
}

pub fn conference_admin(c: &Conference) -> String {
    format!(
        "🏢 {}\nCode: {}\nStatus: {}",
        c.name,
        c.code,
        if c.is_active { "active" } else { "inactive" }
    )
}

pub fn access_code(code: &AccessCode, conference: &Conference, link: &str) -> String {
    format!(
        "🔑 Access code for {}\n\nCode: {}\nExpires: {}\n\nJoin link: {link}",
        conference.name,
        code.code,
        code.expires_at.format("%Y-%m-%d %H:%M UTC"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::profile as fixture;

    #[test]
    fn test_profile_view_lists_contacts_and_tags() {
        let mut p = fixture(1, "Ada");
        p.contacts.email = Some("ada@example.com".to_string());
        p.interests = vec!["rust".to_string(), "db".to_string()];

        let text = profile(&p, None);
        assert!(text.contains("Ada"));
        assert!(text.contains("Email: ada@example.com"));
        assert!(text.contains("rust, db"));
        assert!(text.contains("Conference: not selected"));
        assert!(text.contains("Offerings: not specified"));
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("héllo", 10), "héllo");
        assert_eq!(truncate("héllo", 2), "hé…");
    }
}
