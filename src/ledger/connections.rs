//! Connection ledger: pairwise relationships and chat

use crate::db::{ChatMessage, Connection, Database, DbResult, Decision, Profile, UserId};
use crate::dialog::{keyboards, Reply};
use crate::relay::NotificationRelay;

#[derive(Clone)]
pub struct ConnectionLedger {
    db: Database,
    relay: NotificationRelay,
}

impl ConnectionLedger {
    pub fn new(db: Database, relay: NotificationRelay) -> Self {
        Self { db, relay }
    }

    /// Create a pending request and offer the target accept/reject buttons
    pub async fn request(&self, requester: &Profile, target: UserId) -> DbResult<Connection> {
        // Unknown targets are NotFound, not a dangling row
        self.db.get_profile(target)?;

        let connection = self.db.insert_pending_connection(
            requester.user_id,
            target,
            requester.conference_id.as_deref(),
        )?;
        tracing::info!(
            requester = requester.user_id,
            target,
            connection_id = %connection.id,
            "Connection requested"
        );

        self.relay
            .notify(
                target,
                Reply::text(format!(
                    "🤝 {} wants to connect with you!",
                    requester.display_name()
                ))
                .with_keyboard(keyboards::connection_request(&connection.id)),
            )
            .await;

        Ok(connection)
    }

    /// Accept or reject a pending request addressed to `responder`
    pub async fn respond(
        &self,
        connection_id: &str,
        responder: &Profile,
        decision: Decision,
    ) -> DbResult<Connection> {
        let connection =
            self.db
                .respond_to_connection(connection_id, responder.user_id, decision)?;
        tracing::info!(
            connection_id,
            responder = responder.user_id,
            status = %connection.status,
            "Connection answered"
        );

        let reply = match decision {
            Decision::Accept => Reply::text(format!(
                "✅ {} accepted your connection request!",
                responder.display_name()
            ))
            .with_keyboard(keyboards::open_chat(responder.user_id, "💬 Write a message")),
            Decision::Reject => Reply::text(format!(
                "❌ {} declined your connection request.",
                responder.display_name()
            )),
        };
        self.relay.notify(connection.requester, reply).await;

        Ok(connection)
    }

    /// Append a message between accepted connections and notify the receiver
    pub async fn send_message(
        &self,
        sender: &Profile,
        receiver: UserId,
        text: &str,
    ) -> DbResult<ChatMessage> {
        let (connection, message) = self.db.append_message(sender.user_id, receiver, text)?;
        tracing::info!(
            connection_id = %connection.id,
            sender = sender.user_id,
            receiver,
            "Chat message stored"
        );

        self.relay
            .notify(
                receiver,
                Reply::text(format!("💬 From {}:\n{text}", sender.display_name()))
                    .with_keyboard(keyboards::open_chat(sender.user_id, "↩️ Reply")),
            )
            .await;

        Ok(message)
    }
}
