//! Mock implementations and fixtures for testing

use crate::db::{Database, NewProfile, Profile, UserId};
use crate::dialog::Reply;
use crate::relay::{DeliveryError, Notifier};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock Notifiers
// ============================================================================

/// Notifier that records every delivery
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(UserId, Reply)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliveries so far, in order
    pub fn sent(&self) -> Vec<(UserId, Reply)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, recipient: UserId) -> Vec<Reply> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| *to == recipient)
            .map(|(_, reply)| reply)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: UserId, reply: &Reply) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push((recipient, reply.clone()));
        Ok(())
    }
}

/// Notifier whose transport is always down
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _recipient: UserId, _reply: &Reply) -> Result<(), DeliveryError> {
        Err(DeliveryError::Transport("connection refused".to_string()))
    }
}

/// Notifier with a slow transport; tracks how many deliveries overlap
pub struct SlowNotifier {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    recorder: RecordingNotifier,
}

impl SlowNotifier {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            recorder: RecordingNotifier::new(),
        }
    }

    /// Most deliveries observed in flight at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(UserId, Reply)> {
        self.recorder.sent()
    }
}

#[async_trait]
impl Notifier for SlowNotifier {
    async fn send(&self, recipient: UserId, reply: &Reply) -> Result<(), DeliveryError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.recorder.send(recipient, reply).await
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Unsaved profile with empty tags
pub fn profile(user_id: UserId, name: &str) -> Profile {
    Profile {
        user_id,
        first_name: name.to_string(),
        last_name: None,
        username: None,
        photo: None,
        contacts: crate::db::Contacts::default(),
        interests: Vec::new(),
        offerings: Vec::new(),
        looking_for: Vec::new(),
        conference_id: None,
        is_active: true,
        is_admin: false,
        created_at: Utc::now(),
    }
}

/// Stored profile, optionally joined to a conference
pub fn seed_profile(
    db: &Database,
    user_id: UserId,
    name: &str,
    conference_id: Option<&str>,
) -> Profile {
    db.ensure_profile(&NewProfile {
        user_id,
        first_name: name.to_string(),
        ..NewProfile::default()
    })
    .unwrap();
    db.set_profile_conference(user_id, conference_id).unwrap();
    db.get_profile(user_id).unwrap()
}

pub fn seed_admin(db: &Database, user_id: UserId, conference_id: Option<&str>) -> Profile {
    db.ensure_profile(&NewProfile {
        user_id,
        first_name: format!("Admin {user_id}"),
        is_admin: true,
        ..NewProfile::default()
    })
    .unwrap();
    db.set_profile_conference(user_id, conference_id).unwrap();
    db.get_profile(user_id).unwrap()
}
