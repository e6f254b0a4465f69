//! Session storage
//!
//! Sessions live for the lifetime of the process; a restart returns every
//! user to `Idle`. The trait seam lets an external key-value store take over
//! when sessions must survive restarts or be shared between replicas.

use crate::db::UserId;
use crate::dialog::SessionState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current state, `Idle` when none is stored
    async fn get(&self, user: UserId) -> SessionState;

    async fn put(&self, user: UserId, state: SessionState);

    #[allow(dead_code)] // API completeness
    async fn clear(&self, user: UserId);
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get(&self, user: UserId) -> SessionState {
        (**self).get(user).await
    }

    async fn put(&self, user: UserId, state: SessionState) {
        (**self).put(user, state).await;
    }

    async fn clear(&self, user: UserId) {
        (**self).clear(user).await;
    }
}

/// Process-local session store
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<UserId, SessionState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user: UserId) -> SessionState {
        self.sessions
            .read()
            .await
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }

    async fn put(&self, user: UserId, state: SessionState) {
        let mut sessions = self.sessions.write().await;
        // Idle is the default; don't keep entries for it
        if state.is_idle() {
            sessions.remove(&user);
        } else {
            sessions.insert(user, state);
        }
    }

    async fn clear(&self, user: UserId) {
        self.sessions.write().await.remove(&user);
    }
}
