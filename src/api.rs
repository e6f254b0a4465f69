//! HTTP API
//!
//! Inbound event ingestion for the messaging-channel adapter, and the
//! read-only second-screen endpoints for the shared conference display.

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::db::Database;
use crate::relay::NotificationRelay;
use crate::router::DialogRouter;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub router: Arc<DialogRouter>,
    pub relay: NotificationRelay,
}

impl AppState {
    pub fn new(db: Database, router: Arc<DialogRouter>, relay: NotificationRelay) -> Self {
        Self { db, router, relay }
    }
}
