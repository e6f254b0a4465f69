//! confnet - conference networking bot core
//!
//! Dialog state machine, matching, connection/poll/question ledgers and a
//! second-screen display feed behind a small HTTP service. The messaging
//! channel adapter posts inbound events and receives outbound notifications
//! through a webhook.

mod api;
mod config;
mod db;
mod dialog;
mod ledger;
mod matching;
mod relay;
mod router;
mod session;

#[cfg(test)]
mod testing;

use api::{create_router, AppState};
use config::Config;
use db::Database;
use relay::{LogNotifier, NotificationRelay, Notifier, WebhookNotifier};
use router::{DialogRouter, RouterSettings};
use session::InMemorySessionStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "confnet=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env();

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&config.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path, "Opening database");
    let db = Database::open(&config.db_path)?;

    let notifier: Arc<dyn Notifier> = match &config.outbound_url {
        Some(url) => {
            tracing::info!(url = %url, "Delivering notifications via webhook");
            Arc::new(WebhookNotifier::new(url.clone())?)
        }
        None => {
            tracing::warn!("CONFNET_OUTBOUND_URL not set; notifications are only logged");
            Arc::new(LogNotifier)
        }
    };
    let relay = NotificationRelay::new(notifier);

    if config.admin_ids.is_empty() {
        tracing::warn!("No admins configured. Set CONFNET_ADMIN_IDS.");
    }

    let router = DialogRouter::new(
        db.clone(),
        relay.clone(),
        Arc::new(InMemorySessionStore::new()),
        RouterSettings::from(&config),
    );
    let state = AppState::new(db, Arc::new(router), relay);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new().gzip(true).br(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("confnet listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
