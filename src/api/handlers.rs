//! HTTP request handlers

use super::sse::{conference_events, sse_stream};
use super::types::{DisplaySnapshot, ErrorResponse, EventResponse};
use super::AppState;
use crate::db::{Conference, ConferenceStats, DbError, Question};
use crate::dialog::{EventKind, InboundEvent};
use crate::ledger::PollTally;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Messaging-channel adapter
        .route("/api/events", post(ingest_event))
        // Second-screen display
        .route(
            "/api/second-screen/conferences/public",
            get(list_public_conferences),
        )
        .route("/api/second-screen/conference/:id/polls", get(list_polls))
        .route(
            "/api/second-screen/conference/:id/questions",
            get(list_questions),
        )
        .route("/api/second-screen/conference/:id/stats", get(get_stats))
        .route("/api/second-screen/conference/:id/stream", get(stream_display))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Event Ingestion
// ============================================================

async fn ingest_event(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> Result<Json<EventResponse>, AppError> {
    if event.kind == EventKind::Photo && event.payload.is_empty() {
        return Err(AppError::BadRequest(
            "photo events need a file id payload".to_string(),
        ));
    }

    let replies = state.router.dispatch(event).await;
    Ok(Json(EventResponse { replies }))
}

// ============================================================
// Second Screen
// ============================================================

async fn list_public_conferences(
    State(state): State<AppState>,
) -> Result<Json<Vec<Conference>>, AppError> {
    Ok(Json(state.db.list_public_conferences(false)?))
}

async fn list_polls(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PollTally>>, AppError> {
    Ok(Json(active_polls(&state, &id)?))
}

async fn list_questions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Question>>, AppError> {
    state.db.get_conference(&id)?;
    Ok(Json(state.db.list_unanswered_questions(&id, None)?))
}

async fn get_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConferenceStats>, AppError> {
    state.db.get_conference(&id)?;
    Ok(Json(state.db.conference_stats(&id)?))
}

async fn stream_display(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Subscribe before reading the snapshot so nothing falls in between
    let rx = state.relay.subscribe();

    let snapshot = DisplaySnapshot {
        polls: active_polls(&state, &id)?,
        questions: state.db.list_unanswered_questions(&id, None)?,
        stats: state.db.conference_stats(&id)?,
    };
    tracing::debug!(conference_id = %id, "Display stream opened");

    Ok(sse_stream(snapshot, conference_events(id, rx)))
}

fn active_polls(state: &AppState, conference_id: &str) -> Result<Vec<PollTally>, AppError> {
    state.db.get_conference(conference_id)?;
    Ok(state
        .db
        .list_polls(conference_id, true)?
        .iter()
        .map(PollTally::from_poll)
        .collect())
}

async fn get_version() -> &'static str {
    concat!("confnet ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { .. } => AppError::NotFound(e.to_string()),
            DbError::OptionOutOfRange { .. } | DbError::Conflict(_) => {
                AppError::BadRequest(e.to_string())
            }
            DbError::Sqlite(_) | DbError::Json(_) | DbError::LockPoisoned => {
                tracing::error!(error = %e, "Storage failure in API handler");
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
