//! Server-Sent Events for the shared display

use super::types::DisplaySnapshot;
use crate::relay::DisplayEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Relay broadcasts scoped to one conference. Lagged receivers skip ahead.
pub fn conference_events(
    conference_id: String,
    rx: broadcast::Receiver<DisplayEvent>,
) -> impl Stream<Item = DisplayEvent> {
    BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if event.conference_id == conference_id => Some(event),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(conference_id = %conference_id, error = %e, "Display stream lagged");
            None
        }
    })
}

/// Snapshot first, then live broadcasts
pub fn sse_stream(
    snapshot: DisplaySnapshot,
    events: impl Stream<Item = DisplayEvent> + Send + 'static,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move {
        let data = serde_json::to_string(&snapshot).unwrap_or_else(|_| "{}".to_string());
        Ok(Event::default().event("init").data(data))
    });

    let live = events.map(|event| {
        Ok(Event::default()
            .event(event.kind.as_str())
            .data(event.payload.to_string()))
    });

    Sse::new(init.chain(live)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
