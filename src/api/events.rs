//! Server-Sent Events stream of collection changes.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::AppState;

/// GET /api/events - Stream `change` events as collections are written.
///
/// A subscriber that falls behind gets a single `resync` event and should
/// re-fetch everything.
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.dashboard.events().subscribe();
    tracing::debug!("Event stream opened");

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(change) => {
                    match Event::default().event("change").json_data(&change) {
                        Ok(event) => yield Ok(event),
                        Err(e) => tracing::warn!("Failed to encode change event: {}", e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event subscriber lagged, asking for resync");
                    yield Ok(Event::default().event("resync").data(skipped.to_string()));
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
