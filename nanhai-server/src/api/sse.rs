//! Server-Sent Events (SSE) push channel
//!
//! Streams `leaderboard-update`, `fragment-found` and `server-full` events.
//! Delivery is best-effort: a client that lags behind the broadcast buffer
//! skips the missed events and is expected to refetch `GET /data`.

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use nanhai_common::events::GameEvent;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, warn};
use uuid::Uuid;

/// Convert a game event into an SSE frame
fn to_sse_event(event: &GameEvent) -> Option<Event> {
    match event.payload_json() {
        Ok(json) => Some(
            Event::default()
                .event(event.event_name())
                .id(Uuid::new_v4().to_string())
                .data(json),
        ),
        Err(e) => {
            warn!("Failed to serialize {} event: {}", event.event_name(), e);
            None
        }
    }
}

/// GET /events - SSE event stream
///
/// Connections beyond the cap receive a single `server-full` event and the
/// stream ends. Admitted connections get the current leaderboard first, then
/// every event published after they subscribed.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let permit = state.limiter.try_acquire();
    let engine = state.engine.clone();

    let stream = async_stream::stream! {
        match permit {
            None => {
                debug!("Rejecting SSE client, server full");
                if let Some(event) = to_sse_event(&GameEvent::server_full()) {
                    yield Ok(event);
                }
            }
            Some(_permit) => {
                // Subscribe before reading the snapshot so nothing committed
                // in between is lost
                let mut events = BroadcastStream::new(engine.events().subscribe());

                match engine.leaderboard().await {
                    Ok(players) => {
                        if let Some(event) = to_sse_event(&GameEvent::leaderboard(&players)) {
                            yield Ok(event);
                        }
                    }
                    Err(e) => warn!("Could not load leaderboard for new client: {}", e),
                }

                while let Some(item) = events.next().await {
                    match item {
                        Ok(event) => {
                            if let Some(event) = to_sse_event(&event) {
                                yield Ok(event);
                            }
                        }
                        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                            warn!("SSE client lagged, skipped {} events", skipped);
                        }
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
