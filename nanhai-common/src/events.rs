//! Event system for pushing game state to connected clients
//!
//! # Architecture
//!
//! - **EventBus** (tokio::broadcast): one-to-many, fire-and-forget fan-out
//! - Events are emitted only after the document write they describe succeeded
//! - A receiver that lags or disconnects simply misses events; clients
//!   resynchronize with `GET /data`

use crate::pool::Fragment;
use crate::registry::Player;
use serde::Serialize;
use tokio::sync::broadcast;

/// Message shown to connections rejected by the connection cap
pub const SERVER_FULL_MESSAGE: &str = "Server is at capacity. Please try again later.";

/// Events pushed to every live connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Full leaderboard snapshot
    LeaderboardUpdate { players: Vec<Player> },

    /// A fragment was claimed, or `None` when the pool was reset
    FragmentFound { fragment: Option<Fragment> },

    /// Sent once to a connection refused by admission control
    ServerFull { message: String },
}

#[derive(Serialize)]
struct ServerFullPayload<'a> {
    message: &'a str,
}

impl GameEvent {
    pub fn leaderboard(players: &[Player]) -> Self {
        Self::LeaderboardUpdate {
            players: players.to_vec(),
        }
    }

    pub fn server_full() -> Self {
        Self::ServerFull {
            message: SERVER_FULL_MESSAGE.to_string(),
        }
    }

    /// Wire name of the event
    pub fn event_name(&self) -> &'static str {
        match self {
            GameEvent::LeaderboardUpdate { .. } => "leaderboard-update",
            GameEvent::FragmentFound { .. } => "fragment-found",
            GameEvent::ServerFull { .. } => "server-full",
        }
    }

    /// JSON payload: the player array, the fragment (or `null`), or `{message}`
    pub fn payload_json(&self) -> serde_json::Result<String> {
        match self {
            GameEvent::LeaderboardUpdate { players } => serde_json::to_string(players),
            GameEvent::FragmentFound { fragment } => serde_json::to_string(fragment),
            GameEvent::ServerFull { message } => {
                serde_json::to_string(&ServerFullPayload { message })
            }
        }
    }
}

/// Broadcast hub shared by the engine and the push endpoint
pub struct EventBus {
    tx: broadcast::Sender<GameEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Receivers that fall more than `capacity` events behind lose the oldest ones.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: GameEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
