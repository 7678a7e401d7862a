//! HTTP API for the dive game

pub mod handlers;
pub mod health;
pub mod sse;

pub use handlers::{dive, game_data, register_player};
pub use health::health_routes;
pub use sse::event_stream;
