//! # Nanhai Dive Server Library (nanhai-server)
//!
//! Authoritative server for the Nanhai dive game: players register, dive for
//! random artifact fragments, and every connected client is kept in sync with
//! leaderboard and fragment events over SSE.
//!
//! **Architecture:** axum HTTP handlers → [`engine::GameEngine`] (single-writer
//! read-modify-write over the stored document) → [`nanhai_common::events::EventBus`]
//! → SSE streams gated by [`admission::ConnectionLimiter`].

use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod admission;
pub mod api;
pub mod engine;
pub mod error;

pub use admission::ConnectionLimiter;
pub use engine::GameEngine;
pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<GameEngine>,
    /// Cap on live push connections
    pub limiter: ConnectionLimiter,
}

impl AppState {
    pub fn new(engine: Arc<GameEngine>, limiter: ConnectionLimiter) -> Self {
        Self { engine, limiter }
    }
}

/// Build application router
///
/// When `static_dir` is set, unmatched paths are served from it (client assets).
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/new-player", post(api::register_player))
        .route("/dive", post(api::dive))
        .route("/data", get(api::game_data))
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}
