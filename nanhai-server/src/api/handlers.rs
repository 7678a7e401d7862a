//! HTTP request handlers
//!
//! Registration, dives and the full-state read used by clients to
//! resynchronize.

use crate::engine::DiveOutcome;
use crate::error::{ApiError, ApiResult, StatusResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use nanhai_common::{Fragment, GameDocument, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct NewPlayerRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiveRequest {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiveResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<Fragment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaderboard: Option<Vec<Player>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<bool>,
    pub message: String,
}

/// Trimmed, non-empty name or a validation error carrying `message`
fn required_name(raw: Option<String>, message: &str) -> ApiResult<String> {
    let name = raw.unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation(message.to_string()));
    }
    Ok(name)
}

/// Body of a game request, or the default when it is absent or not JSON
///
/// A missing or unreadable body means "no name given", which the name check
/// reports like any other blank name.
fn body_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> T {
    match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!("Unreadable request body: {}", rejection);
            T::default()
        }
    }
}

// ============================================================================
// Game Endpoints
// ============================================================================

/// POST /new-player - Register a player (idempotent)
pub async fn register_player(
    State(state): State<AppState>,
    body: Result<Json<NewPlayerRequest>, JsonRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let req = body_or_default(body);
    let name = required_name(req.name, "Please enter a name.")?;
    state.engine.register(&name).await?;
    Ok(Json(StatusResponse::ok()))
}

/// POST /dive - Claim a random fragment
pub async fn dive(
    State(state): State<AppState>,
    body: Result<Json<DiveRequest>, JsonRejection>,
) -> ApiResult<Json<DiveResponse>> {
    let req = body_or_default(body);
    let name = required_name(req.username, "Please enter your name.")?;
    let report = state.engine.dive(&name).await?;
    let message = report.outcome.message();

    let response = match report.outcome {
        DiveOutcome::Claimed {
            fragment,
            completed,
        } => DiveResponse {
            ok: true,
            fragment: Some(fragment),
            leaderboard: Some(report.players),
            completed: Some(completed.is_some()),
            artifact_key: completed,
            reset: None,
            message,
        },
        DiveOutcome::Reset => {
            info!("Dive by '{}' reset the pool", name);
            DiveResponse {
                ok: true,
                fragment: None,
                leaderboard: None,
                completed: None,
                artifact_key: None,
                reset: Some(true),
                message,
            }
        }
    };

    Ok(Json(response))
}

/// GET /data - Full game document
pub async fn game_data(State(state): State<AppState>) -> ApiResult<Json<GameDocument>> {
    Ok(Json(state.engine.snapshot().await?))
}
