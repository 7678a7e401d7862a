//! Error types for nanhai-server
//!
//! Maps failures to the JSON bodies clients understand. Validation problems
//! come back as `{ok: false, message}`; everything else is logged and reported
//! as a generic server error without internal details.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Body for simple `{ok, message}` responses
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}

/// Errors returned by HTTP handlers
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request rejected before touching game state
    #[error("{0}")]
    Validation(String),

    /// Failure inside the engine or store
    #[error(transparent)]
    Game(#[from] nanhai_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(message)
            | ApiError::Game(nanhai_common::Error::InvalidInput(message)) => {
                (StatusCode::OK, Json(StatusResponse::failed(message))).into_response()
            }
            ApiError::Game(e) => {
                error!("Request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(StatusResponse::failed("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}

/// Convenience Result type for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;
