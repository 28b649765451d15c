//! HTTP error responses.
//!
//! Every error is rendered as JSON: `{ "error": ..., "details"?: ... }`.
//! Client mistakes map to 400, authentication failures to 401 (never with
//! details), and everything else to 500 with the underlying message in
//! `details`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(AuthError),
    Internal {
        error: &'static str,
        details: String,
    },
}

impl ApiError {
    /// Map an engine error: client input becomes 400, anything else 500
    /// under `context`.
    pub fn from_search(err: velocity_core::Error, context: &'static str) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            log::error!("{context}: {err}");
            Self::Internal {
                error: context,
                details: err.to_string(),
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Unauthorized(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::BadRequest(error) => ErrorResponse {
                error,
                details: None,
            },
            Self::Unauthorized(err) => ErrorResponse {
                error: err.to_string(),
                details: None,
            },
            Self::Internal { error, details } => ErrorResponse {
                error: error.to_string(),
                details: Some(details),
            },
        };

        (status, Json(body)).into_response()
    }
}
