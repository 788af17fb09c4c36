//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::ScreenerError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl From<ScreenerError> for ServerError {
    fn from(err: ScreenerError) -> Self {
        match err {
            ScreenerError::InvalidInput(_)
            | ScreenerError::ValidationError(_)
            | ScreenerError::UnknownValue { .. } => ServerError::BadRequest(err.to_string()),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::BadRequest(msg) => {
                tracing::debug!(detail = %msg, "Rejected request");
                StatusCode::BAD_REQUEST
            }
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
