//! Error handling for the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use uuid::Uuid;

use crate::response::ApiResponse;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest {
        message: String,
        detail: Option<String>,
    },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("{message}: {source:#}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Create a bad request error; `detail` explains what failed to parse
    pub fn bad_request(message: impl Into<String>, detail: Option<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            detail,
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Wrap a failure from a lower layer, typically storage
    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(source: anyhow::Error) -> Self {
        Self::internal("Internal server error", source)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();

        let envelope = match self {
            AppError::BadRequest { message, detail } => {
                tracing::warn!(
                    error_id = %error_id,
                    status_code = %status.as_u16(),
                    detail = detail.as_deref().unwrap_or_default(),
                    "{message}"
                );
                ApiResponse::failure(status, message, detail)
            }
            AppError::NotFound { message } => {
                tracing::debug!(error_id = %error_id, status_code = %status.as_u16(), "{message}");
                ApiResponse::message(status, message)
            }
            AppError::Internal { message, source } => {
                tracing::error!(
                    error_id = %error_id,
                    status_code = %status.as_u16(),
                    error = %format!("{source:#}"),
                    "{message}"
                );
                ApiResponse::failure(status, message, Some(source.to_string()))
            }
        };

        envelope.into_response()
    }
}
