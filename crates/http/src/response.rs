//! Uniform JSON envelope shared by every handler and by [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize, Serializer};

use crate::error::AppError;

/// Response body of the form `{data?, error?, message, status}`.
///
/// `status` mirrors the HTTP status the envelope is sent with.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
}

impl<T> ApiResponse<T> {
    /// 200 with a payload
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::with_data(StatusCode::OK, data, message)
    }

    /// 201 with the created payload
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_data(StatusCode::CREATED, data, message)
    }

    pub fn with_data(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            error: None,
            message: message.into(),
            status,
        }
    }
}

impl ApiResponse<()> {
    /// Envelope carrying only a message, e.g. after a delete
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: None,
            message: message.into(),
            status,
        }
    }

    /// Failure envelope; `error` holds the underlying cause when there is one
    pub fn failure(status: StatusCode, message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            data: None,
            error,
            message: message.into(),
            status,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

fn serialize_status<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

/// JSON request body extractor that reports every decoding problem as a 400
/// envelope and does not insist on a `Content-Type` header.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::bad_request("Invalid request body", Some(rejection.body_text()))
            })?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|err| AppError::bad_request("Invalid request body", Some(err.to_string())))
    }
}
