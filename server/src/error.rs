//! API errors and their HTTP rendering.
//!
//! Every error becomes an RFC 7807-style JSON body. Validation failures also
//! carry an `errors` object mapping each offending field to its messages.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::representation::FieldErrors;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("todo not found")]
    NotFound,

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("expected `Content-Type: application/json`")]
    UnsupportedMediaType,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => ApiError::UnsupportedMediaType,
            other => ApiError::MalformedBody(other.body_text()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: &'static str,
    pub title: &'static str,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorResponse {
    fn new(status: StatusCode, title: &'static str) -> Self {
        Self {
            error_type: "about:blank",
            title,
            status: status.as_u16(),
            detail: None,
            errors: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound => {
                let status = StatusCode::NOT_FOUND;
                (status, ErrorResponse::new(status, "Not found"))
            }
            ApiError::Validation(errors) => {
                let status = StatusCode::BAD_REQUEST;
                let mut body = ErrorResponse::new(status, "Validation failed");
                body.detail = Some(errors.to_string());
                body.errors = Some(errors);
                (status, body)
            }
            ApiError::MalformedBody(detail) => {
                let status = StatusCode::BAD_REQUEST;
                let mut body = ErrorResponse::new(status, "Malformed request body");
                body.detail = Some(detail);
                (status, body)
            }
            ApiError::UnsupportedMediaType => {
                let status = StatusCode::UNSUPPORTED_MEDIA_TYPE;
                let mut body = ErrorResponse::new(status, "Unsupported media type");
                body.detail = Some("expected `Content-Type: application/json`".to_string());
                (status, body)
            }
            ApiError::Store(err) => {
                // details stay in the log
                tracing::error!(error = %err, "store operation failed");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (status, ErrorResponse::new(status, "Internal server error"))
            }
        };

        (status, Json(body)).into_response()
    }
}
