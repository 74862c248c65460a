//! RFC 9457 problem-details responses.
//!
//! Every handler failure is rendered as an `application/problem+json` body.
//! Raw library error text stays in the logs; clients only see the
//! classified message.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Serialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub status: u16,
    pub title: String,
    pub detail: String,
    /// Reference documentation for the status code.
    pub instance: String,
}

impl Problem {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            problem_type: "about:blank".to_string(),
            status: status.as_u16(),
            title: status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string(),
            detail: detail.into(),
            instance: format!(
                "https://developer.mozilla.org/en-US/docs/Web/HTTP/Status/{}",
                status.as_u16()
            ),
        }
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            Json(self),
        )
            .into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::UnsupportedMedia(kind) => (
                StatusCode::BAD_REQUEST,
                format!("unsupported image type: {}", kind),
            ),
            Error::Duplicate => (StatusCode::BAD_REQUEST, "duplicate image".to_string()),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Error::Inconsistent(_) => {
                tracing::error!(error = %self, "request left inconsistent storage state");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "could not roll back storage write".to_string(),
                )
            }
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal server error occurred".to_string(),
                )
            }
        };
        Problem::new(status, detail).into_response()
    }
}
