//! Diagnostic responses for failed requests

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ServeError;

/// Failure payload: `{"traceback": "..."}`.
///
/// In the default mode every failure is answered with 200 so callers of the
/// original deployment keep working. With status codes enabled the status
/// reflects the error kind and the body also carries `"kind"`.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub status: StatusCode,
    pub kind: Option<&'static str>,
    pub traceback: String,
}

impl Diagnostic {
    pub fn from_error(err: ServeError, status_codes: bool) -> Self {
        let (status, kind) = if status_codes {
            (status_for(&err), Some(err.kind()))
        } else {
            (StatusCode::OK, None)
        };
        Self {
            status,
            kind,
            traceback: err.traceback(),
        }
    }

    /// The pipeline panicked or its task was lost
    pub fn internal(detail: String, status_codes: bool) -> Self {
        let (status, kind) = if status_codes {
            (StatusCode::INTERNAL_SERVER_ERROR, Some("internal"))
        } else {
            (StatusCode::OK, None)
        };
        Self {
            status,
            kind,
            traceback: detail,
        }
    }

    /// The body could not be read, e.g. it exceeds the size limit. Answered
    /// as a validation failure; with status codes enabled the rejection's own
    /// status (413 for an oversized body) is kept.
    pub fn rejected_body(rejection: &BytesRejection, status_codes: bool) -> Self {
        let err = ServeError::Validation(format!(
            "request body could not be read: {}",
            rejection.body_text()
        ));
        let mut diagnostic = Self::from_error(err, status_codes);
        if status_codes {
            diagnostic.status = rejection.status();
        }
        diagnostic
    }

    pub fn body(&self) -> serde_json::Value {
        match self.kind {
            Some(kind) => json!({ "traceback": self.traceback, "kind": kind }),
            None => json!({ "traceback": self.traceback }),
        }
    }
}

/// HTTP status for an error kind when status codes are enabled
pub fn status_for(err: &ServeError) -> StatusCode {
    match err {
        ServeError::Validation(_) => StatusCode::BAD_REQUEST,
        ServeError::Schema(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServeError::ModelLoad { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ServeError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Diagnostic {
    fn into_response(self) -> Response {
        (self.status, Json(self.body())).into_response()
    }
}
