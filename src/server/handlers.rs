//! HTTP request handlers

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, info_span, warn, Instrument};

use super::error::Diagnostic;
use super::pipeline;
use super::state::AppState;

/// The predict endpoint. Never fails at the HTTP level: errors become a
/// [`Diagnostic`] body.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = AppState::generate_id();
    let span = info_span!("predict", request_id = %request_id, method = %method);
    let status_codes = state.config.error_status_codes;

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let _entered = span.enter();
            warn!(status = %rejection.status(), error = %rejection.body_text(), "Request body rejected");
            return Diagnostic::rejected_body(&rejection, status_codes).into_response();
        }
    };

    async move {
        let started = Instant::now();
        let worker_state = Arc::clone(&state);
        let worker_span = tracing::Span::current();

        let result = tokio::task::spawn_blocking(move || {
            let _entered = worker_span.enter();
            pipeline::run_predict(&worker_state.cache, &body)
        })
        .await;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        match result {
            Ok(Ok(table)) => {
                let rows = table["data"].as_array().map_or(0, Vec::len);
                info!(rows, elapsed_ms, "Prediction served");
                (StatusCode::OK, Json(table)).into_response()
            }
            Ok(Err(err)) => {
                warn!(kind = err.kind(), error = %err, elapsed_ms, "Prediction failed");
                Diagnostic::from_error(err, status_codes).into_response()
            }
            Err(join_err) => {
                error!(error = %join_err, elapsed_ms, "Prediction task panicked");
                Diagnostic::internal(format!("prediction task failed: {}", join_err), status_codes)
                    .into_response()
            }
        }
    }
    .instrument(span)
    .await
}

/// Rejects methods outside `allowed_methods` with 405
pub async fn method_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.config.allows(request.method()) {
        return next.run(request).await;
    }

    warn!(method = %request.method(), path = %request.uri().path(), "Method not allowed");
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response()
}
