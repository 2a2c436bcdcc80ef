//! Route definitions

use std::sync::Arc;
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::any,
    Router,
};
use tower_http::trace::TraceLayer;

use super::{handlers, state::AppState};

/// Create the application router.
///
/// Every path reaches the predict handler, as with a function-style
/// deployment. The method guard is only installed when methods are
/// restricted.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/", any(handlers::predict))
        .fallback(handlers::predict)
        .with_state(Arc::clone(&state));

    if !state.config.allowed_methods.is_empty() {
        app = app.layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            handlers::method_guard,
        ));
    }

    app.layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(TraceLayer::new_for_http())
}
