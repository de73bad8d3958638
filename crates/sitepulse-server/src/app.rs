use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// Collect payloads above this size are rejected with 413.
pub const COLLECT_BODY_LIMIT: usize = 100 * 1024;

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `TraceLayer`: structured request/response logging via `tracing`.
/// 2. `CorsLayer`: the tracker script is embedded on third-party pages, so
///    browsers need CORS headers on `/collect`. `SITEPULSE_CORS_ORIGINS`
///    narrows the allowed origins; unset means any.
pub fn build_app(state: Arc<AppState>) -> Router {
    let allow_origin = if state.config.cors_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            state
                .config
                .cors_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/collect",
            post(routes::collect::collect).layer(DefaultBodyLimit::max(COLLECT_BODY_LIMIT)),
        )
        .route("/stats", get(routes::stats::stats))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(allow_origin)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
