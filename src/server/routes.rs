use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::handlers::{
    check_session_handler, dashboard_handler, health_handler, logout_handler, validate_handler,
    AppState,
};
use crate::server::logging::request_logging_middleware;

/// Build the application router for the demo server.
///
/// # Routes
///
/// - `POST /api/validate` - Validate a license key (demo: always fails)
/// - `POST /api/check-session` - Check a session token (demo: never valid)
/// - `POST /api/logout` - End a session
/// - `GET /dashboard` - Static post-login page
/// - `GET /health` - Health check
///
/// Every route is wrapped in the request logging middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/validate", post(validate_handler))
        .route("/api/check-session", post(check_session_handler))
        .route("/api/logout", post(logout_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn(request_logging_middleware))
        .with_state(state)
}
