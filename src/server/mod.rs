// src/server/mod.rs

//! Demo validation backend.
//!
//! This module contains:
//! - `handlers` → Axum HTTP handlers for the login API and dashboard page
//! - `logging`  → Request logging middleware and login audit events
//! - `routes`   → Router builder

pub mod handlers;
pub mod logging;
pub mod routes;

pub use handlers::{
    check_session_handler, dashboard_handler, health_handler, logout_handler, validate_handler,
    AppState, HealthResponse,
};
pub use logging::{
    log_demo_login_attempt, request_logging_middleware, DEMO_REJECTED_EVENT, REQUEST_ID_HEADER,
};
pub use routes::build_router;
