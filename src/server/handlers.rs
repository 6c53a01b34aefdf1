use std::sync::Arc;

use axum::{extract::State, response::Html, Json};
use serde::Serialize;

use crate::client::request::{SessionRequest, ValidationRequest};
use crate::client::responses::{LogoutResponse, SessionCheckResponse, ValidationResponse};
use crate::server::logging::log_demo_login_attempt;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    /// Message returned by `/api/validate` while no real backend is configured.
    pub demo_message: Arc<str>,
}

impl AppState {
    pub fn new(demo_message: impl Into<Arc<str>>) -> Self {
        Self {
            demo_message: demo_message.into(),
        }
    }
}

/// Handler for license validation.
///
/// The demo backend performs no validation: every attempt is logged and
/// answered with the configured failure message. The hashed key is never
/// logged.
pub async fn validate_handler(
    State(state): State<AppState>,
    Json(payload): Json<ValidationRequest>,
) -> Json<ValidationResponse> {
    log_demo_login_attempt(
        payload.username.as_deref(),
        &payload.hwid,
        &payload.app_version,
    );

    Json(ValidationResponse::failure(state.demo_message.as_ref()))
}

/// Handler for session checks. No sessions exist in demo mode.
pub async fn check_session_handler(Json(payload): Json<SessionRequest>) -> Json<SessionCheckResponse> {
    tracing::info!(
        username = payload.username.as_deref().unwrap_or("-"),
        "Session check in demo mode"
    );
    Json(SessionCheckResponse { valid: false })
}

/// Handler for logout. Always succeeds.
pub async fn logout_handler(Json(payload): Json<SessionRequest>) -> Json<LogoutResponse> {
    tracing::info!(
        username = payload.username.as_deref().unwrap_or("-"),
        "Logout in demo mode"
    );
    Json(LogoutResponse { success: true })
}

/// Static page shown after a successful login.
pub async fn dashboard_handler() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// Health check response structure.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "keylogin".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Dashboard</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: linear-gradient(135deg, #0a0a0f 0%, #14141f 100%);
            color: white;
            display: flex;
            align-items: center;
            justify-content: center;
            min-height: 100vh;
            margin: 0;
        }
        .container {
            text-align: center;
            padding: 40px;
            background: rgba(18, 18, 24, 0.95);
            border-radius: 16px;
            border: 1px solid rgba(255, 255, 255, 0.1);
        }
        h1 { color: #66ccff; margin-bottom: 20px; }
        a { color: #66ccff; text-decoration: none; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Login Successful!</h1>
        <p>Welcome to the dashboard</p>
        <p style="margin-top: 20px;"><a href="/">Back to Login</a></p>
    </div>
</body>
</html>
"#;
