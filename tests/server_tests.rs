#![cfg(feature = "server")]

use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use keylogin::client::request::SessionRequest;
use keylogin::client::{
    Capabilities, Credentials, FormController, FormPhase, FormProfile, FormView,
    HttpValidationClient, MemoryStore, Navigator, SubmitOutcome, UiState, ValidationRequest,
    ValidationTransport,
};
use keylogin::config::{ClientConfig, DEMO_MESSAGE};
use keylogin::fingerprint::StaticFingerprintSource;
use keylogin::server::{build_router, AppState, REQUEST_ID_HEADER};

/// Start the demo server on an ephemeral port and return its API base URL.
async fn spawn_server(demo_message: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(AppState::new(demo_message));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/api")
}

fn client_for(api_base_url: String) -> HttpValidationClient {
    let config = ClientConfig {
        api_base_url,
        timeout_secs: 5,
        ..ClientConfig::default()
    };
    HttpValidationClient::new(&config).unwrap()
}

fn sample_request() -> ValidationRequest {
    let source = StaticFingerprintSource::new("Mozilla/5.0 (test)", 800, 600);
    ValidationRequest::build(Some("neo"), "ABC-123", &source, "1.0.0")
}

// === Over the wire ===

#[tokio::test]
async fn validate_returns_demo_failure() {
    let base = spawn_server(DEMO_MESSAGE).await;
    let client = client_for(base);

    let resp = client.validate(&sample_request()).await.unwrap();
    assert!(!resp.success);
    assert_eq!(resp.message.as_deref(), Some(DEMO_MESSAGE));
    assert!(resp.session_token.is_none());
}

#[tokio::test]
async fn validate_uses_configured_message() {
    let base = spawn_server("Backend offline").await;
    let client = client_for(base);

    let resp = client.validate(&sample_request()).await.unwrap();
    assert_eq!(resp.display_message("Login failed"), "Backend offline");
}

#[tokio::test]
async fn session_routes_answer_in_demo_mode() {
    let base = spawn_server(DEMO_MESSAGE).await;
    let client = client_for(base);
    let request = SessionRequest {
        session_token: "tok-1".to_string(),
        username: Some("neo".to_string()),
    };

    let check = client.check_session(&request).await.unwrap();
    assert!(!check.valid);

    let logout = client.logout(&request).await.unwrap();
    assert!(logout.success);
}

// === Router without a socket ===

#[tokio::test]
async fn validate_accepts_key_only_body() {
    let app = build_router(AppState::new(DEMO_MESSAGE));
    let body = json!({
        "key": "a".repeat(64),
        "hwid": "b".repeat(64),
        "app_version": "1.0.0"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/validate")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], DEMO_MESSAGE);
}

#[tokio::test]
async fn dashboard_serves_html() {
    let app = build_router(AppState::new(DEMO_MESSAGE));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Login Successful!"));
    assert!(html.contains("Welcome to the dashboard"));
}

#[tokio::test]
async fn health_reports_service() {
    let app = build_router(AppState::new(DEMO_MESSAGE));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "keylogin");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = build_router(AppState::new(DEMO_MESSAGE));

    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// === Controller against the demo server ===

#[derive(Default)]
struct LastFrame(Mutex<Option<UiState>>);

impl FormView for LastFrame {
    fn render(&self, state: &UiState) {
        *self.0.lock().unwrap() = Some(state.clone());
    }
}

#[derive(Default)]
struct Routes(Mutex<Vec<String>>);

impl Navigator for Routes {
    fn navigate(&self, route: &str) {
        self.0.lock().unwrap().push(route.to_string());
    }
}

#[tokio::test]
async fn controller_shows_demo_message_and_stays_put() {
    let base = spawn_server(DEMO_MESSAGE).await;
    let view = Arc::new(LastFrame::default());
    let routes = Arc::new(Routes::default());

    let caps = Capabilities {
        fingerprint: Arc::new(StaticFingerprintSource::new("Mozilla/5.0 (test)", 800, 600)),
        store: Arc::new(MemoryStore::new()),
        navigator: routes.clone(),
        view: view.clone(),
    };
    let mut form = FormController::new(FormProfile::standard(), "1.0.0", client_for(base), caps);

    let outcome = form.submit(&Credentials::new("neo", "ABC-123")).await;
    assert_eq!(
        outcome,
        SubmitOutcome::Failed {
            message: DEMO_MESSAGE.to_string()
        }
    );

    let last = view.0.lock().unwrap().clone().unwrap();
    assert_eq!(last.phase, FormPhase::Idle);
    assert!(last.submit_enabled);

    form.advance(std::time::Duration::from_secs(10));
    assert!(routes.0.lock().unwrap().is_empty());
}
