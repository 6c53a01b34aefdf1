//! Network round-trips to the validation API.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::client::request::{SessionRequest, ValidationRequest};
use crate::client::responses::{LogoutResponse, SessionCheckResponse, ValidationResponse};
use crate::config::ClientConfig;
use crate::errors::{LoginError, LoginResult};

/// The validation API as seen by the form controller.
///
/// Each call is a single attempt; callers decide what a failure means.
pub trait ValidationTransport: Send + Sync {
    fn validate(
        &self,
        request: &ValidationRequest,
    ) -> impl Future<Output = LoginResult<ValidationResponse>> + Send;

    fn check_session(
        &self,
        request: &SessionRequest,
    ) -> impl Future<Output = LoginResult<SessionCheckResponse>> + Send;

    fn logout(
        &self,
        request: &SessionRequest,
    ) -> impl Future<Output = LoginResult<LogoutResponse>> + Send;
}

/// JSON-over-HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpValidationClient {
    http: Client,
    validate_url: String,
    check_session_url: String,
    logout_url: String,
}

impl HttpValidationClient {
    /// Build a client for the API described by `config`.
    pub fn new(config: &ClientConfig) -> LoginResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            validate_url: config.endpoint("validate"),
            check_session_url: config.endpoint("check-session"),
            logout_url: config.endpoint("logout"),
        })
    }

    pub fn validate_url(&self) -> &str {
        &self.validate_url
    }

    /// POST `body` as JSON and decode the reply as JSON.
    ///
    /// The body is decoded whatever the HTTP status; backends put failure
    /// details in non-2xx bodies too.
    async fn post_json<B, R>(&self, url: &str, body: &B) -> LoginResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let resp = self.http.post(url).json(body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!(url, status = status.as_u16(), "Received API response");

        serde_json::from_str(&text).map_err(|e| {
            LoginError::InvalidResponse(format!("HTTP {status} from {url}: {e}"))
        })
    }
}

impl ValidationTransport for HttpValidationClient {
    async fn validate(&self, request: &ValidationRequest) -> LoginResult<ValidationResponse> {
        self.post_json(&self.validate_url, request).await
    }

    async fn check_session(&self, request: &SessionRequest) -> LoginResult<SessionCheckResponse> {
        self.post_json(&self.check_session_url, request).await
    }

    async fn logout(&self, request: &SessionRequest) -> LoginResult<LogoutResponse> {
        self.post_json(&self.logout_url, request).await
    }
}
