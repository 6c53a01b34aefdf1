//! Response payloads returned by the validation API.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Body of a `/validate` response.
///
/// Only `success` drives control flow. A missing `success` field counts as
/// failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Some backends report failures here instead of `message`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,

    /// Session expiry as a unix timestamp (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl ValidationResponse {
    /// A failure carrying `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// A success carrying `message`.
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Message to show the user, falling back to `error`, then `default`.
    ///
    /// Empty strings are treated as absent.
    pub fn display_message<'a>(&'a self, default: &'a str) -> &'a str {
        non_empty(&self.message)
            .or_else(|| non_empty(&self.error))
            .unwrap_or(default)
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Body of a `/check-session` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCheckResponse {
    #[serde(default)]
    pub valid: bool,
}

/// Body of a `/logout` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {
    #[serde(default)]
    pub success: bool,
}

/// An authenticated session established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: Option<String>,
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
