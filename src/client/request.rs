//! Request payloads sent to the validation API.

use serde::{Deserialize, Serialize};

use crate::fingerprint::{compute_fingerprint, FingerprintSource};
use crate::hash::hash_string;

/// Raw form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub license_key: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, license_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            license_key: license_key.into(),
        }
    }

    /// Key-only credentials (no username field on the form).
    pub fn key_only(license_key: impl Into<String>) -> Self {
        Self::new(String::new(), license_key)
    }

    /// Copy with both fields trimmed.
    pub fn trimmed(&self) -> Self {
        Self::new(self.username.trim(), self.license_key.trim())
    }
}

/// Body of `POST /validate`.
///
/// The license key never travels in plaintext; `key` and `hwid` are
/// SHA-256 hex digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub key: String,
    pub hwid: String,
    pub app_version: String,
}

impl ValidationRequest {
    /// Hash the key, fingerprint the device and assemble the request.
    ///
    /// `username` is `None` for forms that do not collect one.
    pub fn build(
        username: Option<&str>,
        license_key: &str,
        fingerprint: &dyn FingerprintSource,
        app_version: &str,
    ) -> Self {
        Self {
            username: username.map(str::to_string),
            key: hash_string(license_key),
            hwid: compute_fingerprint(fingerprint),
            app_version: app_version.to_string(),
        }
    }
}

/// Body of `POST /check-session` and `POST /logout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub session_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::StaticFingerprintSource;
    use crate::hash::is_hash_hex;

    #[test]
    fn build_hashes_key_and_fingerprint() {
        let source = StaticFingerprintSource::new("ua", 1, 1);
        let req = ValidationRequest::build(Some("neo"), "ABC-123", &source, "1.0.0");

        assert_eq!(req.username.as_deref(), Some("neo"));
        assert_eq!(req.key, hash_string("ABC-123"));
        assert!(is_hash_hex(&req.hwid));
        assert_ne!(req.key, "ABC-123");
    }

    #[test]
    fn username_is_omitted_when_absent() {
        let source = StaticFingerprintSource::new("ua", 1, 1);
        let req = ValidationRequest::build(None, "ABC-123", &source, "1.0.0");
        let json = serde_json::to_value(&req).unwrap();

        assert!(json.get("username").is_none());
        assert_eq!(json["app_version"], "1.0.0");
        assert!(json["key"].is_string());
        assert!(json["hwid"].is_string());
    }

    #[test]
    fn credentials_trim() {
        let creds = Credentials::new("  neo ", "\tABC-123\n").trimmed();
        assert_eq!(creds, Credentials::new("neo", "ABC-123"));
    }
}
