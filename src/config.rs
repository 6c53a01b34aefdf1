//! Configuration system for keylogin.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. `config.toml` file
//! 3. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `KEYLOGIN_SERVER_HOST` - Demo server bind address
//! - `KEYLOGIN_SERVER_PORT` (or `PORT`) - Demo server port
//! - `KEYLOGIN_DEMO_MESSAGE` - Failure message returned by the demo backend
//! - `KEYLOGIN_API_URL` - Base URL of the validation API used by the client
//! - `KEYLOGIN_APP_VERSION` - `app_version` sent with every validation request
//! - `KEYLOGIN_HTTP_TIMEOUT` - Client request timeout in seconds
//! - `KEYLOGIN_PROFILE` - Form profile: `standard` or `key_only`
//! - `KEYLOGIN_LOGGING_ENABLED` - Enable log output
//! - `KEYLOGIN_LOG_LEVEL` - Log level (trace, debug, info, warn, error)

use config::Config;
use serde::Deserialize;
use std::env;
use std::sync::OnceLock;

use crate::errors::{LoginError, LoginResult};

/// Message the demo backend answers every validation request with.
pub const DEMO_MESSAGE: &str = "Demo mode: Please configure your API endpoint in the backend";

/// Global configuration singleton.
static CONFIG: OnceLock<KeyLoginConfig> = OnceLock::new();

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeyLoginConfig {
    /// Demo server configuration
    pub server: ServerConfig,
    /// Client (form controller and transport) configuration
    pub client: ClientConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Demo validation server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Failure message returned by `/api/validate`
    pub demo_message: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            demo_message: DEMO_MESSAGE.to_string(),
        }
    }
}

/// Client-side configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API; `/validate`, `/check-session` and `/logout` are appended
    pub api_base_url: String,
    /// Version string sent as `app_version`
    pub app_version: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent for HTTP requests
    pub user_agent: String,
    /// Form profile name: `standard` or `key_only`
    pub profile: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000/api".to_string(),
            app_version: "1.0.0".to_string(),
            timeout_secs: 30,
            user_agent: "keylogin-client/1.0".to_string(),
            profile: "standard".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
        }
    }
}

impl KeyLoginConfig {
    /// Load configuration from file and environment.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. `config.toml` file (optional)
    /// 3. Environment variables
    fn load() -> LoginResult<Self> {
        let port_override = env::var("KEYLOGIN_SERVER_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|v| v.parse::<i64>().ok());

        let settings = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.demo_message", DEMO_MESSAGE)?
            .set_default("client.api_base_url", "http://127.0.0.1:5000/api")?
            .set_default("client.app_version", "1.0.0")?
            .set_default("client.timeout_secs", 30)?
            .set_default("client.user_agent", "keylogin-client/1.0")?
            .set_default("client.profile", "standard")?
            .set_default("logging.enabled", true)?
            .set_default("logging.level", "info")?
            // Load from config.toml (optional)
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables
            .set_override_option("server.host", env::var("KEYLOGIN_SERVER_HOST").ok())?
            .set_override_option("server.port", port_override)?
            .set_override_option(
                "server.demo_message",
                env::var("KEYLOGIN_DEMO_MESSAGE").ok(),
            )?
            .set_override_option("client.api_base_url", env::var("KEYLOGIN_API_URL").ok())?
            .set_override_option(
                "client.app_version",
                env::var("KEYLOGIN_APP_VERSION").ok(),
            )?
            .set_override_option(
                "client.timeout_secs",
                env::var("KEYLOGIN_HTTP_TIMEOUT")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )?
            .set_override_option("client.profile", env::var("KEYLOGIN_PROFILE").ok())?
            .set_override_option(
                "logging.enabled",
                env::var("KEYLOGIN_LOGGING_ENABLED")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok()),
            )?
            .set_override_option("logging.level", env::var("KEYLOGIN_LOG_LEVEL").ok())?
            .build()
            .map_err(|e| LoginError::Config(format!("failed to build config: {e}")))?;

        settings
            .try_deserialize()
            .map_err(|e| LoginError::Config(format!("failed to deserialize config: {e}")))
    }

    /// Load and validate a fresh configuration, bypassing the global cache.
    pub fn from_env() -> LoginResult<Self> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> LoginResult<()> {
        if self.server.port == 0 {
            return Err(LoginError::Config(
                "server.port must be greater than 0".to_string(),
            ));
        }

        let url = self.client.api_base_url.trim();
        if url.is_empty() {
            return Err(LoginError::Config(
                "client.api_base_url cannot be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(LoginError::Config(format!(
                "client.api_base_url must start with http:// or https://, got '{url}'"
            )));
        }

        if self.client.app_version.trim().is_empty() {
            return Err(LoginError::Config(
                "client.app_version cannot be empty".to_string(),
            ));
        }

        if self.client.timeout_secs == 0 {
            return Err(LoginError::Config(
                "client.timeout_secs must be greater than 0".to_string(),
            ));
        }

        match self.client.profile.as_str() {
            "standard" | "key_only" => {}
            other => {
                return Err(LoginError::Config(format!(
                    "client.profile must be 'standard' or 'key_only', got '{other}'"
                )));
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(LoginError::Config(format!(
                    "logging.level must be one of: trace, debug, info, warn, error. Got '{other}'"
                )));
            }
        }

        Ok(())
    }
}

impl ClientConfig {
    /// Full URL for an API route, e.g. `endpoint("validate")`.
    pub fn endpoint(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }
}

/// Get the global configuration.
///
/// This loads the configuration on first access and caches it.
/// Returns an error if configuration loading or validation fails.
pub fn get_config() -> LoginResult<&'static KeyLoginConfig> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }

    let config = KeyLoginConfig::from_env()?;

    // Another thread may have won the race; either value is valid.
    let _ = CONFIG.set(config);

    CONFIG
        .get()
        .ok_or_else(|| LoginError::Config("configuration was not initialized".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = KeyLoginConfig::default();
        config.validate().unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.client.app_version, "1.0.0");
        assert_eq!(config.server.demo_message, DEMO_MESSAGE);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = KeyLoginConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = KeyLoginConfig::default();
        config.client.api_base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = KeyLoginConfig::default();
        config.client.profile = "fancy".to_string();
        assert!(config.validate().is_err());

        let mut config = KeyLoginConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn endpoint_joins_paths() {
        let mut client = ClientConfig::default();
        client.api_base_url = "https://example.com/api/".to_string();
        assert_eq!(client.endpoint("/validate"), "https://example.com/api/validate");
        assert_eq!(client.endpoint("logout"), "https://example.com/api/logout");
    }
}
