use std::env;

use serial_test::serial;

use keylogin::config::{KeyLoginConfig, DEMO_MESSAGE};
use keylogin::errors::LoginError;

const VARS: &[&str] = &[
    "KEYLOGIN_SERVER_HOST",
    "KEYLOGIN_SERVER_PORT",
    "PORT",
    "KEYLOGIN_DEMO_MESSAGE",
    "KEYLOGIN_API_URL",
    "KEYLOGIN_APP_VERSION",
    "KEYLOGIN_HTTP_TIMEOUT",
    "KEYLOGIN_PROFILE",
    "KEYLOGIN_LOGGING_ENABLED",
    "KEYLOGIN_LOG_LEVEL",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn defaults_without_env() {
    clear_env();

    let config = KeyLoginConfig::from_env().unwrap();
    assert_eq!(config.server.port, 5000);
    assert_eq!(config.server.demo_message, DEMO_MESSAGE);
    assert_eq!(config.client.app_version, "1.0.0");
    assert_eq!(config.client.profile, "standard");
}

#[test]
#[serial]
fn env_overrides_values() {
    clear_env();
    env::set_var("KEYLOGIN_SERVER_PORT", "8081");
    env::set_var("KEYLOGIN_API_URL", "https://login.example.com/api");
    env::set_var("KEYLOGIN_PROFILE", "key_only");
    env::set_var("KEYLOGIN_DEMO_MESSAGE", "Backend offline");

    let config = KeyLoginConfig::from_env().unwrap();
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.client.api_base_url, "https://login.example.com/api");
    assert_eq!(config.client.profile, "key_only");
    assert_eq!(config.server.demo_message, "Backend offline");

    clear_env();
}

#[test]
#[serial]
fn port_falls_back_to_plain_port_var() {
    clear_env();
    env::set_var("PORT", "7000");
    assert_eq!(KeyLoginConfig::from_env().unwrap().server.port, 7000);

    env::set_var("KEYLOGIN_SERVER_PORT", "7001");
    assert_eq!(KeyLoginConfig::from_env().unwrap().server.port, 7001);

    clear_env();
}

#[test]
#[serial]
fn invalid_profile_is_rejected() {
    clear_env();
    env::set_var("KEYLOGIN_PROFILE", "fancy");

    let err = KeyLoginConfig::from_env().unwrap_err();
    assert!(matches!(err, LoginError::Config(_)));

    clear_env();
}

#[test]
#[serial]
fn invalid_log_level_is_rejected() {
    clear_env();
    env::set_var("KEYLOGIN_LOG_LEVEL", "verbose");

    assert!(KeyLoginConfig::from_env().is_err());

    clear_env();
}

#[test]
#[serial]
fn non_http_api_url_is_rejected() {
    clear_env();
    env::set_var("KEYLOGIN_API_URL", "ftp://example.com/api");

    assert!(KeyLoginConfig::from_env().is_err());

    clear_env();
}
