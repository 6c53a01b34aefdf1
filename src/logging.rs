//! Tracing subscriber setup shared by the keylogin binaries.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Does nothing when
/// logging is disabled or a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) {
    if !config.enabled {
        return;
    }

    let level = config.level.to_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "keylogin={level},keylogin_server={level},keylogin_client={level}"
        ))
    });

    let _ = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .try_init();
}
