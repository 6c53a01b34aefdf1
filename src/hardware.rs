//! Native fingerprint signals for the current machine.
//!
//! The user agent carries the host name and login user, so two machines on
//! the same OS and architecture still produce different fingerprints. On
//! Linux the GPU and the active display mode are also read from the DRM
//! sysfs tree. Other platforms report no GPU and an unknown screen, which
//! selects the reduced fingerprint signal set.

use std::env;

use crate::fingerprint::{FingerprintSource, GpuInfo};

#[cfg(target_os = "linux")]
pub mod linux;

/// Placeholder for a host signal that cannot be read.
const UNKNOWN: &str = "unknown";

/// Reads fingerprint signals from the running system.
#[derive(Debug, Clone)]
pub struct SystemFingerprintSource {
    app_name: String,
    app_version: String,
    hostname: String,
    user: String,
}

impl SystemFingerprintSource {
    pub fn new(app_name: impl Into<String>, app_version: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            app_version: app_version.into(),
            hostname: host_name(),
            user: user_name(),
        }
    }

    /// Replace the detected host name and user.
    pub fn with_host(mut self, hostname: impl Into<String>, user: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self.user = user.into();
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

impl Default for SystemFingerprintSource {
    fn default() -> Self {
        Self::new("keylogin", env!("CARGO_PKG_VERSION"))
    }
}

/// Machine host name, or `"unknown"`.
pub fn host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Login user from `USER` / `USERNAME`, or `"unknown"`.
pub fn user_name() -> String {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

impl FingerprintSource for SystemFingerprintSource {
    fn user_agent(&self) -> String {
        format!(
            "{}/{} ({}; {}; {}; {})",
            self.app_name,
            self.app_version,
            env::consts::OS,
            env::consts::ARCH,
            self.hostname,
            self.user
        )
    }

    fn screen_size(&self) -> (u32, u32) {
        #[cfg(target_os = "linux")]
        {
            linux::read_screen_size(std::path::Path::new(linux::DRM_ROOT)).unwrap_or((0, 0))
        }
        #[cfg(not(target_os = "linux"))]
        {
            (0, 0)
        }
    }

    fn gpu_info(&self) -> Option<GpuInfo> {
        #[cfg(target_os = "linux")]
        {
            linux::read_gpu_info(std::path::Path::new(linux::DRM_ROOT))
        }
        #[cfg(not(target_os = "linux"))]
        {
            None
        }
    }
}
