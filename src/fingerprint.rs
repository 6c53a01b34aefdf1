//! Device fingerprinting.
//!
//! A fingerprint is built from a handful of observable signals (user agent,
//! screen resolution and, when available, GPU renderer/vendor strings) and is
//! hashed before it leaves the device. It is advisory only: two devices may
//! share a fingerprint and one device's fingerprint may change over time.

use crate::hash::hash_string;

/// GPU identification strings, when the platform exposes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuInfo {
    pub renderer: String,
    pub vendor: String,
}

/// Provider of raw fingerprint signals.
///
/// Implementations must not fail: a signal that cannot be read is reported
/// as absent (`None` for GPU info, `(0, 0)` for an unknown screen).
pub trait FingerprintSource: Send + Sync {
    fn user_agent(&self) -> String;

    /// Screen width and height in pixels.
    fn screen_size(&self) -> (u32, u32);

    /// Renderer and vendor strings, or `None` if the rendering context or
    /// its debug information is unavailable.
    fn gpu_info(&self) -> Option<GpuInfo>;
}

/// Snapshot of the signals read from a [`FingerprintSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintSignals {
    pub user_agent: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub gpu: Option<GpuInfo>,
}

impl FingerprintSignals {
    /// Build the delimited fingerprint string.
    ///
    /// `{user_agent}-{renderer}-{vendor}-{width}x{height}` with GPU info,
    /// `{user_agent}-{width}x{height}` without it.
    pub fn to_fingerprint_string(&self) -> String {
        match &self.gpu {
            Some(gpu) => format!(
                "{}-{}-{}-{}x{}",
                self.user_agent, gpu.renderer, gpu.vendor, self.screen_width, self.screen_height
            ),
            None => format!(
                "{}-{}x{}",
                self.user_agent, self.screen_width, self.screen_height
            ),
        }
    }
}

/// Read all signals from `source`.
pub fn collect_signals(source: &dyn FingerprintSource) -> FingerprintSignals {
    let (screen_width, screen_height) = source.screen_size();
    let gpu = source.gpu_info();
    if gpu.is_none() {
        tracing::debug!("GPU info unavailable, using reduced fingerprint signal set");
    }

    FingerprintSignals {
        user_agent: source.user_agent(),
        screen_width,
        screen_height,
        gpu,
    }
}

/// Compute the hashed device fingerprint (the HWID sent to the server).
pub fn compute_fingerprint(source: &dyn FingerprintSource) -> String {
    let signals = collect_signals(source);
    hash_string(&signals.to_fingerprint_string())
}

/// A source with fixed signal values.
///
/// Useful when the signals were captured elsewhere (for example by a browser
/// front end) and only need to be hashed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFingerprintSource {
    pub user_agent: String,
    pub screen: (u32, u32),
    pub gpu: Option<GpuInfo>,
}

impl StaticFingerprintSource {
    pub fn new(user_agent: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            user_agent: user_agent.into(),
            screen: (width, height),
            gpu: None,
        }
    }

    pub fn with_gpu(mut self, renderer: impl Into<String>, vendor: impl Into<String>) -> Self {
        self.gpu = Some(GpuInfo {
            renderer: renderer.into(),
            vendor: vendor.into(),
        });
        self
    }
}

impl FingerprintSource for StaticFingerprintSource {
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    fn gpu_info(&self) -> Option<GpuInfo> {
        self.gpu.clone()
    }
}
