//! keylogin - license-key login for Rust applications
//!
//! The crate hashes a license key, fingerprints the device and submits both
//! to a validation API, driving a small login-form state machine on the way.
//!
//! # Features
//!
//! - `server` - Demo validation backend (axum). Enabled by default.
//!
//! # Example
//!
//! ```toml
//! # Client and demo server
//! keylogin = { git = "https://github.com/dmriding/keylogin" }
//!
//! # Client only
//! keylogin = { git = "https://github.com/dmriding/keylogin", default-features = false }
//! ```

// Core modules (always available)
pub mod config;
pub mod errors;
pub mod fingerprint;
pub mod hardware;
pub mod hash;
pub mod logging;
pub mod timer;

// Client-related modules (always available)
pub mod client {
    pub mod form;
    pub mod request;
    pub mod responses;
    pub mod storage;
    pub mod transport;

    pub use form::{
        Capabilities, FormController, FormPhase, FormProfile, FormView, Navigator, StatusKind,
        StatusMessage, SubmitOutcome, UiState,
    };
    pub use request::{Credentials, SessionRequest, ValidationRequest};
    pub use responses::{Session, ValidationResponse};
    pub use storage::{FileStore, KeyValueStore, MemoryStore, RememberedKey};
    pub use transport::{HttpValidationClient, ValidationTransport};
}

// Server-related modules (requires "server" feature)
#[cfg(feature = "server")]
#[path = "server/mod.rs"]
pub mod server;
