//! Login form controller.
//!
//! [`FormController`] owns the form's UI state and runs the submission state
//! machine:
//!
//! ```text
//! Idle --submit (fields filled)--> Submitting --success--> Success
//!   ^                                  |
//!   +-------- failure / error ---------+
//! ```
//!
//! Side effects go through injected capabilities or owned state:
//!
//! - [`FormView`] renders [`UiState`] snapshots,
//! - [`KeyValueStore`] holds the remembered key,
//! - [`Navigator`] performs the post-login redirect,
//! - delayed effects sit in a [`TimerQueue`] advanced by the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::client::request::{Credentials, SessionRequest, ValidationRequest};
use crate::client::responses::{Session, ValidationResponse};
use crate::client::storage::{KeyValueStore, RememberedKey};
use crate::client::transport::ValidationTransport;
use crate::fingerprint::FingerprintSource;
use crate::timer::{TimerId, TimerQueue};

/// Route navigated to after a successful login.
pub const DASHBOARD_ROUTE: &str = "/dashboard";
/// Delay between a successful login and the redirect.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);
/// How long a status message stays visible.
pub const STATUS_DISPLAY: Duration = Duration::from_millis(5000);

pub const MSG_VERIFYING: &str = "Verifying...";
pub const MSG_LOGIN_SUCCESS: &str = "Login successful!";
pub const MSG_LOGIN_FAILED: &str = "Login failed";
pub const MSG_UNREACHABLE: &str =
    "Unable to connect to server. Please check your API configuration.";

/// Where the form is in its submission cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Submitting,
    /// Login succeeded; the redirect may still be pending.
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

/// Everything a view needs to draw the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub phase: FormPhase,
    /// Visible status line, if any.
    pub status: Option<StatusMessage>,
    pub submit_enabled: bool,
    pub button_label: String,
    /// State of the "remember key" checkbox.
    pub remember_key: bool,
    /// Key restored from storage, to prefill the key field.
    pub prefilled_key: Option<String>,
}

/// Renders form state. Implemented by whatever owns the actual widgets.
pub trait FormView: Send + Sync {
    fn render(&self, state: &UiState);
}

/// Performs page navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Field requirements and presentation of one form variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormProfile {
    pub name: &'static str,
    /// Username must be filled and is sent with the request.
    pub require_username: bool,
    /// Status text is shown in upper case.
    pub uppercase_status: bool,
    /// The form offers a "remember key" checkbox backed by local storage.
    pub remember_key_enabled: bool,
    pub idle_label: &'static str,
    pub busy_label: &'static str,
    pub validation_message: &'static str,
}

impl FormProfile {
    /// Username + license key, plain status text.
    pub fn standard() -> Self {
        Self {
            name: "standard",
            require_username: true,
            uppercase_status: false,
            remember_key_enabled: false,
            idle_label: "LOGIN",
            busy_label: "AUTHENTICATING...",
            validation_message: "Please fill in all fields",
        }
    }

    /// License key only, upper-case status text, remember-key checkbox.
    pub fn key_only() -> Self {
        Self {
            name: "key_only",
            require_username: false,
            uppercase_status: true,
            remember_key_enabled: true,
            idle_label: "LOGIN",
            busy_label: "VERIFYING...",
            validation_message: "Please enter your license key",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(Self::standard()),
            "key_only" => Some(Self::key_only()),
            _ => None,
        }
    }
}

/// Result of one call to [`FormController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A required field was empty; nothing was sent.
    Rejected { message: String },
    /// The server accepted the credentials.
    Succeeded { message: String },
    /// The server answered with `success: false`.
    Failed { message: String },
    /// Transport or decoding failure.
    Unreachable { message: String },
}

/// Injected capabilities of a [`FormController`].
#[derive(Clone)]
pub struct Capabilities {
    pub fingerprint: Arc<dyn FingerprintSource>,
    pub store: Arc<dyn KeyValueStore>,
    pub navigator: Arc<dyn Navigator>,
    pub view: Arc<dyn FormView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FormTask {
    ClearStatus,
    Navigate(String),
}

/// Restores the idle controls when a submission ends, including when the
/// submission future is dropped mid-flight.
///
/// A settled submission renders its outcome itself, so the guard only
/// renders when the round-trip never settled.
struct SubmitCleanup<'a> {
    ui: &'a mut UiState,
    view: &'a dyn FormView,
    idle_label: &'static str,
    settled: bool,
}

impl Drop for SubmitCleanup<'_> {
    fn drop(&mut self) {
        self.ui.submit_enabled = true;
        self.ui.button_label = self.idle_label.to_string();
        if self.ui.phase == FormPhase::Submitting {
            self.ui.phase = FormPhase::Idle;
            // "Verifying..." has no clear timer of its own.
            self.ui.status = None;
        }
        if !self.settled {
            self.view.render(&*self.ui);
        }
    }
}

/// The login form controller.
pub struct FormController<T: ValidationTransport> {
    profile: FormProfile,
    app_version: String,
    transport: T,
    caps: Capabilities,
    ui: UiState,
    timers: TimerQueue<FormTask>,
    status_timer: Option<TimerId>,
    redirect_timer: Option<TimerId>,
    session: Option<Session>,
}

impl<T: ValidationTransport> FormController<T> {
    /// Create a controller and render its initial state.
    ///
    /// Profiles with a remember-key checkbox restore the stored key.
    pub fn new(
        profile: FormProfile,
        app_version: impl Into<String>,
        transport: T,
        caps: Capabilities,
    ) -> Self {
        let remembered = if profile.remember_key_enabled {
            RememberedKey::load(caps.store.as_ref()).unwrap_or_else(|e| {
                warn!("Failed to load remembered key: {e}");
                None
            })
        } else {
            None
        };

        let ui = UiState {
            phase: FormPhase::Idle,
            status: None,
            submit_enabled: true,
            button_label: profile.idle_label.to_string(),
            remember_key: remembered.is_some(),
            prefilled_key: remembered.map(|r| r.license_key),
        };

        let controller = Self {
            profile,
            app_version: app_version.into(),
            transport,
            caps,
            ui,
            timers: TimerQueue::new(),
            status_timer: None,
            redirect_timer: None,
            session: None,
        };
        controller.render();
        controller
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn profile(&self) -> &FormProfile {
        &self.profile
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether the post-login redirect is still scheduled.
    pub fn redirect_pending(&self) -> bool {
        self.redirect_timer
            .is_some_and(|id| self.timers.is_pending(id))
    }

    /// Time until the next scheduled effect, if any.
    pub fn time_until_next_timer(&self) -> Option<Duration> {
        self.timers.time_until_next()
    }

    /// Toggle the remember-key checkbox. Unchecking forgets the stored key.
    pub fn set_remember_key(&mut self, remember: bool) {
        if !self.profile.remember_key_enabled {
            return;
        }

        self.ui.remember_key = remember;
        if !remember {
            self.ui.prefilled_key = None;
            if let Err(e) = RememberedKey::clear(self.caps.store.as_ref()) {
                warn!("Failed to clear remembered key: {e}");
            }
        }
        self.render();
    }

    /// A form field was edited: hide the status line.
    pub fn on_input(&mut self) {
        if self.ui.status.is_none() {
            return;
        }
        self.clear_status();
        self.render();
    }

    /// Submit the form.
    ///
    /// At most one request is sent. The controls are re-enabled when the
    /// round-trip settles, whatever the outcome.
    pub async fn submit(&mut self, credentials: &Credentials) -> SubmitOutcome {
        let creds = credentials.trimmed();
        let missing_username = self.profile.require_username && creds.username.is_empty();
        if creds.license_key.is_empty() || missing_username {
            let message = self.show_status(self.profile.validation_message, StatusKind::Error);
            self.render();
            return SubmitOutcome::Rejected { message };
        }

        self.cancel_redirect();
        self.clear_status();
        self.ui.phase = FormPhase::Submitting;
        self.ui.submit_enabled = false;
        self.ui.button_label = self.profile.busy_label.to_string();
        self.set_status_text(MSG_VERIFYING, StatusKind::Info);
        self.render();

        let username = self
            .profile
            .require_username
            .then_some(creds.username.as_str());
        let request = ValidationRequest::build(
            username,
            &creds.license_key,
            self.caps.fingerprint.as_ref(),
            &self.app_version,
        );

        let result = {
            let mut cleanup = SubmitCleanup {
                ui: &mut self.ui,
                view: self.caps.view.as_ref(),
                idle_label: self.profile.idle_label,
                settled: false,
            };
            let result = self.transport.validate(&request).await;
            cleanup.settled = true;
            result
        };

        let outcome = match result {
            Ok(resp) if resp.success => self.on_success(&creds, resp),
            Ok(resp) => {
                let text = resp.display_message(MSG_LOGIN_FAILED).to_string();
                info!("Login rejected by server: {text}");
                self.ui.phase = FormPhase::Idle;
                SubmitOutcome::Failed {
                    message: self.show_status(&text, StatusKind::Error),
                }
            }
            Err(e) => {
                warn!("Login request failed: {e}");
                self.ui.phase = FormPhase::Idle;
                SubmitOutcome::Unreachable {
                    message: self.show_status(MSG_UNREACHABLE, StatusKind::Error),
                }
            }
        };

        self.render();
        outcome
    }

    fn on_success(&mut self, creds: &Credentials, resp: ValidationResponse) -> SubmitOutcome {
        let text = resp.display_message(MSG_LOGIN_SUCCESS).to_string();
        info!("Login accepted by server");

        if self.profile.remember_key_enabled {
            let stored = if self.ui.remember_key {
                RememberedKey::save(self.caps.store.as_ref(), &creds.license_key)
            } else {
                RememberedKey::clear(self.caps.store.as_ref())
            };
            if let Err(e) = stored {
                warn!("Failed to update remembered key: {e}");
            }
        }

        self.session = resp.session_token.clone().map(|token| Session {
            username: self
                .profile
                .require_username
                .then(|| creds.username.clone()),
            token,
            expires_at: resp.expires_at_utc(),
        });

        self.ui.phase = FormPhase::Success;
        self.redirect_timer = Some(self.timers.schedule(
            REDIRECT_DELAY,
            FormTask::Navigate(DASHBOARD_ROUTE.to_string()),
        ));

        SubmitOutcome::Succeeded {
            message: self.show_status(&text, StatusKind::Success),
        }
    }

    /// Advance the controller's clock, running every effect that came due.
    pub fn advance(&mut self, elapsed: Duration) {
        let due = self.timers.advance(elapsed);
        if due.is_empty() {
            return;
        }

        for task in due {
            match task {
                FormTask::ClearStatus => {
                    self.status_timer = None;
                    self.ui.status = None;
                }
                FormTask::Navigate(route) => {
                    self.redirect_timer = None;
                    info!(route = %route, "Redirecting after login");
                    self.caps.navigator.navigate(&route);
                }
            }
        }
        self.render();
    }

    /// Ask the server whether the current session is still valid.
    ///
    /// An expired, rejected or unverifiable session is dropped.
    pub async fn check_session(&mut self) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };

        if session.is_expired(Utc::now()) {
            info!("Session expired locally");
            self.session = None;
            return false;
        }

        let request = SessionRequest {
            session_token: session.token.clone(),
            username: session.username.clone(),
        };

        match self.transport.check_session(&request).await {
            Ok(resp) if resp.valid => true,
            Ok(_) => {
                info!("Server reported session as invalid");
                self.session = None;
                false
            }
            Err(e) => {
                warn!("Session check failed: {e}");
                self.session = None;
                false
            }
        }
    }

    /// End the session and return the form to idle.
    ///
    /// The server is told on a best-effort basis; local state is cleared
    /// regardless.
    pub async fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            let request = SessionRequest {
                session_token: session.token,
                username: session.username,
            };
            if let Err(e) = self.transport.logout(&request).await {
                warn!("Logout request failed: {e}");
            }
        }

        self.cancel_redirect();
        self.clear_status();
        self.ui.phase = FormPhase::Idle;
        self.render();
    }

    /// Show `text` and schedule it to clear. Returns the text as displayed.
    fn show_status(&mut self, text: &str, kind: StatusKind) -> String {
        let shown = self.set_status_text(text, kind);
        if let Some(id) = self.status_timer.take() {
            self.timers.cancel(id);
        }
        self.status_timer = Some(self.timers.schedule(STATUS_DISPLAY, FormTask::ClearStatus));
        shown
    }

    fn set_status_text(&mut self, text: &str, kind: StatusKind) -> String {
        let shown = if self.profile.uppercase_status {
            text.to_uppercase()
        } else {
            text.to_string()
        };
        self.ui.status = Some(StatusMessage {
            text: shown.clone(),
            kind,
        });
        shown
    }

    fn clear_status(&mut self) {
        if let Some(id) = self.status_timer.take() {
            self.timers.cancel(id);
        }
        self.ui.status = None;
    }

    fn cancel_redirect(&mut self) {
        if let Some(id) = self.redirect_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn render(&self) {
        self.caps.view.render(&self.ui);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_by_name() {
        assert_eq!(FormProfile::from_name("standard"), Some(FormProfile::standard()));
        assert_eq!(FormProfile::from_name("key_only"), Some(FormProfile::key_only()));
        assert_eq!(FormProfile::from_name("other"), None);
    }

    #[test]
    fn key_only_profile_shape() {
        let profile = FormProfile::key_only();
        assert!(!profile.require_username);
        assert!(profile.uppercase_status);
        assert!(profile.remember_key_enabled);
    }
}
