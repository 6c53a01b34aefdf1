// src/client/main.rs

//! Terminal front end for the keylogin form controller.
//!
//! Usage:
//!   keylogin_client --username neo --key ABC-123
//!   keylogin_client --profile key_only --remember
//!
//! A missing license key is read from stdin (or taken from the remembered
//! key when the profile supports it).

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use clap::Parser;

use keylogin::client::{
    Capabilities, Credentials, FileStore, FormController, FormPhase, FormProfile, FormView,
    HttpValidationClient, KeyValueStore, MemoryStore, Navigator, StatusKind, UiState,
};
use keylogin::config::get_config;
use keylogin::errors::{LoginError, LoginResult};
use keylogin::hardware::SystemFingerprintSource;
use keylogin::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "keylogin_client")]
#[command(about = "Log in with a license key")]
struct Args {
    /// Username (ignored by the key_only profile)
    #[arg(short, long)]
    username: Option<String>,

    /// License key; read from stdin when omitted
    #[arg(short, long)]
    key: Option<String>,

    /// Form profile: standard or key_only (defaults to config)
    #[arg(short, long)]
    profile: Option<String>,

    /// Base URL of the validation API (defaults to config)
    #[arg(long)]
    api_url: Option<String>,

    /// Remember the key after a successful login (key_only profile)
    #[arg(long, conflicts_with = "forget")]
    remember: bool,

    /// Forget any remembered key
    #[arg(long)]
    forget: bool,
}

/// Prints status changes to the terminal.
#[derive(Default)]
struct TerminalView {
    last_status: Mutex<Option<String>>,
}

impl FormView for TerminalView {
    fn render(&self, state: &UiState) {
        let Ok(mut last) = self.last_status.lock() else {
            return;
        };
        let current = state.status.as_ref().map(|s| s.text.clone());
        if *last == current {
            return;
        }
        if let Some(status) = &state.status {
            let marker = match status.kind {
                StatusKind::Info => "..",
                StatusKind::Success => "ok",
                StatusKind::Error => "!!",
            };
            println!("[{marker}] {}", status.text);
        }
        *last = current;
    }
}

/// Resolves routes against the server origin and prints the target.
struct TerminalNavigator {
    origin: String,
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        println!("Redirecting to {}{}", self.origin, route);
    }
}

fn prompt(label: &str) -> LoginResult<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> LoginResult<()> {
    let args = Args::parse();
    let config = get_config()?;
    init_tracing(&config.logging);

    let mut client_config = config.client.clone();
    if let Some(url) = args.api_url {
        client_config.api_base_url = url;
    }

    let profile_name = args.profile.as_deref().unwrap_or(&client_config.profile);
    let profile = FormProfile::from_name(profile_name)
        .ok_or_else(|| LoginError::Config(format!("unknown profile '{profile_name}'")))?;

    let store: Arc<dyn KeyValueStore> = match FileStore::default_location() {
        Some(store) => Arc::new(store),
        None => Arc::new(MemoryStore::new()),
    };

    let origin = client_config
        .api_base_url
        .trim_end_matches('/')
        .trim_end_matches("/api")
        .to_string();

    let caps = Capabilities {
        fingerprint: Arc::new(SystemFingerprintSource::new(
            "keylogin-client",
            client_config.app_version.clone(),
        )),
        store,
        navigator: Arc::new(TerminalNavigator { origin }),
        view: Arc::new(TerminalView::default()),
    };

    let transport = HttpValidationClient::new(&client_config)?;
    let mut form = FormController::new(
        profile,
        client_config.app_version.clone(),
        transport,
        caps,
    );

    if args.forget {
        form.set_remember_key(false);
    } else if args.remember {
        form.set_remember_key(true);
    }

    let username = match (&args.username, form.profile().require_username) {
        (Some(name), _) => name.clone(),
        (None, true) => prompt("Username")?,
        (None, false) => String::new(),
    };

    let key = match (args.key, form.ui().prefilled_key.clone()) {
        (Some(key), _) => key,
        (None, Some(remembered)) => {
            println!("Using remembered license key");
            remembered
        }
        (None, None) => prompt("License key")?,
    };

    form.submit(&Credentials::new(username, key)).await;

    // Let the post-login redirect fire.
    while form.redirect_pending() {
        let Some(wait) = form.time_until_next_timer() else {
            break;
        };
        tokio::time::sleep(wait).await;
        form.advance(wait);
    }

    if form.ui().phase == FormPhase::Success {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
