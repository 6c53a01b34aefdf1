// src/server/main.rs

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use keylogin::config::get_config;
use keylogin::errors::{LoginError, LoginResult};
use keylogin::logging::init_tracing;
use keylogin::server::{build_router, AppState};

#[tokio::main]
async fn main() -> LoginResult<()> {
    let config = get_config()?;
    init_tracing(&config.logging);

    let state = AppState::new(config.server.demo_message.as_str());
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| LoginError::Config(format!("invalid server address: {e}")))?;

    let listener = TcpListener::bind(addr).await?;
    info!("Login demo server running on http://{}", addr);
    info!("Dashboard: http://{}/dashboard", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
