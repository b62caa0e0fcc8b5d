//! Availability HTTP Server Binary
//!
//! Main entry point for the region availability REST API. It loads the
//! configuration, initializes the repository backend and starts serving.
//!
//! # Usage
//!
//! ```bash
//! # Run with the local (in-memory) repository (default)
//! cargo run --bin dostupnost-server --features "local-repo,http-server"
//!
//! # Run against the SQLite history store
//! REPOSITORY_TYPE=sqlite HISTORY_DB=region_history.db \
//!   cargo run --bin dostupnost-server --features "sqlite-repo,http-server"
//! ```
//!
//! # Environment Variables
//!
//! - `HOST` / `PORT`: bind address (default: 0.0.0.0:8080)
//! - `REPOSITORY_TYPE`: local | file | github | sqlite (default: local)
//! - `DATA_DIR`, `HISTORY_DB`, `GITHUB_RAW_BASE`: backend locations
//! - `LDAP_GATEWAY_URL`, `ADMIN_USERNAME`, `ADMIN_PASSWORD`, `AUTH_USERS`:
//!   verifier chain settings
//! - `RUST_LOG`: log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dostupnost_rust::config::ServiceConfig;
use dostupnost_rust::http::{create_router, AppState};
use dostupnost_rust::store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    info!("Starting availability HTTP server");

    let config = ServiceConfig::load().map_err(anyhow::Error::msg)?;

    // Initialize the global repository once and reuse it across the app
    store::init_repository(&config)?;
    let repository = std::sync::Arc::clone(store::get_repository()?);
    info!("Repository initialized: {}", repository.backend_name());

    let state = AppState::new(repository, config.clone());
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
