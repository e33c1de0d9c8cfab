//! Product HTTP Server Binary
//!
//! This is the main entry point for the product REST API server.
//! It probes the database, ensures the products table exists, sets up the
//! HTTP router, and serves requests until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Run with the in-memory repository (default features)
//! cargo run --bin product-server
//!
//! # Run against MySQL
//! DB_HOST=db DB_USER=shop DB_PASSWORD=secret \
//!   cargo run --bin product-server --features mysql-repo
//! ```
//!
//! # Environment Variables
//!
//! Variables are also read from a `.env` file in the working directory.
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 3000)
//! - `REPOSITORY_TYPE`: `mysql` or `local`
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_DATABASE`: MySQL connection
//! - `DB_POOL_MAX`: Maximum pooled connections (default: 10)
//! - `RUST_LOG`: Log level (default: info)
//!
//! A `repository.toml` file, when present, takes precedence over the
//! `REPOSITORY_TYPE` and `DB_*` variables.

use std::env;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use product_service::db::{self, ProductRepository, RepositoryConfig, RepositoryFactory};
use product_service::http::{create_router_with_limit, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting product server");

    let server_config = ServerConfig::from_env().map_err(anyhow::Error::msg)?;
    let repository = create_repository()?;

    if let Err(e) = db::bootstrap(repository.as_ref()).await {
        error!(error = %e, "Cannot start server - database connection failed");
        std::process::exit(1);
    }

    let stats = repository.pool_stats();
    info!(max_connections = stats.max_size, "Connection pool ready");

    let app = create_router_with_limit(
        AppState::new(Arc::clone(&repository)),
        server_config.body_limit,
    );

    let bind_address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    repository.shutdown().await;
    info!("Server stopped");
    Ok(())
}

/// Build the repository from `repository.toml` if one exists, otherwise
/// from the environment.
fn create_repository() -> anyhow::Result<Arc<dyn ProductRepository>> {
    let repository = match RepositoryConfig::find_default_location() {
        Some(path) => {
            info!(path = %path.display(), "Using repository configuration file");
            RepositoryFactory::from_config_file(path)?
        }
        None => RepositoryFactory::from_env()?,
    };
    Ok(repository)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
