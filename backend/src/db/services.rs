//! Startup operations run against a repository before the server listens.
//!
//! The connectivity probe is fatal when it fails; schema initialization
//! failures are only reported and startup continues.

use tracing::{error, info};

use super::repository::{ProductRepository, RepositoryError};

/// Outcome of [`bootstrap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Whether the products table is known to exist.
    pub schema_ready: bool,
}

/// Probe the store with one pooled connection.
///
/// Returns `true` when the probe query answered as expected.
pub async fn probe_connectivity(repo: &dyn ProductRepository) -> bool {
    info!("Waiting for database connection...");
    match repo.health_check().await {
        Ok(true) => {
            info!("Database connection: SUCCESS");
            true
        }
        Ok(false) => {
            error!("Database connection: FAILED (unexpected probe result)");
            false
        }
        Err(e) => {
            error!(error = %e, "Database connection: FAILED");
            false
        }
    }
}

/// Create the products table if needed. Returns `true` on success.
pub async fn initialize_database(repo: &dyn ProductRepository) -> bool {
    info!("Initializing database...");
    match repo.initialize_schema().await {
        Ok(()) => {
            info!("PRODUCTS table: READY");
            true
        }
        Err(e) => {
            error!(error = %e, "Database initialization failed");
            false
        }
    }
}

/// Run the startup sequence: probe connectivity, then initialize the schema.
///
/// # Errors
/// Returns a connection error if the probe fails. A failed schema
/// initialization is reported in the returned [`BootstrapReport`] instead.
pub async fn bootstrap(repo: &dyn ProductRepository) -> Result<BootstrapReport, RepositoryError> {
    if !probe_connectivity(repo).await {
        return Err(RepositoryError::connection(
            "Cannot start server - database connection failed",
        ));
    }

    let schema_ready = initialize_database(repo).await;
    Ok(BootstrapReport { schema_ready })
}
