//! Repository factory for dependency injection.
//!
//! The server builds exactly one repository at startup and hands it to the
//! HTTP state; nothing here keeps a process-wide instance.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::config::DbConfig;
use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "mysql-repo")]
use super::repositories::MySqlRepository;
use super::repository::{ProductRepository, RepositoryError, RepositoryResult};

/// Variables that only make sense for a networked store.
const DB_CONNECTION_VARS: &[&str] = &[
    "DB_HOST",
    "DB_PORT",
    "DB_USER",
    "DB_PASSWORD",
    "DB_DATABASE",
];

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// MySQL + Diesel implementation
    MySql,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("mysql", "local"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from the `REPOSITORY_TYPE` environment variable.
    ///
    /// Falls back to MySQL when the `mysql-repo` feature is compiled in,
    /// otherwise to the local repository.
    ///
    /// # Errors
    /// Fails when `REPOSITORY_TYPE` is unknown, or when it is unset while
    /// MySQL connection variables are present but only the in-memory backend
    /// is compiled in. Serving from memory would silently ignore them.
    pub fn from_env() -> Result<Self, String> {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse();
        }

        let selected = Self::compiled_default();
        if selected == Self::Local {
            let given: Vec<&str> = DB_CONNECTION_VARS
                .iter()
                .copied()
                .filter(|var| std::env::var_os(var).is_some())
                .collect();
            if !given.is_empty() {
                return Err(format!(
                    "{} set but the MySQL backend is not compiled in; \
                     build with the `mysql-repo` feature or set REPOSITORY_TYPE=local",
                    given.join(", ")
                ));
            }
        }
        Ok(selected)
    }

    fn compiled_default() -> Self {
        if cfg!(feature = "mysql-repo") {
            Self::MySql
        } else {
            Self::Local
        }
    }
}

/// Repository factory for creating repository instances.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// The local repository only uses `config.max_pool_size`.
    pub fn create(
        repo_type: RepositoryType,
        config: &DbConfig,
    ) -> RepositoryResult<Arc<dyn ProductRepository>> {
        match repo_type {
            RepositoryType::MySql => {
                #[cfg(feature = "mysql-repo")]
                {
                    let repo = Self::create_mysql(config)?;
                    Ok(repo as Arc<dyn ProductRepository>)
                }
                #[cfg(not(feature = "mysql-repo"))]
                {
                    let _ = config;
                    Err(RepositoryError::configuration(
                        "MySQL repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => {
                tracing::warn!("Using the in-memory repository; products are lost on exit");
                Ok(Self::create_local(config.max_pool_size))
            }
        }
    }

    /// Create a MySQL repository. No connection is opened yet.
    #[cfg(feature = "mysql-repo")]
    pub fn create_mysql(config: &DbConfig) -> RepositoryResult<Arc<MySqlRepository>> {
        Ok(Arc::new(MySqlRepository::new(config.clone())?))
    }

    /// Create an in-memory local repository.
    pub fn create_local(max_pool_size: u32) -> Arc<dyn ProductRepository> {
        Arc::new(LocalRepository::with_pool_size(max_pool_size))
    }

    /// Create repository from environment configuration
    /// (`REPOSITORY_TYPE` plus the `DB_*` variables).
    pub fn from_env() -> RepositoryResult<Arc<dyn ProductRepository>> {
        let repo_type = RepositoryType::from_env().map_err(RepositoryError::configuration)?;
        let config = DbConfig::from_env().map_err(RepositoryError::configuration)?;
        Self::create(repo_type, &config)
    }

    /// Create repository from a TOML configuration file.
    pub fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn ProductRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config)
    }

    /// Create repository from a [`RepositoryConfig`] instance.
    pub fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn ProductRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        Self::create(repo_type, &config.to_db_config())
    }
}
