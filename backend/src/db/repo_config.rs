//! Repository configuration file support.
//!
//! This module reads repository selection and MySQL settings from a
//! `repository.toml` file, as an alternative to environment variables.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::config::DbConfig;
use super::factory::RepositoryType;
use super::repository::RepositoryError;

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub mysql: MySqlSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// MySQL connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MySqlSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl Default for MySqlSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: String::new(),
            database: default_database(),
            max_connections: default_max_connections(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

fn default_host() -> String {
    DbConfig::default().host
}

fn default_port() -> u16 {
    DbConfig::default().port
}

fn default_user() -> String {
    DbConfig::default().user
}

fn default_database() -> String {
    DbConfig::default().database
}

fn default_max_connections() -> u32 {
    DbConfig::default().max_pool_size
}

fn default_connect_timeout() -> u64 {
    DbConfig::default().connection_timeout_sec
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse repository configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Locate `repository.toml` in the standard locations.
    ///
    /// Searches, in order:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn find_default_location() -> Option<PathBuf> {
        [
            PathBuf::from("repository.toml"),
            PathBuf::from("backend/repository.toml"),
            PathBuf::from("../repository.toml"),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Load repository configuration from the default location.
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let path = Self::find_default_location().ok_or_else(|| {
            RepositoryError::configuration("No repository.toml found in standard locations")
        })?;
        Self::from_file(path)
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Database settings as a [`DbConfig`].
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            host: self.mysql.host.clone(),
            port: self.mysql.port,
            user: self.mysql.user.clone(),
            password: self.mysql.password.clone(),
            database: self.mysql.database.clone(),
            max_pool_size: self.mysql.max_connections.max(1),
            connection_timeout_sec: self.mysql.connect_timeout,
        }
    }
}
