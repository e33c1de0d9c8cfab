//! Database module for product storage.
//!
//! This module provides abstractions for database operations via the Repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers / startup sequence (services.rs)         │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  ProductRepository trait (repository/) - one pooled     │
//! │  connection per call, released on every exit path       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────────┐
//!     │ LocalRepository  │ MySqlRepository│
//!     │ (LocalPool)      │ (diesel r2d2)  │
//!     └──────────────────────────────────┘
//! ```
//!
//! # Modules
//! - `services`: startup probe and schema initialization
//! - `repository`: trait definition and error types
//! - `pool`: bounded connection pool used by the in-memory backend
//! - `repositories::mysql`: MySQL implementation with Diesel ORM
//! - `repositories::local`: In-memory implementation for unit testing and local development
//! - `factory`: Factory for creating repository instances
//!
//! # Usage
//! ```ignore
//! use product_service::db::{services, RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env()?;
//!     services::bootstrap(repo.as_ref()).await?;
//!     let products = repo.list_products().await?;
//!     Ok(())
//! }
//! ```

// When both backends are compiled in, MySQL is the default selection.
#[cfg(not(any(feature = "mysql-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod config;
pub mod factory;
pub mod pool;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

pub use config::DbConfig;
pub use factory::{RepositoryFactory, RepositoryType};
pub use pool::{LocalPool, PoolStats, PooledConnection};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "mysql-repo")]
pub use repositories::MySqlRepository;
pub use repository::{ErrorContext, ProductRepository, RepositoryError, RepositoryResult};
pub use services::{bootstrap, initialize_database, probe_connectivity, BootstrapReport};
