//! HTTP server module.
//!
//! An axum-based HTTP server exposing CRUD operations on products as a
//! JSON REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Request parsing and validation                         │
//! │  - JSON envelope serialization                            │
//! │  - CORS, body limit, error mapping                        │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - Pooled connections, one per call                       │
//! │  - LocalRepository / MySqlRepository                      │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use router::{create_router, create_router_with_limit};
pub use state::AppState;
