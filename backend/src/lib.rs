//! # Product Service
//!
//! A small REST service exposing CRUD operations over a single `products`
//! table backed by a pooled relational store.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: the product entity, id type and input validation
//! - [`db`]: connection pool, repository trait, MySQL and in-memory backends,
//!   startup probe and schema initialization
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Request lifecycle
//!
//! router → handler validates input → repository borrows one pooled
//! connection → statement(s) run → connection released (on every path) →
//! JSON envelope written.

pub mod db;
pub mod models;

#[cfg(feature = "http-server")]
pub mod http;
