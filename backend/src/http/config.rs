//! HTTP server configuration.

use std::env;

/// Request bodies larger than this are rejected before reaching a handler.
pub const DEFAULT_BODY_LIMIT: usize = 100 * 1024;

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    pub host: String,
    /// Port to bind to (default: 3000)
    pub port: u16,
    /// Maximum accepted request body size in bytes
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Read `HOST` and `PORT` from the environment.
    ///
    /// # Errors
    /// Returns an error if `PORT` is set but is not a valid port number.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| format!("PORT must be a valid port number, got '{}'", raw))?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            ..defaults
        })
    }

    /// Address string to bind, resolved by the listener (hostnames allowed).
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
