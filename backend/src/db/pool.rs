//! Bounded connection pool for the in-process backend.
//!
//! [`LocalPool`] hands out at most `max_size` connections at a time. Callers
//! beyond the limit wait, in request order, until a connection is returned;
//! the wait queue itself is unbounded. A [`PooledConnection`] gives its slot
//! back when dropped, so release happens exactly once on every exit path of
//! the borrowing code, including `?` returns and panics.

use std::ops::Deref;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::repository::{ErrorContext, RepositoryError, RepositoryResult};

/// Default upper bound on concurrently borrowed connections.
pub const DEFAULT_MAX_SIZE: u32 = 10;

/// Pool occupancy snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Maximum pool size
    pub max_size: u32,
    /// Number of connections currently borrowed
    pub connections_in_use: u32,
    /// Number of connections ready to be handed out
    pub idle_connections: u32,
}

/// A pool of connections onto a shared resource `T`.
#[derive(Debug)]
pub struct LocalPool<T> {
    slots: Arc<Semaphore>,
    resource: Arc<T>,
    max_size: u32,
}

impl<T> LocalPool<T> {
    /// Create a pool with room for `max_size` concurrent connections (at least one).
    pub fn new(resource: T, max_size: u32) -> Self {
        let max_size = max_size.max(1);
        Self {
            // Semaphore::new is FIFO-fair: waiters are served in arrival order.
            slots: Arc::new(Semaphore::new(max_size as usize)),
            resource: Arc::new(resource),
            max_size,
        }
    }

    /// Borrow a connection, waiting for one to be released if the pool is exhausted.
    ///
    /// Fails only when the pool has been closed.
    pub async fn acquire(&self) -> RepositoryResult<PooledConnection<T>> {
        let permit = Arc::clone(&self.slots).acquire_owned().await.map_err(|_| {
            RepositoryError::connection_with_context(
                "connection pool is closed",
                ErrorContext::new("acquire")
                    .with_details(format!("max_size={}", self.max_size)),
            )
        })?;
        tracing::trace!(idle = self.slots.available_permits(), "connection acquired");

        Ok(PooledConnection {
            resource: Arc::clone(&self.resource),
            _permit: permit,
        })
    }

    /// Close the pool. Pending and future `acquire` calls fail; connections
    /// already borrowed stay usable until dropped.
    pub fn close(&self) {
        self.slots.close();
    }

    pub fn is_closed(&self) -> bool {
        self.slots.is_closed()
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn stats(&self) -> PoolStats {
        let idle = (self.slots.available_permits() as u32).min(self.max_size);
        PoolStats {
            max_size: self.max_size,
            connections_in_use: self.max_size - idle,
            idle_connections: idle,
        }
    }
}

/// A borrowed connection. Returned to the pool on drop.
#[derive(Debug)]
pub struct PooledConnection<T> {
    resource: Arc<T>,
    _permit: OwnedSemaphorePermit,
}

impl<T> Deref for PooledConnection<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.resource
    }
}
