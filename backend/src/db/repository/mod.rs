//! Repository trait for product persistence.
//!
//! Each method borrows exactly one pooled connection for its duration and
//! returns it before the future completes, whether the operation succeeds
//! or fails. Implementations never cache rows; every call goes to the store.

mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;

use crate::db::pool::PoolStats;
use crate::models::{Product, ProductDraft, ProductId};

/// Store contract used by the HTTP handlers and the startup sequence.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Connectivity probe: runs `SELECT 1+1` on a pooled connection.
    ///
    /// Returns `Ok(true)` when the store answered with 2.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Create the products table if it does not exist yet. Idempotent.
    async fn initialize_schema(&self) -> RepositoryResult<()>;

    /// All products ordered by ascending id.
    async fn list_products(&self) -> RepositoryResult<Vec<Product>>;

    /// Look up a single product.
    async fn get_product(&self, id: ProductId) -> RepositoryResult<Option<Product>>;

    /// Insert a product and read it back by its newly assigned id.
    async fn create_product(&self, draft: &ProductDraft) -> RepositoryResult<Product>;

    /// Replace name, price and stock of an existing product.
    ///
    /// Returns `Ok(None)` when no row matched `id`.
    async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> RepositoryResult<Option<Product>>;

    /// Delete a product. Returns `Ok(false)` when no row matched `id`.
    async fn delete_product(&self, id: ProductId) -> RepositoryResult<bool>;

    /// Current pool occupancy.
    fn pool_stats(&self) -> PoolStats;

    /// Tear down the connection pool. Later calls fail with a connection error
    /// where the backend supports closing its pool.
    async fn shutdown(&self);
}
