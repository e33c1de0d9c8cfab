//! In-memory repository implementation.
//!
//! Rows live in a `BTreeMap` keyed by id behind a [`LocalPool`], so requests
//! go through the same acquire/release discipline as a networked store.
//! The table mimics the relational definition used in production:
//! it must be created before use, ids auto-increment and are never reused,
//! prices are stored as `DECIMAL(10, 2)`, names as `VARCHAR(100)` and stock
//! as a signed 32-bit `INT`. Writes outside those limits fail the way a
//! strict-mode MySQL server rejects them.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::db::pool::{LocalPool, PoolStats, DEFAULT_MAX_SIZE};
use crate::db::repository::{ErrorContext, ProductRepository, RepositoryError, RepositoryResult};
use crate::models::{Product, ProductDraft, ProductId};

const TABLE_NAME: &str = "PRODUCTS";
const NAME_MAX_CHARS: usize = 100;
const PRICE_SCALE: u32 = 2;

/// Largest value a `DECIMAL(10, 2)` column can hold.
fn price_limit() -> Decimal {
    Decimal::new(99_999_999_99, PRICE_SCALE)
}

/// Rows of the products table.
#[derive(Debug, Default)]
pub struct ProductTable {
    rows: BTreeMap<i64, Product>,
    last_id: i64,
}

/// Shared storage reached through pooled connections. `None` until the
/// table has been created.
pub type Storage = RwLock<Option<ProductTable>>;

/// In-memory product store.
#[derive(Debug)]
pub struct LocalRepository {
    pool: LocalPool<Storage>,
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalRepository {
    /// Create a repository with the default pool size.
    pub fn new() -> Self {
        Self::with_pool_size(DEFAULT_MAX_SIZE)
    }

    pub fn with_pool_size(max_size: u32) -> Self {
        Self {
            pool: LocalPool::new(RwLock::new(None), max_size),
        }
    }

    /// Direct access to the pool, e.g. to hold connections in tests.
    pub fn pool(&self) -> &LocalPool<Storage> {
        &self.pool
    }
}

fn missing_table(operation: &str) -> RepositoryError {
    RepositoryError::query_with_context(
        format!("Table '{}' doesn't exist", TABLE_NAME),
        ErrorContext::new(operation).with_entity("product"),
    )
}

/// Apply the column definitions to a draft, producing the values a row would hold.
fn to_row_values(
    draft: &ProductDraft,
    operation: &str,
) -> RepositoryResult<(String, Decimal, i32)> {
    let out_of_range = |column: &str| {
        RepositoryError::query_with_context(
            format!("Out of range value for column '{}'", column),
            ErrorContext::new(operation).with_entity("product"),
        )
    };

    if draft.name.chars().count() > NAME_MAX_CHARS {
        return Err(RepositoryError::query_with_context(
            "Data too long for column 'PRODUCTNAME'",
            ErrorContext::new(operation).with_entity("product"),
        ));
    }

    let price = draft
        .price
        .round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if price.abs() > price_limit() {
        return Err(out_of_range("PRICE"));
    }

    let stock = i32::try_from(draft.stock).map_err(|_| out_of_range("STOCK"))?;

    Ok((draft.name.clone(), price, stock))
}

#[async_trait]
impl ProductRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let conn = self.pool.acquire().await?;
        let _storage = conn.read();
        Ok(true)
    }

    async fn initialize_schema(&self) -> RepositoryResult<()> {
        let conn = self.pool.acquire().await?;
        let mut storage = conn.write();
        if storage.is_none() {
            *storage = Some(ProductTable::default());
        }
        Ok(())
    }

    async fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        let conn = self.pool.acquire().await?;
        let storage = conn.read();
        let table = storage
            .as_ref()
            .ok_or_else(|| missing_table("list_products"))?;
        Ok(table.rows.values().cloned().collect())
    }

    async fn get_product(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        let conn = self.pool.acquire().await?;
        let storage = conn.read();
        let table = storage.as_ref().ok_or_else(|| missing_table("get_product"))?;
        Ok(table.rows.get(&id.value()).cloned())
    }

    async fn create_product(&self, draft: &ProductDraft) -> RepositoryResult<Product> {
        let conn = self.pool.acquire().await?;
        let mut storage = conn.write();
        let table = storage
            .as_mut()
            .ok_or_else(|| missing_table("create_product"))?;

        let (name, price, stock) = to_row_values(draft, "create_product")?;
        let id = table.last_id + 1;
        if i32::try_from(id).is_err() {
            return Err(RepositoryError::query_with_context(
                "Failed to read auto-increment value from storage engine",
                ErrorContext::new("create_product").with_entity("product"),
            ));
        }
        table.last_id = id;
        table.rows.insert(
            id,
            Product {
                id: ProductId::new(id),
                name,
                price,
                stock,
            },
        );

        table.rows.get(&id).cloned().ok_or_else(|| {
            RepositoryError::internal_with_context(
                "inserted row not found on read-back",
                ErrorContext::new("create_product").with_entity_id(id),
            )
        })
    }

    async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> RepositoryResult<Option<Product>> {
        let conn = self.pool.acquire().await?;
        let mut storage = conn.write();
        let table = storage
            .as_mut()
            .ok_or_else(|| missing_table("update_product"))?;

        let (name, price, stock) = to_row_values(draft, "update_product")?;
        let Some(row) = table.rows.get_mut(&id.value()) else {
            return Ok(None);
        };
        row.name = name;
        row.price = price;
        row.stock = stock;

        Ok(table.rows.get(&id.value()).cloned())
    }

    async fn delete_product(&self, id: ProductId) -> RepositoryResult<bool> {
        let conn = self.pool.acquire().await?;
        let mut storage = conn.write();
        let table = storage
            .as_mut()
            .ok_or_else(|| missing_table("delete_product"))?;
        Ok(table.rows.remove(&id.value()).is_some())
    }

    fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    async fn shutdown(&self) {
        self.pool.close();
        tracing::info!("in-memory connection pool closed");
    }
}
