//! MySQL repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2, sized by `DB_POOL_MAX`
//! - Blocking Diesel calls moved onto the Tokio blocking pool
//! - Idempotent `CREATE TABLE IF NOT EXISTS` schema setup
//!
//! The pool is built unchecked: no connection is opened until the first
//! `acquire`, so an unreachable server surfaces in the startup probe rather
//! than in pool construction.

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::mysql::MysqlConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Unsigned};
use std::time::Duration;
use tokio::task;

use crate::db::config::DbConfig;
use crate::db::pool::PoolStats;
use crate::db::repository::{ErrorContext, ProductRepository, RepositoryError, RepositoryResult};
use crate::models::{Product, ProductDraft, ProductId};

mod models;
mod schema;

use models::{ProductRow, ProductValues};
use schema::products;

type MysqlPool = Pool<ConnectionManager<MysqlConnection>>;

const CREATE_PRODUCTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS PRODUCTS (
    PRODUCTID INT PRIMARY KEY AUTO_INCREMENT,
    PRODUCTNAME VARCHAR(100) NOT NULL,
    PRICE DECIMAL(10, 2) NOT NULL,
    STOCK INT NOT NULL
)";

/// Diesel-backed repository for MySQL.
#[derive(Clone)]
pub struct MySqlRepository {
    pool: MysqlPool,
    config: DbConfig,
}

impl std::fmt::Debug for MySqlRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlRepository")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("database", &self.config.database)
            .field("max_pool_size", &self.config.max_pool_size)
            .finish()
    }
}

impl MySqlRepository {
    /// Create a repository with a lazily connecting pool.
    pub fn new(config: DbConfig) -> RepositoryResult<Self> {
        let database_url = config.database_url()?;
        let manager = ConnectionManager::<MysqlConnection>::new(database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size.max(1))
            .min_idle(Some(0))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .test_on_check_out(true)
            .build_unchecked(manager);

        Ok(Self { pool, config })
    }

    /// Run `f` on one pooled connection inside the blocking thread pool.
    ///
    /// The connection is returned to the pool when the closure finishes,
    /// whether it succeeded or not.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut MysqlConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| RepositoryError::from(e).with_operation(operation))?;
            f(&mut conn).map_err(|e| e.with_operation(operation))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new(operation).with_details("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

/// Ids outside the `INT` column range cannot match any row.
fn column_id(id: ProductId) -> Option<i32> {
    i32::try_from(id.value()).ok()
}

fn to_values(draft: &ProductDraft) -> RepositoryResult<ProductValues> {
    let stock = i32::try_from(draft.stock).map_err(|_| {
        RepositoryError::query_with_context(
            "Out of range value for column 'STOCK'",
            ErrorContext::default().with_entity("product"),
        )
    })?;
    Ok(ProductValues {
        name: draft.name.clone(),
        price: draft.price,
        stock,
    })
}

fn find_product(conn: &mut MysqlConnection, id: i32) -> RepositoryResult<Option<Product>> {
    products::table
        .find(id)
        .select(ProductRow::as_select())
        .first::<ProductRow>(conn)
        .optional()
        .map(|row| row.map(Product::from))
        .map_err(map_diesel_error)
}

#[async_trait]
impl ProductRepository for MySqlRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            diesel::select(sql::<BigInt>("1 + 1"))
                .get_result::<i64>(conn)
                .map(|answer| answer == 2)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn initialize_schema(&self) -> RepositoryResult<()> {
        self.with_conn("initialize_schema", |conn| {
            sql_query(CREATE_PRODUCTS_TABLE)
                .execute(conn)
                .map(|_| ())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        self.with_conn("list_products", |conn| {
            let rows = products::table
                .select(ProductRow::as_select())
                .order(products::id.asc())
                .load::<ProductRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Product::from).collect())
        })
        .await
    }

    async fn get_product(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        self.with_conn("get_product", move |conn| match column_id(id) {
            Some(id) => find_product(conn, id),
            None => Ok(None),
        })
        .await
    }

    async fn create_product(&self, draft: &ProductDraft) -> RepositoryResult<Product> {
        let draft = draft.clone();
        self.with_conn("create_product", move |conn| {
            let values = to_values(&draft)?;
            diesel::insert_into(products::table)
                .values(&values)
                .execute(conn)
                .map_err(map_diesel_error)?;

            // LAST_INSERT_ID is per-connection, so the read-back must use the same one.
            let new_id = diesel::select(sql::<Unsigned<BigInt>>("LAST_INSERT_ID()"))
                .get_result::<u64>(conn)
                .map_err(map_diesel_error)?;
            let new_id = i32::try_from(new_id).map_err(|_| {
                RepositoryError::internal_with_context(
                    "auto-increment id out of range",
                    ErrorContext::default().with_entity_id(new_id),
                )
            })?;

            find_product(conn, new_id)?.ok_or_else(|| {
                RepositoryError::internal_with_context(
                    "inserted row not found on read-back",
                    ErrorContext::default()
                        .with_entity("product")
                        .with_entity_id(new_id),
                )
            })
        })
        .await
    }

    async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> RepositoryResult<Option<Product>> {
        let draft = draft.clone();
        self.with_conn("update_product", move |conn| {
            let values = to_values(&draft)?;
            let Some(id) = column_id(id) else {
                return Ok(None);
            };

            // Diesel connects with CLIENT_FOUND_ROWS, so this counts matched
            // rows even when the new values equal the old ones.
            let affected = diesel::update(products::table.find(id))
                .set(&values)
                .execute(conn)
                .map_err(map_diesel_error)?;
            if affected == 0 {
                return Ok(None);
            }

            find_product(conn, id)
        })
        .await
    }

    async fn delete_product(&self, id: ProductId) -> RepositoryResult<bool> {
        self.with_conn("delete_product", move |conn| {
            let Some(id) = column_id(id) else {
                return Ok(false);
            };
            diesel::delete(products::table.find(id))
                .execute(conn)
                .map(|affected| affected > 0)
                .map_err(map_diesel_error)
        })
        .await
    }

    fn pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            max_size: self.pool.max_size(),
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
        }
    }

    async fn shutdown(&self) {
        // r2d2 closes its connections when the last pool handle is dropped.
        let stats = self.pool_stats();
        tracing::info!(
            open_connections = stats.connections_in_use + stats.idle_connections,
            "MySQL connection pool released"
        );
    }
}
