//! csync-db
//!
//! Postgres connection lifecycle and the product document store.
//!
//! - [`ProductStore`] is the only interface the sync driver sees.
//! - [`PgProductStore`] keeps each product as one JSONB document in the
//!   `products` table (see `migrations/`).
//! - [`MemoryProductStore`] is the in-process implementation used by tests.

mod memory;
mod products;

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use csync_schemas::{FieldMap, NewProduct, StoredProduct};

pub use memory::{MemoryProductStore, StoreOp};
pub use products::PgProductStore;

pub const ENV_DB_URL: &str = "CSYNC_DATABASE_URL";

/// Pool size used by `connect_from_env`.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Wait for the first connection before failing.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect to Postgres at `url`.
///
/// The URL is never included in errors or logs.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    connect_with_timeout(url, max_connections, DEFAULT_CONNECT_TIMEOUT).await
}

/// [`connect`] with an explicit bound on how long a refused or unreachable
/// server is retried.
pub async fn connect_with_timeout(
    url: &str,
    max_connections: u32,
    timeout: Duration,
) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(timeout)
        .connect(url)
        .await
        .context("failed to connect to Postgres")?;
    tracing::debug!(max_connections, ?timeout, "postgres pool ready");
    Ok(pool)
}

/// Connect to Postgres using CSYNC_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url =
        std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;
    connect(&url, DEFAULT_MAX_CONNECTIONS).await
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema='public' and table_name='products'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    let product_count = if exists {
        let (n,): (i64,) = sqlx::query_as::<_, (i64,)>("select count(*)::bigint from products")
            .fetch_one(pool)
            .await
            .context("status product count query failed")?;
        Some(n)
    } else {
        None
    };

    Ok(DbStatus {
        ok: one == 1,
        has_products_table: exists,
        product_count,
    })
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_products_table: bool,
    /// `None` until migrations have created the table.
    pub product_count: Option<i64>,
}

// ---------------------------------------------------------------------------
// Store interface
// ---------------------------------------------------------------------------

/// Document store addressed by stock code.
///
/// Timestamps are owned by the store: `insert` sets `created_at` and
/// `updated_at`, `update_fields` refreshes `updated_at`.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// One bulk lookup for every code in `stock_codes`. Codes with no stored
    /// product are absent from the result.
    async fn fetch_existing(&self, stock_codes: &[String])
        -> Result<BTreeMap<String, StoredProduct>>;

    /// Insert a new product. Fails if a required field is missing or the
    /// stock code already exists.
    async fn insert(&self, product: &NewProduct) -> Result<()>;

    /// Merge `fields` into the stored product. Keys not in `fields` are left
    /// untouched. Fails if no product has `stock_code`.
    async fn update_fields(&self, stock_code: &str, fields: &FieldMap) -> Result<()>;
}

/// Shared insert-time check for every store implementation.
pub(crate) fn ensure_required(product: &NewProduct) -> Result<()> {
    let missing = product.missing_required();
    if !missing.is_empty() {
        bail!(
            "product {} is missing required field(s): {}",
            product.stock_code(),
            missing.join(", ")
        );
    }
    Ok(())
}
