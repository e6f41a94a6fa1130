use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use csync_schemas::{FieldMap, NewProduct, StoredProduct};

use crate::{ensure_required, ProductStore};

/// [`ProductStore`] over the `products` table.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn fetch_existing(
        &self,
        stock_codes: &[String],
    ) -> Result<BTreeMap<String, StoredProduct>> {
        if stock_codes.is_empty() {
            return Ok(BTreeMap::new());
        }

        let rows = sqlx::query(
            r#"
            select stock_code, doc, created_at, updated_at
            from products
            where stock_code = any($1)
            "#,
        )
        .bind(stock_codes)
        .fetch_all(&self.pool)
        .await
        .context("fetch_existing products failed")?;

        let mut out = BTreeMap::new();
        for r in rows {
            let stock_code = r
                .try_get::<String, _>("stock_code")
                .context("products.stock_code")?;
            let Json(fields) = r
                .try_get::<Json<FieldMap>, _>("doc")
                .context("products.doc")?;
            let created_at = r
                .try_get::<DateTime<Utc>, _>("created_at")
                .context("products.created_at")?;
            let updated_at = r
                .try_get::<DateTime<Utc>, _>("updated_at")
                .context("products.updated_at")?;
            out.insert(
                stock_code.clone(),
                StoredProduct {
                    stock_code,
                    fields,
                    created_at,
                    updated_at,
                },
            );
        }

        tracing::debug!(
            requested = stock_codes.len(),
            found = out.len(),
            "fetched existing products"
        );
        Ok(out)
    }

    async fn insert(&self, product: &NewProduct) -> Result<()> {
        ensure_required(product)?;

        sqlx::query(
            r#"
            insert into products (stock_code, doc, created_at, updated_at)
            values ($1, $2, now(), now())
            "#,
        )
        .bind(product.stock_code())
        .bind(Json(product.to_fields()))
        .execute(&self.pool)
        .await
        .with_context(|| format!("insert product {} failed", product.stock_code()))?;

        Ok(())
    }

    async fn update_fields(&self, stock_code: &str, fields: &FieldMap) -> Result<()> {
        let res = sqlx::query(
            r#"
            update products
               set doc = doc || $2::jsonb,
                   updated_at = now()
             where stock_code = $1
            "#,
        )
        .bind(stock_code)
        .bind(Json(fields))
        .execute(&self.pool)
        .await
        .with_context(|| format!("update product {stock_code} failed"))?;

        if res.rows_affected() == 0 {
            bail!("update product {stock_code} failed: no stored product with that stock code");
        }
        Ok(())
    }
}
