use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use csync_schemas::{FieldMap, NewProduct, StoredProduct};

use crate::{ensure_required, ProductStore};

/// One write observed by [`MemoryProductStore`], in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    Insert { stock_code: String, fields: FieldMap },
    Update { stock_code: String, fields: FieldMap },
}

impl StoreOp {
    pub fn stock_code(&self) -> &str {
        match self {
            StoreOp::Insert { stock_code, .. } | StoreOp::Update { stock_code, .. } => stock_code,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    products: BTreeMap<String, StoredProduct>,
    ops: Vec<StoreOp>,
    fetches: usize,
    fail_fetch: bool,
    fail_writes_for: Vec<String>,
}

/// In-process [`ProductStore`] that records every write.
///
/// Same semantics as the Postgres store: required fields checked on insert,
/// duplicate inserts rejected, updates merge into the stored field map.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    inner: Mutex<Inner>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `products` as if inserted at `at`. Not
    /// recorded as ops.
    pub fn with_products(products: impl IntoIterator<Item = NewProduct>, at: DateTime<Utc>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            for p in products {
                let stock_code = p.stock_code().to_string();
                inner.products.insert(
                    stock_code.clone(),
                    StoredProduct {
                        stock_code,
                        fields: p.to_fields(),
                        created_at: at,
                        updated_at: at,
                    },
                );
            }
        }
        store
    }

    /// Make the next bulk fetches fail.
    pub fn fail_fetch(&self) -> Result<()> {
        self.lock()?.fail_fetch = true;
        Ok(())
    }

    /// Make inserts and updates for `stock_code` fail.
    pub fn fail_writes_for(&self, stock_code: &str) -> Result<()> {
        self.lock()?.fail_writes_for.push(stock_code.to_string());
        Ok(())
    }

    pub fn ops(&self) -> Result<Vec<StoreOp>> {
        Ok(self.lock()?.ops.clone())
    }

    pub fn fetch_count(&self) -> Result<usize> {
        Ok(self.lock()?.fetches)
    }

    pub fn get(&self, stock_code: &str) -> Result<Option<StoredProduct>> {
        Ok(self.lock()?.products.get(stock_code).cloned())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.products.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("memory product store lock poisoned"))
    }
}

fn ensure_writable(inner: &Inner, stock_code: &str) -> Result<()> {
    if inner.fail_writes_for.iter().any(|c| c == stock_code) {
        bail!("injected write failure for product {stock_code}");
    }
    Ok(())
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn fetch_existing(
        &self,
        stock_codes: &[String],
    ) -> Result<BTreeMap<String, StoredProduct>> {
        let mut inner = self.lock()?;
        inner.fetches += 1;
        if inner.fail_fetch {
            bail!("fetch_existing products failed: injected failure");
        }
        Ok(stock_codes
            .iter()
            .filter_map(|code| inner.products.get(code).map(|p| (code.clone(), p.clone())))
            .collect())
    }

    async fn insert(&self, product: &NewProduct) -> Result<()> {
        ensure_required(product)?;
        let mut inner = self.lock()?;
        let stock_code = product.stock_code().to_string();
        ensure_writable(&inner, &stock_code)?;
        if inner.products.contains_key(&stock_code) {
            bail!("insert product {stock_code} failed: stock code already exists");
        }

        let now = Utc::now();
        let fields = product.to_fields();
        inner.products.insert(
            stock_code.clone(),
            StoredProduct {
                stock_code: stock_code.clone(),
                fields: fields.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        inner.ops.push(StoreOp::Insert { stock_code, fields });
        Ok(())
    }

    async fn update_fields(&self, stock_code: &str, fields: &FieldMap) -> Result<()> {
        let mut inner = self.lock()?;
        ensure_writable(&inner, stock_code)?;
        let Some(stored) = inner.products.get_mut(stock_code) else {
            bail!("update product {stock_code} failed: no stored product with that stock code");
        };
        stored
            .fields
            .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        stored.updated_at = Utc::now();

        inner.ops.push(StoreOp::Update {
            stock_code: stock_code.to_string(),
            fields: fields.clone(),
        });
        Ok(())
    }
}
