use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use csync_db::ProductStore;
use csync_feed::{stock_code_of, Catalog, DocumentBuilder};
use csync_reconcile::{plan_action, ReconcileAction};
use csync_schemas::{NewProduct, ProductDocument, StoredProduct};

use crate::{RecordOutcome, RecordReport, SyncReport};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Plan every record but issue no writes.
    pub dry_run: bool,
}

/// Reusable driver: holds the document builder (compiled selectors) and the
/// run options.
#[derive(Debug)]
pub struct SyncDriver {
    builder: DocumentBuilder,
    options: SyncOptions,
}

impl SyncDriver {
    pub fn new(options: SyncOptions) -> Result<Self> {
        let builder = DocumentBuilder::new().context("document builder init failed")?;
        Ok(Self { builder, options })
    }

    /// One full pass over `catalog`.
    ///
    /// # Errors
    /// Only the bulk lookup of existing products is fatal. Per-record build
    /// and write failures are logged and reported in the returned
    /// [`SyncReport`].
    pub async fn run(&self, store: &dyn ProductStore, catalog: &Catalog) -> Result<SyncReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("sync", %run_id, dry_run = self.options.dry_run);
        self.run_inner(run_id, store, catalog).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        store: &dyn ProductStore,
        catalog: &Catalog,
    ) -> Result<SyncReport> {
        let started_at = Utc::now();
        let codes = catalog.stock_codes();
        tracing::info!(
            elements = catalog.len(),
            stock_codes = codes.len(),
            "sync started"
        );

        let existing = store
            .fetch_existing(&codes)
            .await
            .context("bulk lookup of existing products failed")?;
        tracing::info!(existing = existing.len(), "existing products fetched");

        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut records = Vec::with_capacity(catalog.len());

        for (position, element) in catalog.products().iter().enumerate() {
            let document = match self.builder.build(element) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(position, error = %e, "product skipped");
                    records.push(RecordReport {
                        position,
                        stock_code: stock_code_of(element).map(str::to_string),
                        outcome: RecordOutcome::Skipped {
                            reason: e.to_string(),
                        },
                    });
                    continue;
                }
            };

            let stock_code = document.stock_code.clone();
            if !seen.insert(stock_code.clone()) {
                tracing::warn!(position, stock_code = %stock_code, "duplicate stock code ignored");
                records.push(RecordReport {
                    position,
                    stock_code: Some(stock_code),
                    outcome: RecordOutcome::Duplicate,
                });
                continue;
            }

            let outcome = self.apply(store, &existing, document).await;
            records.push(RecordReport {
                position,
                stock_code: Some(stock_code),
                outcome,
            });
        }

        let report = SyncReport {
            run_id,
            dry_run: self.options.dry_run,
            started_at,
            finished_at: Utc::now(),
            requested: codes.len(),
            existing: existing.len(),
            records,
        };

        let t = report.totals();
        tracing::info!(
            inserted = t.inserted,
            updated = t.updated,
            unchanged = t.unchanged,
            skipped = t.skipped,
            duplicate = t.duplicate,
            failed = t.failed,
            "sync finished"
        );
        Ok(report)
    }

    async fn apply(
        &self,
        store: &dyn ProductStore,
        existing: &BTreeMap<String, StoredProduct>,
        document: ProductDocument,
    ) -> RecordOutcome {
        let stock_code = document.stock_code.clone();

        match plan_action(existing.get(&stock_code), &document) {
            ReconcileAction::Skip => {
                tracing::debug!(stock_code = %stock_code, "unchanged");
                RecordOutcome::Unchanged
            }
            ReconcileAction::Insert => {
                if !self.options.dry_run {
                    if let Err(e) = store.insert(&NewProduct::from_document(document)).await {
                        let error = format!("{e:#}");
                        tracing::error!(stock_code = %stock_code, error = %error, "insert failed");
                        return RecordOutcome::Failed { error };
                    }
                }
                tracing::info!(stock_code = %stock_code, "inserted");
                RecordOutcome::Inserted
            }
            ReconcileAction::Update(diff) => {
                let fields: Vec<String> =
                    diff.changed_fields().into_iter().map(str::to_string).collect();
                if !self.options.dry_run {
                    if let Err(e) = store.update_fields(&stock_code, &document.to_fields()).await {
                        let error = format!("{e:#}");
                        tracing::error!(stock_code = %stock_code, error = %error, "update failed");
                        return RecordOutcome::Failed { error };
                    }
                }
                tracing::info!(stock_code = %stock_code, changed = ?fields, "updated");
                RecordOutcome::Updated { fields }
            }
        }
    }
}

/// Convenience: build a driver with `options` and run it once.
pub async fn sync_catalog(
    store: &dyn ProductStore,
    catalog: &Catalog,
    options: SyncOptions,
) -> Result<SyncReport> {
    SyncDriver::new(options)?.run(store, catalog).await
}
