//! csync-runtime
//!
//! The sync driver: one pass over a parsed catalog against a product store.
//!
//! fetch existing (one bulk lookup) -> per element: build -> dedupe ->
//! plan (insert / update / skip) -> write. Records are handled sequentially
//! in catalog order; a record failure is logged and reported, never fatal.

mod driver;
mod report;

pub use driver::{sync_catalog, SyncDriver, SyncOptions};
pub use report::{RecordOutcome, RecordReport, SyncReport, SyncTotals};
