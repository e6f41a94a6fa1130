//! csync-reconcile
//!
//! Field-level comparison of a freshly built product document against the
//! stored product with the same stock code, and the per-record decision that
//! follows from it:
//! - not stored => insert
//! - stored and any candidate field differs => partial update of the candidate fields
//! - stored and every candidate field equal => skip
//!
//! Deterministic, pure logic. No IO. No store calls.

mod engine;
mod types;

pub use engine::{diff_product, has_differences, plan_action};
pub use types::*;
