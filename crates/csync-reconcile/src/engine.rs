use csync_schemas::{FieldMap, ProductDocument, StoredProduct};

use crate::{FieldChange, ProductDiff, ReconcileAction};

fn compare_fields(stored: &StoredProduct, candidate: &FieldMap, changes: &mut Vec<FieldChange>) {
    // Candidate keys only; stored-only fields (price_unit, status, anything
    // written by other tools) never count.
    for (field, value) in candidate {
        let current = stored.field(field);
        if current != value {
            changes.push(FieldChange {
                field: field.clone(),
                stored: current.clone(),
                candidate: value.clone(),
            });
        }
    }
}

/// Field-level diff of `document` against `stored`.
///
/// Deterministic: `FieldMap` iterates in key order, so `changes` is sorted
/// by field name.
pub fn diff_product(stored: &StoredProduct, document: &ProductDocument) -> ProductDiff {
    let mut diff = ProductDiff::clean(document.stock_code.as_str());
    compare_fields(stored, &document.to_fields(), &mut diff.changes);
    diff
}

/// `true` when any candidate field differs from the stored product.
pub fn has_differences(stored: &StoredProduct, document: &ProductDocument) -> bool {
    !diff_product(stored, document).is_clean()
}

/// Per-record decision given the prefetched stored product (if any).
pub fn plan_action(existing: Option<&StoredProduct>, document: &ProductDocument) -> ReconcileAction {
    match existing {
        None => ReconcileAction::Insert,
        Some(stored) => {
            let diff = diff_product(stored, document);
            if diff.is_clean() {
                ReconcileAction::Skip
            } else {
                ReconcileAction::Update(diff)
            }
        }
    }
}
