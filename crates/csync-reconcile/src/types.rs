use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One candidate field whose value differs from what is stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    /// Stored value; `null` when the stored product never had the field.
    pub stored: Value,
    pub candidate: Value,
}

/// Evidence for one product. `changes` is ordered by field name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDiff {
    pub stock_code: String,
    pub changes: Vec<FieldChange>,
}

impl ProductDiff {
    pub fn clean(stock_code: impl Into<String>) -> Self {
        Self {
            stock_code: stock_code.into(),
            changes: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changed_fields(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.field.as_str()).collect()
    }
}

/// What the driver should do with one built document.
#[derive(Clone, Debug, PartialEq)]
pub enum ReconcileAction {
    /// No stored product under this stock code.
    Insert,
    /// Stored product differs; carries the evidence.
    Update(ProductDiff),
    /// Stored product already matches every candidate field.
    Skip,
}

impl ReconcileAction {
    pub fn label(&self) -> &'static str {
        match self {
            ReconcileAction::Insert => "insert",
            ReconcileAction::Update(_) => "update",
            ReconcileAction::Skip => "skip",
        }
    }

    pub fn writes(&self) -> bool {
        !matches!(self, ReconcileAction::Skip)
    }
}

