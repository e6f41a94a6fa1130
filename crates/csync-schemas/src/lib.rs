//! csync-schemas
//!
//! Product shapes shared by the feed builder, the diff engine, the store and
//! the sync driver. Plain data only: no IO, no parsing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Field name -> JSON value. Ordered so diffs and store payloads are deterministic.
pub type FieldMap = BTreeMap<String, Value>;

/// Currency code applied to newly inserted products.
pub const DEFAULT_PRICE_UNIT: &str = "USD";

/// Lifecycle status applied to newly inserted products.
pub const DEFAULT_STATUS: &str = "Active";

/// Fields a stored product must carry. Enforced on insert only; partial
/// updates write whatever the feed produced.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "stock_code",
    "color",
    "name",
    "price",
    "product_type",
    "quantity",
];

/// Keys of [`ProductDocument::to_fields`], in map order.
///
/// `price_unit` and `status` are deliberately absent: they are insert-time
/// defaults and never take part in diffing or partial updates.
pub const DOCUMENT_FIELDS: [&str; 14] = [
    "color",
    "discounted_price",
    "fabric",
    "images",
    "is_discounted",
    "model_measurements",
    "name",
    "price",
    "product_measurements",
    "product_type",
    "quantity",
    "sample_size",
    "series",
    "stock_code",
];

// ---------------------------------------------------------------------------
// Candidate document
// ---------------------------------------------------------------------------

/// Canonical product document built from one catalog element.
///
/// Required-by-storage fields (`name`, `price`, `product_type`) are `Option`
/// here: the builder passes missing values through and leaves rejection to
/// the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDocument {
    pub stock_code: String,
    /// Every colour variant listed for the product, in feed order.
    pub color: Vec<String>,
    pub discounted_price: Option<f64>,
    /// Image paths in feed order.
    pub images: Vec<String>,
    pub is_discounted: bool,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub product_type: Option<String>,
    pub quantity: i64,
    pub sample_size: Option<String>,
    pub series: Option<String>,
    pub fabric: Option<String>,
    pub model_measurements: Option<String>,
    pub product_measurements: Option<String>,
}

impl ProductDocument {
    /// Empty document for `stock_code`: no colours, no images, quantity 0.
    pub fn new(stock_code: impl Into<String>) -> Self {
        Self {
            stock_code: stock_code.into(),
            color: Vec::new(),
            discounted_price: None,
            images: Vec::new(),
            is_discounted: false,
            name: None,
            price: None,
            product_type: None,
            quantity: 0,
            sample_size: None,
            series: None,
            fabric: None,
            model_measurements: None,
            product_measurements: None,
        }
    }

    /// Field mapping used for diffing and partial updates.
    ///
    /// Every key in [`DOCUMENT_FIELDS`] is present; absent optionals map to
    /// `null` so they compare equal to a stored field that was never set.
    pub fn to_fields(&self) -> FieldMap {
        let mut m = FieldMap::new();
        m.insert("stock_code".to_string(), json!(self.stock_code));
        m.insert("color".to_string(), json!(self.color));
        m.insert("discounted_price".to_string(), json!(self.discounted_price));
        m.insert("images".to_string(), json!(self.images));
        m.insert("is_discounted".to_string(), json!(self.is_discounted));
        m.insert("name".to_string(), json!(self.name));
        m.insert("price".to_string(), json!(self.price));
        m.insert("product_type".to_string(), json!(self.product_type));
        m.insert("quantity".to_string(), json!(self.quantity));
        m.insert("sample_size".to_string(), json!(self.sample_size));
        m.insert("series".to_string(), json!(self.series));
        m.insert("fabric".to_string(), json!(self.fabric));
        m.insert(
            "model_measurements".to_string(),
            json!(self.model_measurements),
        );
        m.insert(
            "product_measurements".to_string(),
            json!(self.product_measurements),
        );
        m
    }
}

// ---------------------------------------------------------------------------
// Insert intent
// ---------------------------------------------------------------------------

/// A product about to be inserted: the candidate plus insert-time defaults.
///
/// Timestamps are not carried; the store assigns `created_at`/`updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub document: ProductDocument,
    pub price_unit: String,
    pub status: String,
}

impl NewProduct {
    pub fn from_document(document: ProductDocument) -> Self {
        Self {
            document,
            price_unit: DEFAULT_PRICE_UNIT.to_string(),
            status: DEFAULT_STATUS.to_string(),
        }
    }

    pub fn stock_code(&self) -> &str {
        &self.document.stock_code
    }

    /// Required fields that are `null` (or an empty list) in this product, in
    /// [`REQUIRED_FIELDS`] order. Stores refuse to insert a product with any
    /// missing.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let fields = self.document.to_fields();
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|f| fields.get(*f).map_or(true, is_absent))
            .collect()
    }

    /// Full stored field set: document fields plus `price_unit` and `status`.
    pub fn to_fields(&self) -> FieldMap {
        let mut m = self.document.to_fields();
        m.insert("price_unit".to_string(), json!(self.price_unit));
        m.insert("status".to_string(), json!(self.status));
        m
    }
}

fn is_absent(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Persisted product
// ---------------------------------------------------------------------------

/// A product as read back from the store.
///
/// Kept as a generic field mapping so the diff engine can look up any
/// candidate key without per-field accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProduct {
    pub stock_code: String,
    pub fields: FieldMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

static NULL: Value = Value::Null;

impl StoredProduct {
    /// Stored value for `key`, or `null` when the product never had it.
    pub fn field(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&NULL)
    }
}
