//! Raw string fields -> typed [`ProductDocument`].
//!
//! Feed numbers use `,` as the decimal separator (`"19,99"`). Missing or
//! empty optional values become `None`; missing quantity becomes `0`.
//! Text that is present but not a number is an error for that record.

use std::collections::BTreeMap;
use std::fmt;

use csync_schemas::ProductDocument;

/// Product fields as collected from the feed, before coercion.
///
/// `fields` holds every normalized detail/description key with its last
/// written string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProduct {
    pub stock_code: String,
    pub fields: BTreeMap<String, String>,
    pub color: Vec<String>,
    pub images: Vec<String>,
}

impl RawProduct {
    pub fn new(stock_code: impl Into<String>) -> Self {
        Self {
            stock_code: stock_code.into(),
            fields: BTreeMap::new(),
            color: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

// Raw keys read by coercion. Turkish keys come from description labels.
pub const RAW_PRICE: &str = "price";
pub const RAW_DISCOUNTED_PRICE: &str = "discounted_price";
pub const RAW_QUANTITY: &str = "quantity";
pub const RAW_PRODUCT_TYPE: &str = "product_type";
pub const RAW_SERIES: &str = "series";
pub const RAW_PRODUCT_INFO: &str = "ürün_bilgisi";
pub const RAW_FABRIC_INFO: &str = "kumaş_bilgisi";
pub const RAW_MODEL_MEASUREMENTS: &str = "model_ölçüleri";
pub const RAW_PRODUCT_MEASUREMENTS: &str = "ürün_ölçüleri";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// A decimal field held text that is not a finite number.
    InvalidNumber { field: &'static str, raw: String },
    /// The quantity field held text that is not an integer.
    InvalidInteger { field: &'static str, raw: String },
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercionError::InvalidNumber { field, raw } => {
                write!(f, "field '{field}' is not a number: '{raw}'")
            }
            CoercionError::InvalidInteger { field, raw } => {
                write!(f, "field '{field}' is not an integer: '{raw}'")
            }
        }
    }
}

impl std::error::Error for CoercionError {}

// ---------------------------------------------------------------------------
// Scalar conversions
// ---------------------------------------------------------------------------

/// Parse a comma-or-dot decimal. `None`/blank -> `Ok(None)`.
pub fn parse_decimal(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Option<f64>, CoercionError> {
    let Some(s) = non_blank(raw) else {
        return Ok(None);
    };
    let value: f64 = s
        .replace(',', ".")
        .parse()
        .map_err(|_| CoercionError::InvalidNumber {
            field,
            raw: s.to_string(),
        })?;
    if !value.is_finite() {
        return Err(CoercionError::InvalidNumber {
            field,
            raw: s.to_string(),
        });
    }
    Ok(Some(value))
}

/// Parse an integer count. `None`/blank -> `Ok(0)`.
pub fn parse_quantity(raw: Option<&str>, field: &'static str) -> Result<i64, CoercionError> {
    let Some(s) = non_blank(raw) else {
        return Ok(0);
    };
    s.parse::<i64>().map_err(|_| CoercionError::InvalidInteger {
        field,
        raw: s.to_string(),
    })
}

/// A product is discounted when it carries a strictly positive discounted price.
pub fn is_discounted(discounted_price: Option<f64>) -> bool {
    matches!(discounted_price, Some(p) if p > 0.0)
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Document coercion
// ---------------------------------------------------------------------------

/// Map a [`RawProduct`] onto the canonical document shape.
///
/// `sample_size` is read from the `series` field, same as `series` itself.
pub fn preprocess(raw: RawProduct) -> Result<ProductDocument, CoercionError> {
    let discounted_price = parse_decimal(raw.get(RAW_DISCOUNTED_PRICE), "discounted_price")?;
    let price = parse_decimal(raw.get(RAW_PRICE), "price")?;
    let quantity = parse_quantity(raw.get(RAW_QUANTITY), "quantity")?;

    let text = |key: &str| raw.get(key).map(str::to_string);

    Ok(ProductDocument {
        stock_code: raw.stock_code.clone(),
        discounted_price,
        is_discounted: is_discounted(discounted_price),
        name: text(RAW_PRODUCT_INFO),
        price,
        product_type: text(RAW_PRODUCT_TYPE),
        quantity,
        sample_size: text(RAW_SERIES),
        series: text(RAW_SERIES),
        fabric: text(RAW_FABRIC_INFO),
        model_measurements: text(RAW_MODEL_MEASUREMENTS),
        product_measurements: text(RAW_PRODUCT_MEASUREMENTS),
        color: raw.color,
        images: raw.images,
    })
}
