//! One catalog `<Product>` element -> [`ProductDocument`].
//!
//! Element contract:
//!
//! ```xml
//! <Product ProductId="...">
//!   <Images><Image Path="..."/>...</Images>
//!   <ProductDetails><ProductDetail Name="..." Value="..."/>...</ProductDetails>
//!   <Description><![CDATA[<ul><li><strong>Label:</strong> value</li></ul>]]></Description>
//! </Product>
//! ```
//!
//! Children are processed in source order, so on key collisions between
//! details and description the later child wins.

use std::fmt;

use csync_schemas::ProductDocument;

use crate::coerce::{preprocess, CoercionError, RawProduct};
use crate::description::DescriptionExtractor;
use crate::keys::normalize_key;
use crate::xml::XmlNode;
use crate::FeedError;

pub const ATTR_PRODUCT_ID: &str = "ProductId";
pub const TAG_IMAGES: &str = "Images";
pub const TAG_PRODUCT_DETAILS: &str = "ProductDetails";
pub const TAG_DESCRIPTION: &str = "Description";
pub const ATTR_PATH: &str = "Path";
pub const ATTR_NAME: &str = "Name";
pub const ATTR_VALUE: &str = "Value";

/// Detail key collected into the colour list instead of a scalar field.
pub const COLOR_KEY: &str = "color";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Why a single product element produced no document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The element has no (or a blank) `ProductId` attribute.
    MissingProductId { tag: String },
    /// A field value could not be coerced.
    Coercion {
        stock_code: String,
        source: CoercionError,
    },
}

impl BuildError {
    pub fn stock_code(&self) -> Option<&str> {
        match self {
            BuildError::MissingProductId { .. } => None,
            BuildError::Coercion { stock_code, .. } => Some(stock_code),
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::MissingProductId { tag } => {
                write!(f, "<{tag}> element has no {ATTR_PRODUCT_ID} attribute")
            }
            BuildError::Coercion { stock_code, source } => {
                write!(f, "product {stock_code}: {source}")
            }
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::MissingProductId { .. } => None,
            BuildError::Coercion { source, .. } => Some(source),
        }
    }
}

/// Stock code of a product element, if it carries a non-blank one.
pub fn stock_code_of(product: &XmlNode) -> Option<&str> {
    product
        .attr(ATTR_PRODUCT_ID)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builds product documents; holds the compiled description selectors.
#[derive(Debug)]
pub struct DocumentBuilder {
    description: DescriptionExtractor,
}

impl DocumentBuilder {
    pub fn new() -> Result<Self, FeedError> {
        Ok(Self {
            description: DescriptionExtractor::new()?,
        })
    }

    /// Structural extraction only: identifiers, lists and raw string fields.
    pub fn build_raw(&self, product: &XmlNode) -> Result<RawProduct, BuildError> {
        let stock_code = stock_code_of(product).ok_or_else(|| BuildError::MissingProductId {
            tag: product.tag.clone(),
        })?;
        let mut raw = RawProduct::new(stock_code);

        for child in &product.children {
            match child.tag.as_str() {
                TAG_IMAGES => {
                    raw.images = child
                        .children
                        .iter()
                        .filter_map(|image| image.attr(ATTR_PATH))
                        .map(str::to_string)
                        .collect();
                }
                TAG_PRODUCT_DETAILS => {
                    // Each details block carries the full colour list.
                    raw.color.clear();
                    for detail in &child.children {
                        let Some(name) = detail.attr(ATTR_NAME) else {
                            continue;
                        };
                        let key = normalize_key(name);
                        let value = detail.attr(ATTR_VALUE).unwrap_or_default().to_string();
                        if key == COLOR_KEY {
                            raw.color.push(value);
                        } else {
                            raw.fields.insert(key, value);
                        }
                    }
                }
                TAG_DESCRIPTION => {
                    self.description.extract_into(&child.text, &mut raw.fields);
                }
                _ => {}
            }
        }

        Ok(raw)
    }

    /// Full build: structural extraction followed by type coercion.
    ///
    /// Missing storage-required fields (name, price, product type) are passed
    /// through as `None`; only a missing id or uncoercible text fails.
    pub fn build(&self, product: &XmlNode) -> Result<ProductDocument, BuildError> {
        let raw = self.build_raw(product)?;
        let stock_code = raw.stock_code.clone();
        preprocess(raw).map_err(|source| BuildError::Coercion { stock_code, source })
    }
}
