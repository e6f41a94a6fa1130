//! csync-feed
//!
//! Catalog feed reading and product normalization.
//!
//! This crate turns an XML catalog into [`csync_schemas::ProductDocument`]
//! values. It does **not** talk to the store and does not log; callers (the
//! sync driver, the CLI) decide what to do with build failures.
//!
//! Pipeline per product element:
//! `xml::XmlNode` -> `builder::DocumentBuilder::build_raw` (keys, colours,
//! images, description pairs) -> `coerce::preprocess` -> `ProductDocument`.

pub mod builder;
pub mod coerce;
pub mod description;
pub mod keys;
pub mod xml;

use std::fmt;
use std::path::Path;

pub use builder::{stock_code_of, BuildError, DocumentBuilder};
pub use coerce::{preprocess, CoercionError, RawProduct};
pub use description::DescriptionExtractor;
pub use keys::normalize_key;
pub use xml::XmlNode;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Fatal feed errors: the catalog as a whole cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The feed file could not be read.
    Io { path: String, message: String },
    /// The feed is not well-formed XML.
    Xml { position: u64, message: String },
    /// The feed contains no root element.
    EmptyDocument,
    /// A built-in CSS selector failed to compile.
    Selector { selector: String, message: String },
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Io { path, message } => write!(f, "feed io error '{path}': {message}"),
            FeedError::Xml { position, message } => {
                write!(f, "feed xml error at byte {position}: {message}")
            }
            FeedError::EmptyDocument => write!(f, "feed xml has no root element"),
            FeedError::Selector { selector, message } => {
                write!(f, "selector '{selector}' failed to compile: {message}")
            }
        }
    }
}

impl std::error::Error for FeedError {}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A parsed catalog: the root element whose direct children are products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    root: XmlNode,
}

impl Catalog {
    pub fn from_root(root: XmlNode) -> Self {
        Self { root }
    }

    pub fn parse_str(src: &str) -> Result<Self, FeedError> {
        xml::parse_document(src).map(Self::from_root)
    }

    pub fn from_file(path: &Path) -> Result<Self, FeedError> {
        let src = std::fs::read_to_string(path).map_err(|e| FeedError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse_str(&src)
    }

    pub fn root_tag(&self) -> &str {
        &self.root.tag
    }

    /// Product elements in catalog order.
    pub fn products(&self) -> &[XmlNode] {
        &self.root.children
    }

    pub fn len(&self) -> usize {
        self.root.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Distinct stock codes present in the catalog, first-seen order.
    /// Elements without an id contribute nothing.
    pub fn stock_codes(&self) -> Vec<String> {
        let mut seen = std::collections::BTreeSet::new();
        self.products()
            .iter()
            .filter_map(stock_code_of)
            .filter(|code| seen.insert(code.to_string()))
            .map(str::to_string)
            .collect()
    }
}
