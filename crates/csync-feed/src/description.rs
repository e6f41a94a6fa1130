//! Label/value extraction from embedded description HTML.
//!
//! Descriptions are HTML lists where each item starts with a bold label:
//!
//! ```html
//! <ul>
//!   <li><strong>Ürün Bilgisi:</strong> Uzun kollu elbise</li>
//!   <li><strong>Kumaş Bilgisi:</strong> %100 Pamuk</li>
//!   <li><strong>Model Ölçüleri:</strong> Boy 1.76</li>
//! </ul>
//! ```
//!
//! Items after the model-measurements item are not read.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};

use crate::keys::normalize_key;
use crate::FeedError;

/// Normalized label of the item that ends extraction.
pub const MODEL_MEASUREMENTS_KEY: &str = "model_ölçüleri";

/// Compiled selectors for description markup.
#[derive(Debug)]
pub struct DescriptionExtractor {
    item: Selector,
    label: Selector,
}

impl DescriptionExtractor {
    pub fn new() -> Result<Self, FeedError> {
        Ok(Self {
            item: compile("li")?,
            label: compile("strong")?,
        })
    }

    /// Extract label/value pairs in document order.
    ///
    /// Repeated labels appear once per item; callers that merge into a map
    /// get last-write-wins.
    pub fn extract(&self, html: &str) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if html.trim().is_empty() {
            return pairs;
        }

        let fragment = Html::parse_fragment(html);
        for item in fragment.select(&self.item) {
            let Some(label_el) = item.select(&self.label).next() else {
                continue;
            };

            let label = stripped_text(label_el);
            let key = label_key(&label);
            if key.is_empty() {
                continue;
            }

            // Literal removal: every occurrence of the label text goes, not
            // just the leading one.
            let value = stripped_text(item).replace(&label, "");

            let stop = key == MODEL_MEASUREMENTS_KEY;
            pairs.push((key, value));
            if stop {
                break;
            }
        }
        pairs
    }

    /// Extract into `out`, overwriting existing keys. Returns the number of
    /// pairs written.
    pub fn extract_into(&self, html: &str, out: &mut BTreeMap<String, String>) -> usize {
        let pairs = self.extract(html);
        let n = pairs.len();
        out.extend(pairs);
        n
    }
}

/// Field name for a description label.
///
/// Colons and spaces are dropped, the result is snake_cased, then digits
/// (repeated-label suffixes such as `Ürün Bilgisi 2`) are removed so repeats
/// collapse onto one key.
pub fn label_key(label: &str) -> String {
    let compact: String = label.chars().filter(|c| *c != ':' && *c != ' ').collect();
    let snake = normalize_key(&compact);
    let without_digits: String = snake.chars().filter(|c| !c.is_numeric()).collect();
    without_digits.trim().to_string()
}

/// Element text with every text node trimmed and the pieces concatenated.
fn stripped_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn compile(css: &str) -> Result<Selector, FeedError> {
    Selector::parse(css).map_err(|e| FeedError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}
