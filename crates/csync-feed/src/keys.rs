//! Label -> field-name normalization.
//!
//! Catalog labels are CamelCase in a mix of ASCII and Turkish letters
//! (`ProductType`, `ÜrünBilgisi`). Field names are snake_case.

/// Turkish uppercase letters outside ASCII that start a word.
pub const TURKISH_UPPERCASE: [char; 6] = ['Ç', 'Ğ', 'İ', 'Ö', 'Ş', 'Ü'];

/// `true` for ASCII `A-Z` and the six Turkish uppercase letters.
pub fn is_word_start(c: char) -> bool {
    c.is_ascii_uppercase() || TURKISH_UPPERCASE.contains(&c)
}

/// Convert a CamelCase label to snake_case.
///
/// An `_` goes before every word-start letter except the first character,
/// then the whole string is lowercased. Nothing else is touched: spaces,
/// colons and digits survive as-is.
///
/// ```
/// use csync_feed::keys::normalize_key;
/// assert_eq!(normalize_key("ProductType"), "product_type");
/// assert_eq!(normalize_key("ÇiftKat"), "çift_kat");
/// ```
pub fn normalize_key(label: &str) -> String {
    let mut out = String::with_capacity(label.len() + 4);
    for (i, c) in label.chars().enumerate() {
        if i > 0 && is_word_start(c) {
            out.push('_');
        }
        out.push(c);
    }
    out.to_lowercase()
}
