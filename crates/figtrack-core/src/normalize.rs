//! Text normalization for free-text product attributes.
//!
//! Source sites mix full-width and half-width forms freely (ＫＡＤＯＫＡＷＡ
//! vs KADOKAWA), pad values with ideographic spaces, and use typographic
//! quotation marks. Everything that feeds an identity comparison goes
//! through [`normalize`] first so the same product observed twice compares
//! equal.

use unicode_normalization::UnicodeNormalization;

/// Normalizes a single free-text attribute value.
///
/// Three rules, applied in order:
/// 1. Unicode NFKC composition — full-width Latin letters, digits, and
///    punctuation collapse to their half-width forms.
/// 2. Any run of whitespace (including U+3000 ideographic space, which
///    NFKC maps to a plain space) collapses to a single ASCII space.
/// 3. U+2019 right single quotation mark becomes an ASCII apostrophe.
///
/// The function is idempotent: `normalize(normalize(s)) == normalize(s)`.
#[must_use]
pub fn normalize(value: &str) -> String {
    let composed: String = value.nfkc().collect();

    let mut out = String::with_capacity(composed.len());
    let mut in_whitespace = false;
    for ch in composed.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            out.push(if ch == '\u{2019}' { '\'' } else { ch });
        }
    }
    out
}

/// Normalizes every string in a list, preserving order.
#[must_use]
pub fn normalize_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| normalize(v)).collect()
}
