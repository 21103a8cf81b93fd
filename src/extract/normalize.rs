//! Key normalization for scraped metric names
//!
//! Printer status pages mix non-breaking spaces, full-width punctuation
//! and ragged whitespace into their labels. Every key goes through
//! [`normalize_key`] before it is stored or compared.

/// Normalizes a scraped key string
///
/// Steps, in order:
/// 1. Non-breaking spaces become ASCII spaces, full-width colons
///    (U+FF1A) become ASCII colons.
/// 2. Internal whitespace runs collapse to a single space;
///    leading/trailing whitespace is stripped.
/// 3. Any trailing colon, and spaces around it, are stripped.
///
/// Normalization is idempotent: applying it twice yields the same key.
///
/// # Example
///
/// ```
/// use inkmeter::extract::normalize_key;
///
/// assert_eq!(normalize_key("  Total\u{a0}\u{a0}Pages\u{ff1a}"), "Total Pages");
/// assert_eq!(normalize_key("Black Ink :"), "Black Ink");
/// ```
pub fn normalize_key(s: &str) -> String {
    let s = s.replace('\u{a0}', " ").replace('\u{ff1a}', ":");
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches([' ', ':'])
        .to_string()
}
