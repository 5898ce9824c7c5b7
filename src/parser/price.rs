//! Price recognition and stripping
//!
//! An ordered table of regex matchers, most-marked currency forms first.
//! A bare trailing number is the lowest-confidence fallback, so a
//! currency-marked amount always wins when both could match.

use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on accepted prices. Amounts at or above this are OCR misreads.
pub const MAX_PRICE: f64 = 100_000.0;

static PRICE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    // Digits with optional thousands separators and up to two decimals
    const AMOUNT: &str = r"\d{1,4}(?:,?\d{1,3})*(?:\.\d{1,2})?";

    [
        // ₱50, ₱1,500, ₱150.50
        format!(r"₱\s*({AMOUNT})"),
        // PHP 50 / php 50
        format!(r"(?i)php\s*({AMOUNT})"),
        // P 50 or P50
        format!(r"P\s*({AMOUNT})"),
        // 50 php
        format!(r"(?i)({AMOUNT})\s*php"),
        // 50₱
        format!(r"({AMOUNT})\s*₱"),
        // 50 pesos
        r"(?i)(\d{2,4})\s*pesos?".to_string(),
        // $50
        format!(r"\$\s*({AMOUNT})"),
        // Bare 2-4 digit number as the last token on the line
        r"\b(\d{2,4})\s*$".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid price pattern"))
    .collect()
});

/// Runs of two or more dots connecting a name to its price in table layouts.
static DOTTED_LEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").expect("invalid pattern"));

/// Extract a monetary amount from a line of text.
///
/// Patterns are tried strictly in declaration order and the first captured
/// amount inside `(0, MAX_PRICE)` wins. Returns `None` when nothing matches
/// or every match fails the bounds check.
pub fn extract_price(text: &str) -> Option<f64> {
    for pattern in PRICE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let raw = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let cleaned = raw.replace(',', "");
            if let Ok(value) = cleaned.parse::<f64>() {
                if value > 0.0 && value < MAX_PRICE {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Remove every price substring and any dotted leaders from a line,
/// returning the trimmed remainder. Used to recover the item name from a
/// line that also carries its price.
pub fn strip_prices(text: &str) -> String {
    let mut cleaned = text.to_string();
    for pattern in PRICE_PATTERNS.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    let cleaned = DOTTED_LEADER.replace_all(&cleaned, "");
    cleaned.trim().to_string()
}
