//! Line classification heuristics
//!
//! Decides whether an OCR line is a menu section header or a plausible
//! unpriced item name. Headers are short, price-free, and either match the
//! section vocabulary or are visually distinguished by all-caps.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::price::extract_price;

/// Section vocabulary, matched case-insensitively as substrings.
const CATEGORY_KEYWORDS: &[&str] = &[
    "dessert",
    "desserts",
    "sweet",
    "sweets",
    "savory",
    "savoury",
    "mains",
    "entree",
    "entrees",
    "beverage",
    "beverages",
    "drinks",
    "drink",
    "filipino",
    "pinoy",
    "local",
    "cafe",
    "coffee",
    "tea",
    "appetizer",
    "appetizers",
    "starters",
    "pasta",
    "noodles",
    "rice",
    "meals",
    "soup",
    "soups",
    "salad",
    "salads",
    "pizza",
    "pizzas",
    "burger",
    "burgers",
    "sandwich",
    "sandwiches",
    "breakfast",
    "lunch",
    "dinner",
];

/// Lines below this OCR confidence are never trusted as headers.
pub const HEADER_CONFIDENCE_FLOOR: f32 = 0.7;

/// Maximum whitespace-delimited tokens in a header line.
const HEADER_MAX_TOKENS: usize = 4;

/// Digit/whitespace/punctuation runs, which are never item names.
static NON_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\s\-\.]+$").expect("invalid pattern"));

/// Whether a line is a section header (e.g. "DESSERTS", "Beverages") that
/// scopes the items below it.
pub fn is_category_header(text: &str, confidence: f32) -> bool {
    let normalized = text.trim().to_lowercase();

    let has_keyword = CATEGORY_KEYWORDS.iter().any(|k| normalized.contains(k));
    let is_all_caps = text == text.to_uppercase() && text.trim().chars().count() > 2;
    let has_no_price = extract_price(text).is_none();
    let is_short = text.split_whitespace().count() <= HEADER_MAX_TOKENS;

    (has_keyword || is_all_caps) && has_no_price && is_short && confidence > HEADER_CONFIDENCE_FLOOR
}

/// Whether an unpriced line could be an item name waiting for its price on
/// the next line. Rejects stray digit runs (phone numbers, page numbers)
/// and anything too short or too long to be a name.
pub fn is_candidate_name(text: &str) -> bool {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    len > 2 && len < 100 && !NON_NAME.is_match(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_header() {
        assert!(is_category_header("Beverages", 0.9));
        assert!(is_category_header("Rice Meals", 0.9));
        assert!(is_category_header("desserts", 0.9));
    }

    #[test]
    fn test_all_caps_header_without_keyword() {
        assert!(is_category_header("SPECIALS", 0.9));
        assert!(is_category_header("HOUSE FAVORITES", 0.9));
    }

    #[test]
    fn test_priced_line_is_not_header() {
        assert!(!is_category_header("DESSERTS 120", 0.9));
        assert!(!is_category_header("Coffee ₱95", 0.9));
    }

    #[test]
    fn test_low_confidence_is_not_header() {
        assert!(!is_category_header("DESSERTS", 0.5));
        assert!(!is_category_header("DESSERTS", 0.7));
    }

    #[test]
    fn test_long_line_is_not_header() {
        assert!(!is_category_header(
            "ALL OUR PASTA DISHES ARE SERVED WITH BREAD",
            0.9
        ));
    }

    #[test]
    fn test_mixed_case_without_keyword_is_not_header() {
        assert!(!is_category_header("Chicken Inasal", 0.9));
    }

    #[test]
    fn test_candidate_name_bounds() {
        assert!(is_candidate_name("Spaghetti Bolognese"));
        assert!(is_candidate_name("  Kare-Kare  "));
        assert!(!is_candidate_name("Ab"));
        assert!(!is_candidate_name(&"x".repeat(100)));
    }

    #[test]
    fn test_digit_runs_are_not_names() {
        assert!(!is_candidate_name("0917-123-4567"));
        assert!(!is_candidate_name("999999"));
        assert!(!is_candidate_name("...."));
        assert!(!is_candidate_name("12 - 34"));
    }
}
