//! Menu item assembly from classified OCR lines
//!
//! A forward scan over each page with one piece of carried state: the
//! pending unpriced candidate name, used to stitch a name on one line to a
//! price on the next. A second pass catches dotted-leader table rows the
//! line scan misses, and a final pass drops duplicate detections.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use crate::ocr::document::{BoundingBox, OcrLine, OcrPage};
use crate::parser::classify::{is_candidate_name, is_category_header};
use crate::parser::price::{extract_price, strip_prices};
use crate::parser::ParsedMenuItem;

/// Category applied to items found before the first section header.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Confidence assigned to dotted-leader rows whose line reports none.
const DOTTED_FALLBACK_CONFIDENCE: f32 = 0.8;

/// Stripped remainders at or below this length are not usable names.
const MIN_NAME_CHARS: usize = 2;

/// "Some text ... three or more dots ... more text" table rows.
static DOTTED_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*\.{3,}\s*(.+)$").expect("invalid pattern"));

/// Line scanner for one page. The pending candidate is the only value
/// carried from line to line; category context also lives and dies with
/// the page.
struct PageScanner {
    category: String,
    pending: Option<PendingName>,
    items: Vec<ParsedMenuItem>,
}

/// The most recent unpriced line, held while waiting for a price below it.
struct PendingName {
    name: String,
    confidence: f32,
}

impl PageScanner {
    fn new() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            pending: None,
            items: Vec::new(),
        }
    }

    fn scan_line(&mut self, line: &OcrLine) {
        let text = line.content.trim();
        if text.is_empty() {
            return;
        }

        if is_category_header(text, line.confidence) {
            debug!("section header: {:?}", text);
            self.category = text.to_string();
            self.pending = None;
            return;
        }

        match extract_price(&line.content) {
            Some(price) => {
                let name = strip_prices(&line.content);
                if name.chars().count() > MIN_NAME_CHARS {
                    // Name and price on the same line
                    self.items.push(ParsedMenuItem {
                        id: Uuid::new_v4().to_string(),
                        category: self.category.clone(),
                        name,
                        description: None,
                        price,
                        confidence: line.confidence,
                        bounding_box: BoundingBox::from_polygon(&line.polygon),
                    });
                    self.pending = None;
                } else if let Some(pending) = self.pending.take() {
                    // Price-only line completing the previous line's name
                    self.items.push(ParsedMenuItem {
                        id: Uuid::new_v4().to_string(),
                        category: self.category.clone(),
                        name: pending.name,
                        description: None,
                        price,
                        confidence: (line.confidence + pending.confidence) / 2.0,
                        bounding_box: None,
                    });
                }
                // A short remainder with nothing pending has no usable name
            }
            None => {
                if is_candidate_name(text) {
                    self.pending = Some(PendingName {
                        name: text.to_string(),
                        confidence: line.confidence,
                    });
                }
            }
        }
    }

    /// Second strategy: "Item name.......₱50" table rows. Skips rows whose
    /// exact name and price were already picked up by the line scan.
    fn scan_dotted_rows(&mut self, page: &OcrPage) {
        for line in &page.lines {
            let Some(caps) = DOTTED_ROW.captures(&line.content) else {
                continue;
            };

            let name = caps.get(1).map_or("", |m| m.as_str()).trim();
            let trailing = caps.get(2).map_or("", |m| m.as_str());

            let Some(price) = extract_price(trailing) else {
                continue;
            };
            if name.chars().count() <= MIN_NAME_CHARS {
                continue;
            }

            let exists = self
                .items
                .iter()
                .any(|item| item.name == name && item.price == price);
            if exists {
                continue;
            }

            debug!("dotted-leader row: {:?} at {}", name, price);
            self.items.push(ParsedMenuItem {
                id: Uuid::new_v4().to_string(),
                category: self.category.clone(),
                name: name.to_string(),
                description: None,
                price,
                confidence: if line.confidence > 0.0 {
                    line.confidence
                } else {
                    DOTTED_FALLBACK_CONFIDENCE
                },
                bounding_box: None,
            });
        }
    }
}

/// Scan one page into menu items. Category context and the pending
/// candidate never leak across pages.
pub fn scan_page(page: &OcrPage) -> Vec<ParsedMenuItem> {
    let mut scanner = PageScanner::new();
    for line in &page.lines {
        scanner.scan_line(line);
    }
    scanner.scan_dotted_rows(page);
    scanner.items
}

/// Collapse items sharing a case-insensitive name and identical price,
/// keeping the first occurrence in encounter order.
pub fn dedupe_items(items: Vec<ParsedMenuItem>) -> Vec<ParsedMenuItem> {
    let mut seen: HashSet<(String, u64)> = HashSet::new();
    let mut unique = Vec::with_capacity(items.len());

    for item in items {
        let key = (item.name.to_lowercase(), item.price.to_bits());
        if seen.insert(key) {
            unique.push(item);
        }
    }

    unique
}

/// Index pairs of items whose names are nearly identical at the same price,
/// usually the same physical row read twice by the OCR engine. Advisory
/// only; nothing is removed.
pub fn suspected_duplicates(items: &[ParsedMenuItem]) -> Vec<(usize, usize)> {
    const SIMILARITY_FLOOR: f64 = 0.85;

    let mut pairs = Vec::new();
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if items[i].price != items[j].price {
                continue;
            }
            let similarity = strsim::normalized_levenshtein(
                &items[i].name.to_lowercase(),
                &items[j].name.to_lowercase(),
            );
            if similarity >= SIMILARITY_FLOOR {
                pairs.push((i, j));
            }
        }
    }
    pairs
}
