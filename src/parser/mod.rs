//! Menu Layout Parser
//!
//! Recovers structured menu items from raw OCR output: lines of text with
//! positions and confidence scores, no guaranteed layout conventions. The
//! heuristics are price pattern matching, a section keyword vocabulary,
//! capitalization, and line adjacency; noisy input degrades to fewer items,
//! never to an error.

pub mod assemble;
pub mod classify;
pub mod price;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ocr::document::{BoundingBox, OcrDocument};

pub use assemble::{dedupe_items, scan_page, suspected_duplicates, DEFAULT_CATEGORY};
pub use classify::{is_candidate_name, is_category_header};
pub use price::{extract_price, strip_prices, MAX_PRICE};

/// One menu item recovered from the photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedMenuItem {
    /// Stable identifier for the life of this record
    pub id: String,
    /// Section the item was found under
    pub category: String,
    /// Item name with price substrings removed
    pub name: String,
    /// Elaborating text; the line-by-line scan never fills this in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Currency-agnostic amount
    pub price: f64,
    /// Certainty derived from the contributing line(s) (0.0 - 1.0)
    pub confidence: f32,
    /// Axis-aligned box around the source line, when geometry was available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

/// Final output of one parse invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuScanResult {
    /// Deduplicated items in encounter order
    pub items: Vec<ParsedMenuItem>,
    /// Every line's text in encounter order, newline-separated
    pub raw_text: String,
    /// Number of pages in the analyzed document
    pub page_count: usize,
}

/// Parse an OCR document into structured menu items.
///
/// Pure and synchronous. An empty or structurally missing document yields
/// an empty result; this never fails.
pub fn parse_menu_document(document: &OcrDocument) -> MenuScanResult {
    let mut items = Vec::new();
    for page in &document.pages {
        items.extend(assemble::scan_page(page));
    }

    let detected = items.len();
    let items = assemble::dedupe_items(items);
    debug!(
        "parsed {} unique menu items ({} duplicates removed)",
        items.len(),
        detected - items.len()
    );

    let raw_text = document
        .pages
        .iter()
        .flat_map(|page| page.lines.iter())
        .map(|line| line.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    MenuScanResult {
        items,
        raw_text,
        page_count: document.pages.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::document::{OcrLine, OcrPage, Point};

    fn document(pages: &[&[(&str, f32)]]) -> OcrDocument {
        OcrDocument {
            pages: pages
                .iter()
                .map(|lines| OcrPage {
                    lines: lines
                        .iter()
                        .map(|(content, confidence)| OcrLine {
                            content: content.to_string(),
                            confidence: *confidence,
                            polygon: Vec::new(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_document() {
        let result = parse_menu_document(&OcrDocument::default());
        assert!(result.items.is_empty());
        assert_eq!(result.raw_text, "");
        assert_eq!(result.page_count, 0);
    }

    #[test]
    fn test_single_line_prefix_format() {
        let result = parse_menu_document(&document(&[&[("₱250 Lechon Kawali", 0.95)]]));
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].name, "Lechon Kawali");
        assert_eq!(result.items[0].price, 250.0);
        assert_eq!(result.page_count, 1);
    }

    #[test]
    fn test_single_line_dotted_suffix_format() {
        let result = parse_menu_document(&document(&[&[("Caesar Salad ... ₱150", 0.9)]]));
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].name, "Caesar Salad");
        assert_eq!(result.items[0].price, 150.0);
    }

    #[test]
    fn test_header_precedence_over_item() {
        let result = parse_menu_document(&document(&[&[("DESSERTS", 0.9), ("Cake 120", 0.9)]]));
        assert_eq!(result.items.len(), 1);
        // Case as encountered; the header line itself is not an item
        assert_eq!(result.items[0].category, "DESSERTS");
        assert_eq!(result.items[0].name, "Cake");
    }

    #[test]
    fn test_category_resets_per_page() {
        let result = parse_menu_document(&document(&[
            &[("DESSERTS", 0.9), ("Cake 120", 0.9)],
            &[("Tapsilog 95", 0.9)],
        ]));
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].category, "DESSERTS");
        assert_eq!(result.items[1].category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_pending_candidate_does_not_cross_pages() {
        let result = parse_menu_document(&document(&[
            &[("Spaghetti Bolognese", 0.9)],
            &[("₱180", 0.8)],
        ]));
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_cross_strategy_deduplication() {
        // Same row detected by both the line scan and the dotted pass on a
        // later page still yields a single item
        let result = parse_menu_document(&document(&[
            &[("Caesar Salad 150", 0.9)],
            &[("Caesar Salad.......150", 0.9)],
        ]));
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn test_raw_text_preserves_encounter_order() {
        let result = parse_menu_document(&document(&[
            &[("DESSERTS", 0.9), ("Cake 120", 0.9)],
            &[("Tapsilog 95", 0.9)],
        ]));
        assert_eq!(result.raw_text, "DESSERTS\nCake 120\nTapsilog 95");
        assert_eq!(result.page_count, 2);
    }

    #[test]
    fn test_noise_lines_are_dropped() {
        let result = parse_menu_document(&document(&[&[
            ("", 0.9),
            ("   ", 0.9),
            ("12345678", 0.9),
            ("Adobo Rice Bowl ₱145", 0.9),
        ]]));
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].name, "Adobo Rice Bowl");
    }

    #[test]
    fn test_bounding_box_carried_from_polygon() {
        let document = OcrDocument {
            pages: vec![OcrPage {
                lines: vec![OcrLine {
                    content: "Adobo Rice Bowl ₱145".to_string(),
                    confidence: 0.9,
                    polygon: vec![
                        Point { x: 10.0, y: 20.0 },
                        Point { x: 110.0, y: 20.0 },
                        Point { x: 110.0, y: 44.0 },
                        Point { x: 10.0, y: 44.0 },
                    ],
                }],
            }],
        };
        let result = parse_menu_document(&document);
        let bounds = result.items[0].bounding_box.expect("bounding box");
        assert_eq!(bounds.x, 10.0);
        assert_eq!(bounds.y, 20.0);
        assert_eq!(bounds.width, 100.0);
        assert_eq!(bounds.height, 24.0);
    }

    #[test]
    fn test_parse_is_deterministic_apart_from_ids() {
        let doc = document(&[&[("DESSERTS", 0.9), ("Cake 120", 0.9), ("Leche Flan 80", 0.9)]]);
        let first = parse_menu_document(&doc);
        let second = parse_menu_document(&doc);
        let names: Vec<_> = first.items.iter().map(|i| (&i.name, i.price)).collect();
        let names_again: Vec<_> = second.items.iter().map(|i| (&i.name, i.price)).collect();
        assert_eq!(names, names_again);
        assert_eq!(first.raw_text, second.raw_text);
    }
}
