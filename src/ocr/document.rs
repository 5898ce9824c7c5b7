//! OCR document model
//!
//! Domain types handed to the layout parser, plus the wire types for the
//! Azure `analyzeResult` payload. Every wire collection defaults to empty,
//! so a structurally missing field deserializes to an empty document
//! instead of failing.

use serde::{Deserialize, Serialize};

/// 2D point in image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned rectangle derived from a line's bounding polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Min/max corners of the polygon; `None` when no geometry is available.
    pub fn from_polygon(polygon: &[Point]) -> Option<Self> {
        if polygon.is_empty() {
            return None;
        }

        let min_x = polygon.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let min_y = polygon.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_x = polygon.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let max_y = polygon.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);

        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

/// One detected row of text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrLine {
    /// Text content of the line
    pub content: String,
    /// Engine certainty (0.0 - 1.0)
    pub confidence: f32,
    /// Bounding quadrilateral corners; empty when geometry was unavailable
    pub polygon: Vec<Point>,
}

/// Detected lines of one page, in reading order as reported by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrPage {
    pub lines: Vec<OcrLine>,
}

/// The whole analyzed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrDocument {
    pub pages: Vec<OcrPage>,
}

/// Character range into the full analyzed text.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct Span {
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub length: usize,
}

impl Span {
    fn contains(&self, other: &Span) -> bool {
        other.offset >= self.offset && other.offset + other.length <= self.offset + self.length
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AnalyzeLine {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub polygon: Vec<f32>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AnalyzeWord {
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AnalyzePage {
    #[serde(default)]
    pub lines: Vec<AnalyzeLine>,
    #[serde(default)]
    pub words: Vec<AnalyzeWord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AnalyzeResult {
    #[serde(default)]
    pub pages: Vec<AnalyzePage>,
}

impl From<AnalyzeResult> for OcrDocument {
    fn from(result: AnalyzeResult) -> Self {
        Self {
            pages: result.pages.into_iter().map(OcrPage::from).collect(),
        }
    }
}

impl From<AnalyzePage> for OcrPage {
    fn from(page: AnalyzePage) -> Self {
        let lines = page
            .lines
            .iter()
            .map(|line| OcrLine {
                content: line.content.clone(),
                confidence: line_confidence(line, &page.words),
                polygon: points_from_flat(&line.polygon),
            })
            .collect();
        Self { lines }
    }
}

/// Layout lines carry no confidence of their own in the Azure response;
/// average the words whose spans fall inside the line when the explicit
/// value is missing.
fn line_confidence(line: &AnalyzeLine, words: &[AnalyzeWord]) -> f32 {
    if let Some(confidence) = line.confidence {
        return confidence;
    }

    let mut sum = 0.0f32;
    let mut count = 0u32;
    for word in words {
        let (Some(span), Some(confidence)) = (word.span, word.confidence) else {
            continue;
        };
        if line.spans.iter().any(|line_span| line_span.contains(&span)) {
            sum += confidence;
            count += 1;
        }
    }

    if count > 0 {
        sum / count as f32
    } else {
        0.0
    }
}

/// Flat `[x, y, x, y, ...]` coordinates into points. An odd trailing
/// coordinate is dropped.
fn points_from_flat(flat: &[f32]) -> Vec<Point> {
    flat.chunks_exact(2)
        .map(|pair| Point {
            x: pair[0],
            y: pair[1],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_from_polygon() {
        let polygon = vec![
            Point { x: 5.0, y: 8.0 },
            Point { x: 45.0, y: 8.0 },
            Point { x: 45.0, y: 20.0 },
            Point { x: 5.0, y: 20.0 },
        ];
        let bounds = BoundingBox::from_polygon(&polygon).unwrap();
        assert_eq!(bounds.x, 5.0);
        assert_eq!(bounds.y, 8.0);
        assert_eq!(bounds.width, 40.0);
        assert_eq!(bounds.height, 12.0);
    }

    #[test]
    fn test_bounding_box_absent_without_polygon() {
        assert!(BoundingBox::from_polygon(&[]).is_none());
    }

    #[test]
    fn test_points_from_flat_drops_odd_trailing_value() {
        let points = points_from_flat(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], Point { x: 3.0, y: 4.0 });
    }

    #[test]
    fn test_line_confidence_from_word_spans() {
        let line = AnalyzeLine {
            content: "Cake 120".to_string(),
            spans: vec![Span {
                offset: 0,
                length: 8,
            }],
            ..Default::default()
        };
        let words = vec![
            AnalyzeWord {
                confidence: Some(0.9),
                span: Some(Span {
                    offset: 0,
                    length: 4,
                }),
            },
            AnalyzeWord {
                confidence: Some(0.7),
                span: Some(Span {
                    offset: 5,
                    length: 3,
                }),
            },
            // Outside the line span, must not contribute
            AnalyzeWord {
                confidence: Some(0.1),
                span: Some(Span {
                    offset: 20,
                    length: 3,
                }),
            },
        ];
        let confidence = line_confidence(&line, &words);
        assert!((confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_explicit_line_confidence_wins() {
        let line = AnalyzeLine {
            confidence: Some(0.55),
            ..Default::default()
        };
        assert_eq!(line_confidence(&line, &[]), 0.55);
    }

    #[test]
    fn test_line_confidence_defaults_to_zero() {
        assert_eq!(line_confidence(&AnalyzeLine::default(), &[]), 0.0);
    }

    #[test]
    fn test_deserialize_sparse_analyze_result() {
        // Missing words, polygons, confidences; the document still builds
        let json = r#"{
            "pages": [
                { "lines": [ { "content": "DESSERTS" } ] },
                {}
            ]
        }"#;
        let result: AnalyzeResult = serde_json::from_str(json).unwrap();
        let document = OcrDocument::from(result);
        assert_eq!(document.pages.len(), 2);
        assert_eq!(document.pages[0].lines[0].content, "DESSERTS");
        assert_eq!(document.pages[0].lines[0].confidence, 0.0);
        assert!(document.pages[0].lines[0].polygon.is_empty());
        assert!(document.pages[1].lines.is_empty());
    }

    #[test]
    fn test_deserialize_full_line() {
        let json = r#"{
            "pages": [{
                "lines": [{
                    "content": "Cake 120",
                    "polygon": [1.0, 2.0, 3.0, 2.0, 3.0, 4.0, 1.0, 4.0],
                    "spans": [{ "offset": 0, "length": 8 }]
                }],
                "words": [
                    { "content": "Cake", "confidence": 0.9, "span": { "offset": 0, "length": 4 } },
                    { "content": "120", "confidence": 0.9, "span": { "offset": 5, "length": 3 } }
                ]
            }]
        }"#;
        let result: AnalyzeResult = serde_json::from_str(json).unwrap();
        let document = OcrDocument::from(result);
        let line = &document.pages[0].lines[0];
        assert_eq!(line.polygon.len(), 4);
        assert!((line.confidence - 0.9).abs() < 1e-6);
    }
}
