//! OCR Layer
//!
//! Everything between the image file and the layout parser: upload
//! preparation, the Azure Document Intelligence transport, and the
//! document model the parser consumes.

pub mod azure;
pub mod document;
pub mod preprocess;

pub use azure::{AzureLayoutClient, AzureOptions, DocumentAnalyzer, OcrError};
pub use document::{BoundingBox, OcrDocument, OcrLine, OcrPage, Point};
pub use preprocess::prepare_for_upload;
