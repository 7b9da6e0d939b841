//! Pattern-based field extraction.

pub mod engine;
pub mod patterns;
pub mod title;

pub use engine::{FieldCandidate, PatternEngine};
pub use title::detect_document_title;
