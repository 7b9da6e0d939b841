//! Core library for procurement notice extraction.
//!
//! This crate provides:
//! - Locale-aware normalization of noisy decoded text (dates, amounts, OCR repair)
//! - Pattern-based field extraction for the 44-field lot schema
//! - Multi-strategy lot segmentation with quality scoring
//! - Correlation learning from a historical record corpus
//! - Tiered inference for fields absent from the document text
//! - Cross-field validation with automatic correction
//! - Content-addressed caching of full extraction results

pub mod cache;
pub mod error;
pub mod extract;
pub mod infer;
pub mod learn;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod segment;
pub mod validate;

pub use cache::{CacheKey, ExtractionCache};
pub use error::{Result, TendexError};
pub use extract::{FieldCandidate, PatternEngine};
pub use infer::InferenceEngine;
pub use learn::{CorrelationTable, SharedCorrelations, Suggestion};
pub use models::config::TendexConfig;
pub use models::record::{FieldEntry, FieldValue, LotRecord, Provenance};
pub use models::report::{Correction, QualityLabel, QualityReport};
pub use models::schema::{FieldCategory, FieldKey, FieldType};
pub use pipeline::{DocumentInput, ExtractionOutcome, Pipeline, Table};
pub use segment::{LotSeed, SegmentationEngine, SegmentationStrategy};
pub use validate::Validator;
