//! End-to-end extraction pipeline.
//!
//! One call takes a decoded document (raw text plus any extracted tables)
//! through pattern extraction, lot segmentation, inference, validation and
//! caching, and returns one record per lot with a quality report.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{CacheKey, ExtractionCache};
use crate::error::Result;
use crate::extract::{detect_document_title, PatternEngine};
use crate::infer::InferenceEngine;
use crate::learn::{CorrelationTable, SharedCorrelations};
use crate::models::config::TendexConfig;
use crate::models::record::{FieldValue, LotRecord};
use crate::models::report::QualityReport;
use crate::models::schema::FieldKey;
use crate::normalize::{normalize_value, repair_ocr_text};
use crate::segment::{LotSeed, SegmentationEngine};
use crate::validate::Validator;

/// A table extracted from the document layout, kept as raw cell text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A decoded document, ready for extraction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Raw decoded text. The pipeline repairs a copy for field extraction
    /// but segmentation always sees this text untouched.
    pub text: String,
    pub tables: Vec<Table>,
}

/// Everything one extraction run produces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub records: Vec<LotRecord>,
    pub report: QualityReport,
    pub processing_time_ms: u64,
}

/// Confidence given to values carried by segmentation seeds (table cells and
/// lot headings).
const SEED_CONFIDENCE: f32 = 0.9;

pub struct Pipeline {
    config: TendexConfig,
    patterns: PatternEngine,
    segmentation: SegmentationEngine,
    inference: InferenceEngine,
    validator: Validator,
    correlations: SharedCorrelations,
    cache: Option<ExtractionCache>,
}

impl Pipeline {
    pub fn new(config: TendexConfig, correlations: CorrelationTable) -> Result<Self> {
        config.validate()?;
        let cache = config.cache.enabled.then(|| {
            ExtractionCache::new(
                config.cache.capacity,
                Duration::from_secs(config.cache.ttl_hours * 3600),
            )
        });
        Ok(Pipeline {
            segmentation: SegmentationEngine::new(config.segmentation.clone()),
            patterns: PatternEngine::new(),
            inference: InferenceEngine::new(),
            validator: Validator::new(),
            correlations: SharedCorrelations::new(correlations),
            cache,
            config,
        })
    }

    /// Replace the correlation snapshot. In-flight extractions keep the
    /// snapshot they started with.
    pub fn publish_correlations(&self, table: CorrelationTable) {
        self.correlations.publish(table);
    }

    pub fn cache_stats(&self) -> Option<crate::cache::CacheStats> {
        self.cache.as_ref().map(|c| c.stats())
    }

    /// Run the full pipeline on one document.
    ///
    /// `today` anchors the date-dependent heuristics, so the same document
    /// and date always produce the same records.
    pub fn extract(&self, input: &DocumentInput, today: NaiveDate) -> ExtractionOutcome {
        let started = Instant::now();

        let key = CacheKey::from_bytes(input.text.as_bytes());
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&key) {
                return cached;
            }
        }

        let correlations = self.correlations.load();
        let repaired = repair_ocr_text(&input.text);

        let doc = self.extract_document_fields(&input.text, &repaired);
        let declared = doc.integer(FieldKey::NbrLots).and_then(|n| u32::try_from(n).ok());

        let segmentation = self.segmentation.segment(&input.text, &input.tables, declared);
        let mut warnings = segmentation.warnings.clone();
        let detected = segmentation.seeds.len();
        // document-level check, once per document rather than per record
        if let Some(warning) = self.validator.check_lot_count(&doc, detected) {
            warnings.push(warning);
        }

        let mut records = if segmentation.seeds.is_empty() {
            vec![doc]
        } else {
            segmentation
                .seeds
                .iter()
                .map(|seed| self.record_from_seed(seed, &doc))
                .collect()
        };

        let mut corrections = Vec::new();
        for record in &mut records {
            self.inference.fill_missing(record, &correlations, today);
            let (c, w) = self.validator.validate_and_correct(record, today);
            corrections.extend(c);
            warnings.extend(w);
        }

        let n = records.len() as f32;
        let report = QualityReport {
            overall_confidence: records.iter().map(|r| r.mean_confidence()).sum::<f32>() / n,
            completeness: records.iter().map(|r| r.completeness()).sum::<f32>() / n,
            record_count: records.len(),
            segmentation_strategy: segmentation.strategy,
            corrections,
            warnings,
        };
        info!(
            records = records.len(),
            confidence = report.overall_confidence,
            strategy = report.segmentation_strategy.as_deref().unwrap_or("none"),
            "document extracted"
        );

        let outcome = ExtractionOutcome {
            records,
            report,
            processing_time_ms: started.elapsed().as_millis() as u64,
        };
        if let Some(cache) = &self.cache {
            cache.put(key, outcome.clone());
        }
        outcome
    }

    /// Document-level field extraction over the repaired text.
    fn extract_document_fields(&self, raw: &str, repaired: &str) -> LotRecord {
        let mut doc = LotRecord::new(None);

        for key in self.patterns.extractable_fields() {
            let Some(candidate) = self.patterns.extract_best(repaired, key) else {
                continue;
            };
            if candidate.confidence < self.config.extraction.min_field_confidence {
                continue;
            }
            if let Some(value) = normalize_value(&candidate.raw, key.field_type()) {
                doc.set_extracted(key, value, candidate.confidence);
            }
        }

        // The title heuristic runs on the raw text, where the layout still
        // shows which lines were set as a heading. It wins over a labeled
        // "objet :" match when it says more.
        if let Some(title) = detect_document_title(raw) {
            let keep_pattern = doc
                .text(FieldKey::IntituleProcedure)
                .is_some_and(|t| t.chars().count() > title.chars().count());
            if !keep_pattern {
                doc.set_extracted(
                    FieldKey::IntituleProcedure,
                    FieldValue::Text(title),
                    0.85,
                );
            }
        }

        doc
    }

    fn record_from_seed(&self, seed: &LotSeed, doc: &LotRecord) -> LotRecord {
        let mut record = LotRecord::new(Some(seed.number));
        record.set_extracted(
            FieldKey::LotNumero,
            FieldValue::Integer(seed.number as i64),
            SEED_CONFIDENCE,
        );
        if let Some(title) = &seed.title {
            record.set_extracted(
                FieldKey::IntituleLot,
                FieldValue::Text(title.clone()),
                SEED_CONFIDENCE,
            );
        }
        if let Some(estimated) = seed.estimated {
            record.set_extracted(
                FieldKey::MontantGlobalEstime,
                FieldValue::Amount(estimated),
                SEED_CONFIDENCE,
            );
        }
        if let Some(maximum) = seed.maximum {
            record.set_extracted(
                FieldKey::MontantGlobalMaxi,
                FieldValue::Amount(maximum),
                SEED_CONFIDENCE,
            );
        }
        record.merge_document_fields(doc);
        record
    }
}
