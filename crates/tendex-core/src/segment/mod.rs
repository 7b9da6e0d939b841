//! Lot segmentation.
//!
//! Three independent strategies each propose a lot list from the raw document
//! (structured tables, explicit "Lot N" headings, contextual line analysis).
//! The engine scores the proposals and keeps the best one. Segmentation
//! always runs on raw text: normalization could destroy the layout cues the
//! strategies depend on.

pub mod engine;
pub mod line_analysis;
pub mod regex_block;
pub mod structured_table;

pub use engine::{SegmentationEngine, SegmentationOutcome};

use rust_decimal::Decimal;

use crate::pipeline::Table;

/// A lot proposed by a segmentation strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct LotSeed {
    pub number: u32,
    pub title: Option<String>,
    pub estimated: Option<Decimal>,
    pub maximum: Option<Decimal>,
}

/// A lot detection strategy.
pub trait SegmentationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Propose lots from the raw text and extracted tables. Results must be
    /// deduplicated by lot number and sorted.
    fn run(&self, text: &str, tables: &[Table]) -> Vec<LotSeed>;
}

/// Sort by lot number and drop duplicate numbers, keeping the first
/// occurrence (strategies emit better candidates first).
pub(crate) fn dedupe_seeds(mut seeds: Vec<LotSeed>) -> Vec<LotSeed> {
    seeds.sort_by_key(|s| s.number);
    seeds.dedup_by_key(|s| s.number);
    seeds
}
