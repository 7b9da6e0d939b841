//! Strategy orchestration and scoring.

use tracing::debug;

use crate::models::config::SegmentationConfig;
use crate::pipeline::Table;
use crate::segment::line_analysis::LineAnalysisStrategy;
use crate::segment::regex_block::RegexBlockStrategy;
use crate::segment::structured_table::StructuredTableStrategy;
use crate::segment::{LotSeed, SegmentationStrategy};

/// Result of running every strategy and picking a winner.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationOutcome {
    pub seeds: Vec<LotSeed>,
    /// Name of the winning strategy, `None` when nothing was detected.
    pub strategy: Option<String>,
    pub warnings: Vec<String>,
}

pub struct SegmentationEngine {
    config: SegmentationConfig,
    strategies: Vec<Box<dyn SegmentationStrategy>>,
}

/// Proposal quality. Rewards found lots, titled lots, and agreement with the
/// lot count the document itself declares.
fn score(seeds: &[LotSeed], declared: Option<u32>) -> f32 {
    if seeds.is_empty() {
        return 0.0;
    }
    let titled = seeds.iter().filter(|s| s.title.is_some()).count();
    let mut score = 1.0 + titled as f32 / seeds.len() as f32;
    if let Some(declared) = declared {
        if declared as usize == seeds.len() {
            score += 1.0;
        } else {
            score -= 0.5;
        }
    }
    score
}

fn has_amounts(seeds: &[LotSeed]) -> bool {
    seeds
        .iter()
        .any(|s| s.estimated.is_some() || s.maximum.is_some())
}

impl SegmentationEngine {
    pub fn new(config: SegmentationConfig) -> Self {
        let max = config.max_lot_number;
        SegmentationEngine {
            config,
            strategies: vec![
                Box::new(StructuredTableStrategy::new(max)),
                Box::new(RegexBlockStrategy::new(max)),
                Box::new(LineAnalysisStrategy::new(max)),
            ],
        }
    }

    /// Run every strategy on the raw text and keep the best proposal.
    ///
    /// `declared` is the lot count announced by the document text, when one
    /// was extracted; it only influences scoring, never the seeds themselves.
    pub fn segment(
        &self,
        text: &str,
        tables: &[Table],
        declared: Option<u32>,
    ) -> SegmentationOutcome {
        let mut proposals: Vec<(&'static str, Vec<LotSeed>, f32)> = Vec::new();
        for strategy in &self.strategies {
            let seeds = strategy.run(text, tables);
            let s = score(&seeds, declared);
            debug!(strategy = strategy.name(), lots = seeds.len(), score = s, "strategy ran");
            proposals.push((strategy.name(), seeds, s));
        }

        let mut warnings = Vec::new();

        // Ambiguity check over non-empty proposals: materially different lot
        // counts mean the document layout defeated at least one strategy.
        let counts: Vec<usize> = proposals
            .iter()
            .filter(|(_, seeds, _)| !seeds.is_empty())
            .map(|(_, seeds, _)| seeds.len())
            .collect();
        if let (Some(&min), Some(&max)) = (counts.iter().min(), counts.iter().max()) {
            if min >= 2
                && max > min
                && (max - min) as f32 > self.config.ambiguity_ratio * max as f32
            {
                warnings.push(format!(
                    "segmentation ambiguë : les stratégies proposent entre {min} et {max} lots"
                ));
            }
        }

        let best = proposals
            .into_iter()
            .max_by(|a, b| {
                a.2.partial_cmp(&b.2)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| has_amounts(&a.1).cmp(&has_amounts(&b.1)))
            })
            .filter(|(_, seeds, _)| !seeds.is_empty());

        match best {
            Some((name, seeds, _)) => SegmentationOutcome {
                seeds,
                strategy: Some(name.to_string()),
                warnings,
            },
            None => SegmentationOutcome {
                seeds: Vec::new(),
                strategy: None,
                warnings,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn engine() -> SegmentationEngine {
        SegmentationEngine::new(SegmentationConfig::default())
    }

    fn lot_table() -> Table {
        Table {
            headers: vec!["Lot".to_string(), "Intitulé".to_string()],
            rows: vec![
                vec!["1".to_string(), "Scanners".to_string()],
                vec!["2".to_string(), "Maintenance".to_string()],
            ],
        }
    }

    #[test]
    fn test_table_wins_over_sparse_headings() {
        // table proposes 2 titled lots, text proposes 1 untitled one
        let text = "Lot 1\n";
        let outcome = engine().segment(text, &[lot_table()], None);
        assert_eq!(outcome.strategy.as_deref(), Some("structured_table"));
        assert_eq!(outcome.seeds.len(), 2);
    }

    #[test]
    fn test_declared_count_breaks_ties() {
        let text = "\
Lot 1 : Scanners
Lot 2 : Maintenance
Lot 3 : Consommables
";
        let outcome = engine().segment(text, &[lot_table()], Some(3));
        assert_eq!(outcome.strategy.as_deref(), Some("regex_block"));
        assert_eq!(outcome.seeds.len(), 3);
    }

    #[test]
    fn test_no_lots_anywhere() {
        let outcome = engine().segment("document sans lots", &[], None);
        assert!(outcome.seeds.is_empty());
        assert_eq!(outcome.strategy, None);
    }

    #[test]
    fn test_ambiguity_warning_on_large_disagreement() {
        // table says 2 lots, text headings say 5
        let text = "\
Lot 1 : A
Lot 2 : B
Lot 3 : C
Lot 4 : D
Lot 5 : E
";
        let outcome = engine().segment(text, &[lot_table()], None);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("ambiguë"));
    }
}
