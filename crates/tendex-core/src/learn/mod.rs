//! Correlation learning over a historical record corpus.
//!
//! The learner counts co-occurrences between taxonomy fields in previously
//! validated records and turns the dominant pairings into suggestions:
//! univers to segment, univers to famille, (univers, segment) to famille and
//! groupement to type de procédure. Tables are immutable once built; readers
//! keep extracting against the current snapshot while a new one is being
//! built, and publication is an atomic pointer swap.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TendexError};
use crate::models::config::InferenceConfig;
use crate::models::record::LotRecord;
use crate::models::schema::FieldKey;

/// One historical observation, as stored in the corpus file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub univers: Option<String>,
    pub segment: Option<String>,
    pub famille: Option<String>,
    pub groupement: Option<String>,
    pub type_procedure: Option<String>,
}

/// Dominant value for one key, with how well it dominates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueStats {
    pub value: String,
    /// Observations of this key overall.
    pub support: usize,
    /// Fraction of observations carrying this value.
    pub confidence: f32,
}

/// A suggestion produced from the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub field: FieldKey,
    pub value: String,
    pub confidence: f32,
}

/// Immutable correlation snapshot.
///
/// Composite keys are upper-cased source values; the two-field key joins its
/// parts with `|`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrelationTable {
    universe_segment: HashMap<String, ValueStats>,
    universe_family: HashMap<String, ValueStats>,
    universe_segment_family: HashMap<String, ValueStats>,
    groupement_procedure: HashMap<String, ValueStats>,
    /// Records the table was built from.
    pub corpus_size: usize,
    min_confidence: f32,
}

fn norm(value: &str) -> String {
    value.trim().to_uppercase()
}

fn pair_key(a: &str, b: &str) -> String {
    format!("{}|{}", norm(a), norm(b))
}

/// Count target values per key, then keep the dominant target for keys with
/// enough observations.
fn dominant(
    observations: &[(String, String)],
    min_support: usize,
) -> HashMap<String, ValueStats> {
    let mut counts: HashMap<String, HashMap<String, usize>> = HashMap::new();
    for (key, value) in observations {
        *counts
            .entry(key.clone())
            .or_default()
            .entry(value.clone())
            .or_default() += 1;
    }

    let mut result = HashMap::new();
    for (key, values) in counts {
        let support: usize = values.values().sum();
        if support < min_support {
            continue;
        }
        if let Some((value, count)) = values.into_iter().max_by_key(|(_, c)| *c) {
            result.insert(
                key,
                ValueStats {
                    value,
                    support,
                    confidence: count as f32 / support as f32,
                },
            );
        }
    }
    result
}

impl CorrelationTable {
    /// Build a table from corpus records.
    pub fn build(corpus: &[CorpusRecord], config: &InferenceConfig) -> Self {
        let mut us: Vec<(String, String)> = Vec::new();
        let mut uf: Vec<(String, String)> = Vec::new();
        let mut usf: Vec<(String, String)> = Vec::new();
        let mut gp: Vec<(String, String)> = Vec::new();

        for record in corpus {
            if let (Some(u), Some(s)) = (&record.univers, &record.segment) {
                us.push((norm(u), norm(s)));
            }
            if let (Some(u), Some(f)) = (&record.univers, &record.famille) {
                uf.push((norm(u), norm(f)));
            }
            if let (Some(u), Some(s), Some(f)) =
                (&record.univers, &record.segment, &record.famille)
            {
                usf.push((pair_key(u, s), norm(f)));
            }
            if let (Some(g), Some(p)) = (&record.groupement, &record.type_procedure) {
                gp.push((norm(g), norm(p)));
            }
        }

        let table = CorrelationTable {
            universe_segment: dominant(&us, config.min_support),
            universe_family: dominant(&uf, config.min_support),
            universe_segment_family: dominant(&usf, config.min_support),
            groupement_procedure: dominant(&gp, config.min_support),
            corpus_size: corpus.len(),
            min_confidence: config.min_correlation_confidence,
        };
        info!(
            corpus_size = table.corpus_size,
            universe_segment = table.universe_segment.len(),
            universe_family = table.universe_family.len(),
            "correlation table built"
        );
        table
    }

    /// Load corpus records from a JSONL file and build the table.
    pub fn build_from_jsonl(path: &std::path::Path, config: &InferenceConfig) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut corpus = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: CorpusRecord = serde_json::from_str(line).map_err(|e| {
                TendexError::Corpus(format!("line {}: {e}", i + 1))
            })?;
            corpus.push(record);
        }
        Ok(CorrelationTable::build(&corpus, config))
    }

    fn lookup<'a>(
        &self,
        map: &'a HashMap<String, ValueStats>,
        key: &str,
    ) -> Option<&'a ValueStats> {
        map.get(key).filter(|s| s.confidence >= self.min_confidence)
    }

    /// Suggest a value for a missing field, from the filled fields of the
    /// record. More specific keys are consulted first.
    pub fn suggest(&self, field: FieldKey, record: &LotRecord) -> Option<Suggestion> {
        let univers = record.text(FieldKey::Univers);
        let segment = record.text(FieldKey::Segment);

        let stats = match field {
            FieldKey::Segment => self.lookup(&self.universe_segment, &norm(univers?)),
            FieldKey::Famille => {
                let by_pair = univers
                    .zip(segment)
                    .and_then(|(u, s)| self.lookup(&self.universe_segment_family, &pair_key(u, s)));
                by_pair.or_else(|| self.lookup(&self.universe_family, &norm(univers?)))
            }
            FieldKey::TypeProcedure => {
                let groupement = record.text(FieldKey::Groupement)?;
                self.lookup(&self.groupement_procedure, &norm(groupement))
            }
            _ => None,
        }?;

        Some(Suggestion {
            field,
            value: stats.value.clone(),
            confidence: stats.confidence,
        })
    }
}

/// Shared handle over the current correlation snapshot.
///
/// `load` clones the inner `Arc`, so extraction keeps a coherent snapshot for
/// its whole run; `publish` swaps the pointer atomically.
#[derive(Debug, Default)]
pub struct SharedCorrelations {
    inner: RwLock<Arc<CorrelationTable>>,
}

impl SharedCorrelations {
    pub fn new(table: CorrelationTable) -> Self {
        SharedCorrelations {
            inner: RwLock::new(Arc::new(table)),
        }
    }

    pub fn load(&self) -> Arc<CorrelationTable> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&*guard),
            // a poisoned lock still holds a valid snapshot
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    pub fn publish(&self, table: CorrelationTable) {
        let table = Arc::new(table);
        match self.inner.write() {
            Ok(mut guard) => *guard = table,
            Err(poisoned) => *poisoned.into_inner() = table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn obs(univers: &str, segment: &str, famille: &str) -> CorpusRecord {
        CorpusRecord {
            univers: Some(univers.to_string()),
            segment: Some(segment.to_string()),
            famille: Some(famille.to_string()),
            groupement: None,
            type_procedure: None,
        }
    }

    fn corpus() -> Vec<CorpusRecord> {
        vec![
            obs("IMAGERIE", "IRM", "Fourniture"),
            obs("IMAGERIE", "IRM", "Fourniture"),
            obs("IMAGERIE", "IRM", "Fourniture"),
            obs("IMAGERIE", "SCANNER", "Fourniture"),
            CorpusRecord {
                univers: None,
                segment: None,
                famille: None,
                groupement: Some("RESAH".to_string()),
                type_procedure: Some("Appel d'offres ouvert".to_string()),
            },
            CorpusRecord {
                univers: None,
                segment: None,
                famille: None,
                groupement: Some("RESAH".to_string()),
                type_procedure: Some("Appel d'offres ouvert".to_string()),
            },
            CorpusRecord {
                univers: None,
                segment: None,
                famille: None,
                groupement: Some("RESAH".to_string()),
                type_procedure: Some("Appel d'offres ouvert".to_string()),
            },
        ]
    }

    fn config() -> InferenceConfig {
        InferenceConfig::default()
    }

    #[test]
    fn test_dominant_value_with_support() {
        let table = CorrelationTable::build(&corpus(), &config());
        let mut record = LotRecord::new(None);
        record.set_extracted(
            FieldKey::Univers,
            crate::models::record::FieldValue::Text("Imagerie".to_string()),
            0.9,
        );

        let suggestion = table.suggest(FieldKey::Segment, &record).unwrap();
        assert_eq!(suggestion.value, "IRM");
        assert!((suggestion.confidence - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_min_support_blocks_thin_evidence() {
        let thin = vec![obs("BIOLOGIE", "HÉMATOLOGIE", "Fourniture")];
        let table = CorrelationTable::build(&thin, &config());
        let mut record = LotRecord::new(None);
        record.set_extracted(
            FieldKey::Univers,
            crate::models::record::FieldValue::Text("BIOLOGIE".to_string()),
            0.9,
        );
        assert_eq!(table.suggest(FieldKey::Segment, &record), None);
    }

    #[test]
    fn test_pair_key_more_specific_than_universe() {
        let mut c = corpus();
        // make the (univers, segment) pairing point at a different family
        c.extend([
            obs("IMAGERIE", "ÉCHOGRAPHIE", "Services"),
            obs("IMAGERIE", "ÉCHOGRAPHIE", "Services"),
            obs("IMAGERIE", "ÉCHOGRAPHIE", "Services"),
        ]);
        let table = CorrelationTable::build(&c, &config());

        let mut record = LotRecord::new(None);
        record.set_extracted(
            FieldKey::Univers,
            crate::models::record::FieldValue::Text("IMAGERIE".to_string()),
            0.9,
        );
        record.set_extracted(
            FieldKey::Segment,
            crate::models::record::FieldValue::Text("ÉCHOGRAPHIE".to_string()),
            0.9,
        );

        let suggestion = table.suggest(FieldKey::Famille, &record).unwrap();
        assert_eq!(suggestion.value, "SERVICES");
    }

    #[test]
    fn test_groupement_procedure() {
        let table = CorrelationTable::build(&corpus(), &config());
        let mut record = LotRecord::new(None);
        record.set_extracted(
            FieldKey::Groupement,
            crate::models::record::FieldValue::Text("Resah".to_string()),
            0.9,
        );
        let suggestion = table.suggest(FieldKey::TypeProcedure, &record).unwrap();
        assert_eq!(suggestion.value, "APPEL D'OFFRES OUVERT");
    }

    #[test]
    fn test_snapshot_swap() {
        let shared = SharedCorrelations::new(CorrelationTable::default());
        let before = shared.load();
        assert_eq!(before.corpus_size, 0);

        shared.publish(CorrelationTable::build(&corpus(), &config()));
        let after = shared.load();
        assert_eq!(after.corpus_size, 7);
        // the old snapshot is untouched
        assert_eq!(before.corpus_size, 0);
    }
}
