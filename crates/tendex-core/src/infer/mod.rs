//! Tiered inference for fields the document never states.
//!
//! Confidence reflects how the value was obtained: corpus correlations keep
//! 90% of their learned confidence, deterministic lookup tables score 0.75,
//! keyword scoring 0.6 and bottom-tier defaults 0.5. Inference never
//! overwrites a filled field.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::learn::CorrelationTable;
use crate::models::record::{FieldValue, LotRecord};
use crate::models::schema::FieldKey;

/// Correlation suggestions carry 90% of their corpus confidence.
const CORRELATION_FACTOR: f32 = 0.9;
/// Deterministic lookup tables (univers to segment, famille and groupement
/// keywords).
const CONF_MAP: f32 = 0.75;
/// Keyword scoring over free text.
const CONF_KEYWORD_SCORE: f32 = 0.6;
/// Status and other bottom-tier generation.
const CONF_DEFAULT: f32 = 0.5;

pub const STATUT_EN_COURS: &str = "AO EN COURS";
pub const STATUT_ATTRIBUE: &str = "AO ATTRIBUÉ";
pub const STATUT_CLOTURE: &str = "AO CLÔTURÉ";

/// Universe keyword table. Order matters: the first universe whose keyword
/// list matches wins a tie.
const UNIVERS_KEYWORDS: [(&str, &[&str]); 6] = [
    ("IMAGERIE", &["scanner", "irm", "radiologie", "échographie", "imagerie", "mammographe"]),
    ("BIOLOGIE", &["laboratoire", "biologie", "analyse", "automate", "réactif", "hématologie"]),
    ("BLOC OPÉRATOIRE", &["bloc opératoire", "chirurgie", "bistouri", "endoscopie", "anesthésie"]),
    ("MÉDICAL", &["perfusion", "dispositif médical", "moniteur", "défibrillateur", "pousse-seringue"]),
    ("INFORMATIQUE", &["logiciel", "serveur", "informatique", "licence", "hébergement"]),
    ("MOBILIER", &["mobilier", "lit médicalisé", "brancard", "fauteuil"]),
];

/// Default segment per universe, when the corpus has nothing better.
/// Unaccented spellings appear alongside the accented ones because universe
/// values can come from sources that strip diacritics.
const UNIVERS_SEGMENT: [(&str, &str); 9] = [
    ("IMAGERIE", "IMAGERIE LOURDE"),
    ("BIOLOGIE", "AUTOMATES"),
    ("BLOC OPÉRATOIRE", "ÉQUIPEMENT DU BLOC"),
    ("BLOC OPERATOIRE", "ÉQUIPEMENT DU BLOC"),
    ("MÉDICAL", "E-SANTÉ"),
    ("MEDICAL", "E-SANTÉ"),
    ("INFORMATIQUE", "LOGICIELS"),
    ("MOBILIER", "MOBILIER DE SOIN"),
    ("MOBILIER MEDICAL", "MOBILIER DE SOIN"),
];

const FAMILLE_KEYWORDS: [(&str, &[&str]); 3] = [
    ("Travaux", &["travaux", "construction", "réhabilitation", "aménagement"]),
    ("Services", &["maintenance", "prestation", "service", "formation", "nettoyage", "location"]),
    ("Fourniture", &["fourniture", "acquisition", "achat", "livraison"]),
];

const GROUPEMENT_KEYWORDS: [(&str, &[&str]); 4] = [
    ("RESAH", &["resah"]),
    ("UNIHA", &["uniha", "uni.ha", "uni ha"]),
    ("UGAP", &["ugap"]),
    ("CAIH", &["caih"]),
];

const STOP_WORDS: [&str; 22] = [
    "le", "la", "les", "de", "des", "du", "un", "une", "et", "ou", "pour", "par", "sur",
    "dans", "avec", "aux", "au", "d'un", "d'une", "en", "à", "l'",
];

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[^\W\d_][^\W\d_'\-]+").unwrap();
}

/// Searchable text of a record: titles plus free-text fields.
fn searchable_text(record: &LotRecord) -> String {
    let mut parts = Vec::new();
    for key in [
        FieldKey::IntituleProcedure,
        FieldKey::IntituleLot,
        FieldKey::InfosComplementaires,
        FieldKey::Remarques,
    ] {
        if let Some(text) = record.text(key) {
            parts.push(text.to_lowercase());
        }
    }
    parts.join(" ")
}

fn keyword_lookup<'a>(text: &str, table: &[(&'a str, &[&str])]) -> Option<&'a str> {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(value, _)| *value)
}

/// Score every universe by keyword hit count; the highest count wins and a
/// tie goes to the earlier table entry.
fn best_scored<'a>(text: &str, table: &[(&'a str, &[&str])]) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for (value, keywords) in table {
        let hits = keywords.iter().filter(|k| text.contains(*k)).count();
        // strict comparison: a tie keeps the earlier table entry
        if hits > 0 && best.is_none_or(|(_, b)| hits > b) {
            best = Some((value, hits));
        }
    }
    best.map(|(value, _)| value)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InferenceEngine;

impl InferenceEngine {
    pub fn new() -> Self {
        InferenceEngine
    }

    /// Fill every missing inferable field of `record`.
    ///
    /// `today` anchors the deadline heuristic so runs are reproducible.
    pub fn fill_missing(
        &self,
        record: &mut LotRecord,
        correlations: &CorrelationTable,
        today: NaiveDate,
    ) {
        let text = searchable_text(record);

        if !record.is_filled(FieldKey::Univers) {
            if let Some(univers) = best_scored(&text, &UNIVERS_KEYWORDS) {
                debug!(univers, "universe inferred from keywords");
                record.set_generated(
                    FieldKey::Univers,
                    FieldValue::Text(univers.to_string()),
                    CONF_KEYWORD_SCORE,
                );
            }
        }

        if !record.is_filled(FieldKey::Groupement) {
            if let Some(groupement) = keyword_lookup(&text, &GROUPEMENT_KEYWORDS) {
                record.set_generated(
                    FieldKey::Groupement,
                    FieldValue::Text(groupement.to_string()),
                    CONF_MAP,
                );
            }
        }

        // Correlations outrank keyword tables for the dependent fields, so
        // they are consulted first and the tables only backfill.
        for field in [FieldKey::Segment, FieldKey::Famille, FieldKey::TypeProcedure] {
            if record.is_filled(field) {
                continue;
            }
            if let Some(suggestion) = correlations.suggest(field, record) {
                debug!(field = field.name(), value = %suggestion.value, "correlation suggestion");
                record.set_generated(
                    field,
                    FieldValue::Text(suggestion.value),
                    CORRELATION_FACTOR * suggestion.confidence,
                );
            }
        }

        if !record.is_filled(FieldKey::Segment) {
            if let Some(univers) = record.text(FieldKey::Univers) {
                let upper = univers.to_uppercase();
                if let Some((_, segment)) = UNIVERS_SEGMENT.iter().find(|(u, _)| *u == upper) {
                    record.set_generated(
                        FieldKey::Segment,
                        FieldValue::Text((*segment).to_string()),
                        CONF_MAP,
                    );
                }
            }
        }

        if !record.is_filled(FieldKey::Famille) {
            if let Some(famille) = keyword_lookup(&text, &FAMILLE_KEYWORDS) {
                record.set_generated(
                    FieldKey::Famille,
                    FieldValue::Text(famille.to_string()),
                    CONF_MAP,
                );
            } else {
                // most procurement notices in this corpus buy goods
                record.set_generated(
                    FieldKey::Famille,
                    FieldValue::Text("Fourniture".to_string()),
                    CONF_DEFAULT,
                );
            }
        }

        if !record.is_filled(FieldKey::Statut) {
            if let Some(statut) = self.infer_statut(record, today) {
                record.set_generated(FieldKey::Statut, FieldValue::Text(statut), CONF_DEFAULT);
            }
        }

        if !record.is_filled(FieldKey::MotsCles) {
            if let Some(keywords) = self.generate_keywords(record) {
                record.set_generated(
                    FieldKey::MotsCles,
                    FieldValue::Text(keywords),
                    CONF_KEYWORD_SCORE,
                );
            }
        }
    }

    /// Status from the other fields: an award date or awardee means awarded,
    /// a passed deadline means closed, a live deadline or an identified
    /// procedure means still open. Without any of that, no status.
    pub fn infer_statut(&self, record: &LotRecord, today: NaiveDate) -> Option<String> {
        if record.is_filled(FieldKey::DateAttribution) || record.is_filled(FieldKey::Attributaire)
        {
            return Some(STATUT_ATTRIBUE.to_string());
        }
        if let Some(deadline) = record.date(FieldKey::DateLimite) {
            return Some(if deadline < today {
                STATUT_CLOTURE.to_string()
            } else {
                STATUT_EN_COURS.to_string()
            });
        }
        if record.is_filled(FieldKey::ReferenceProcedure)
            && record.is_filled(FieldKey::IntituleProcedure)
        {
            return Some(STATUT_EN_COURS.to_string());
        }
        None
    }

    /// Keyword list from the titles: significant words, deduplicated, in
    /// order of appearance.
    pub fn generate_keywords(&self, record: &LotRecord) -> Option<String> {
        let mut source = String::new();
        if let Some(t) = record.text(FieldKey::IntituleLot) {
            source.push_str(t);
            source.push(' ');
        }
        if let Some(t) = record.text(FieldKey::IntituleProcedure) {
            source.push_str(t);
        }
        if source.trim().is_empty() {
            return None;
        }

        let mut seen = Vec::new();
        for m in WORD.find_iter(&source.to_lowercase()) {
            let word = m.as_str();
            if word.chars().count() < 3 || STOP_WORDS.contains(&word) {
                continue;
            }
            if !seen.iter().any(|s| s == word) {
                seen.push(word.to_string());
            }
        }
        if seen.is_empty() {
            None
        } else {
            Some(seen.into_iter().take(8).collect::<Vec<_>>().join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn titled(title: &str) -> LotRecord {
        let mut record = LotRecord::new(Some(1));
        record.set_extracted(
            FieldKey::IntituleProcedure,
            FieldValue::Text(title.to_string()),
            0.9,
        );
        record
    }

    #[test]
    fn test_universe_from_keywords() {
        let mut record = titled("Fourniture de scanners mobiles");
        InferenceEngine::new().fill_missing(&mut record, &CorrelationTable::default(), today());
        assert_eq!(record.text(FieldKey::Univers), Some("IMAGERIE"));
        assert_eq!(
            record.get(FieldKey::Univers).unwrap().confidence,
            CONF_KEYWORD_SCORE
        );
    }

    #[test]
    fn test_universe_hit_count_beats_order() {
        // one IMAGERIE hit against two BIOLOGIE hits: the count decides,
        // not the table position
        let mut record = titled("Scanner d'automates de laboratoire");
        InferenceEngine::new().fill_missing(&mut record, &CorrelationTable::default(), today());
        assert_eq!(record.text(FieldKey::Univers), Some("BIOLOGIE"));
    }

    #[test]
    fn test_medical_universe_falls_back_to_esante_segment() {
        let mut record = titled("Acquisition de pousse-seringues");
        InferenceEngine::new().fill_missing(&mut record, &CorrelationTable::default(), today());
        assert_eq!(record.text(FieldKey::Univers), Some("MÉDICAL"));
        assert_eq!(record.text(FieldKey::Segment), Some("E-SANTÉ"));
    }

    #[test]
    fn test_statut_from_deadline() {
        let engine = InferenceEngine::new();

        let mut open = LotRecord::new(None);
        open.set_extracted(
            FieldKey::DateLimite,
            FieldValue::Date(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()),
            0.9,
        );
        assert_eq!(
            engine.infer_statut(&open, today()).as_deref(),
            Some(STATUT_EN_COURS)
        );

        let mut closed = LotRecord::new(None);
        closed.set_extracted(
            FieldKey::DateLimite,
            FieldValue::Date(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()),
            0.9,
        );
        assert_eq!(
            engine.infer_statut(&closed, today()).as_deref(),
            Some(STATUT_CLOTURE)
        );

        let mut awarded = LotRecord::new(None);
        awarded.set_extracted(
            FieldKey::Attributaire,
            FieldValue::Text("SIEMENS HEALTHINEERS".to_string()),
            0.9,
        );
        assert_eq!(
            engine.infer_statut(&awarded, today()).as_deref(),
            Some(STATUT_ATTRIBUE)
        );

        // nothing to go on: the status stays null
        let empty = LotRecord::new(None);
        assert_eq!(engine.infer_statut(&empty, today()), None);
    }

    #[test]
    fn test_segment_table_accepts_unaccented_universe() {
        let mut record = LotRecord::new(None);
        record.set_extracted(
            FieldKey::Univers,
            FieldValue::Text("Medical".to_string()),
            0.9,
        );
        InferenceEngine::new().fill_missing(&mut record, &CorrelationTable::default(), today());
        assert_eq!(record.text(FieldKey::Segment), Some("E-SANTÉ"));
    }

    #[test]
    fn test_keywords_skip_stop_words() {
        let record = titled("Fourniture de scanners pour le service de radiologie");
        let keywords = InferenceEngine::new().generate_keywords(&record).unwrap();
        assert_eq!(keywords, "fourniture, scanners, service, radiologie");
    }

    #[test]
    fn test_inference_never_overwrites() {
        let mut record = titled("Fourniture de scanners");
        record.set_extracted(
            FieldKey::Univers,
            FieldValue::Text("BIOLOGIE".to_string()),
            0.95,
        );
        InferenceEngine::new().fill_missing(&mut record, &CorrelationTable::default(), today());
        assert_eq!(record.text(FieldKey::Univers), Some("BIOLOGIE"));
    }

    #[test]
    fn test_famille_default() {
        let mut record = titled("Objet sans indice particulier");
        InferenceEngine::new().fill_missing(&mut record, &CorrelationTable::default(), today());
        assert_eq!(record.text(FieldKey::Famille), Some("Fourniture"));
        assert_eq!(record.get(FieldKey::Famille).unwrap().confidence, CONF_DEFAULT);
    }
}
