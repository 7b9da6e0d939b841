//! Cross-field validation with automatic correction.
//!
//! Corrections rewrite values whose intended meaning is unambiguous (swapped
//! amounts, a stale status). Everything else becomes a warning and the
//! extracted value is left alone.

use chrono::NaiveDate;
use tracing::debug;

use crate::infer::InferenceEngine;
use crate::models::record::{FieldValue, LotRecord};
use crate::models::report::Correction;
use crate::models::schema::FieldKey;

#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Validator
    }

    /// Check one record and repair what can be repaired.
    ///
    /// `today` anchors the status check. Document-level checks such as
    /// [`check_lot_count`](Self::check_lot_count) run separately, once per
    /// document.
    pub fn validate_and_correct(
        &self,
        record: &mut LotRecord,
        today: NaiveDate,
    ) -> (Vec<Correction>, Vec<String>) {
        let mut corrections = Vec::new();
        let mut warnings = Vec::new();

        self.fix_swapped_amounts(record, &mut corrections);
        self.fix_statut(record, today, &mut corrections);
        self.check_end_dates(record, &mut warnings);

        (corrections, warnings)
    }

    /// An estimated amount above the maximum means the two labels were read
    /// in the wrong order. The pair is swapped back.
    fn fix_swapped_amounts(&self, record: &mut LotRecord, corrections: &mut Vec<Correction>) {
        let (Some(estime), Some(maxi)) = (
            record.amount(FieldKey::MontantGlobalEstime),
            record.amount(FieldKey::MontantGlobalMaxi),
        ) else {
            return;
        };
        if estime <= maxi {
            return;
        }

        debug!(%estime, %maxi, "swapping estimated and maximum amounts");
        let confidence = record
            .get(FieldKey::MontantGlobalEstime)
            .map(|e| e.confidence)
            .unwrap_or(0.5)
            .min(
                record
                    .get(FieldKey::MontantGlobalMaxi)
                    .map(|e| e.confidence)
                    .unwrap_or(0.5),
            );
        record.set_corrected(FieldKey::MontantGlobalEstime, FieldValue::Amount(maxi), confidence);
        record.set_corrected(FieldKey::MontantGlobalMaxi, FieldValue::Amount(estime), confidence);
        corrections.push(Correction {
            field: FieldKey::MontantGlobalEstime,
            old_value: estime.to_string(),
            new_value: maxi.to_string(),
            reason: "montant estimé supérieur au montant maximum, valeurs permutées".to_string(),
        });
    }

    /// Re-derive the status from the date fields; an extracted status that
    /// contradicts them is replaced.
    fn fix_statut(&self, record: &mut LotRecord, today: NaiveDate, corrections: &mut Vec<Correction>) {
        let Some(current) = record.text(FieldKey::Statut).map(str::to_string) else {
            return;
        };
        let Some(expected) = InferenceEngine::new().infer_statut(record, today) else {
            return;
        };
        if current == expected {
            return;
        }

        let confidence = record
            .get(FieldKey::Statut)
            .map(|e| e.confidence)
            .unwrap_or(0.5);
        record.set_corrected(
            FieldKey::Statut,
            FieldValue::Text(expected.clone()),
            confidence,
        );
        corrections.push(Correction {
            field: FieldKey::Statut,
            old_value: current,
            new_value: expected,
            reason: "statut incohérent avec les dates du dossier".to_string(),
        });
    }

    /// The declared lot count disagreeing with segmentation is reported, not
    /// repaired: either side could be wrong. One check per document, whatever
    /// the record count.
    pub fn check_lot_count(&self, record: &LotRecord, detected_lots: usize) -> Option<String> {
        if detected_lots == 0 {
            return None;
        }
        let declared = record.integer(FieldKey::NbrLots)?;
        if declared == detected_lots as i64 {
            return None;
        }
        Some(format!(
            "le document annonce {declared} lots mais la segmentation en trouve {detected_lots}"
        ))
    }

    fn check_end_dates(&self, record: &LotRecord, warnings: &mut Vec<String>) {
        let sans = record.date(FieldKey::FinSansReconduction);
        let avec = record.date(FieldKey::FinAvecReconduction);
        if let (Some(sans), Some(avec)) = (sans, avec) {
            if avec < sans {
                warnings.push(
                    "fin avec reconduction antérieure à la fin sans reconduction".to_string(),
                );
            }
        }
        if let (Some(limite), Some(sans)) = (record.date(FieldKey::DateLimite), sans) {
            if sans < limite {
                warnings.push(
                    "fin de marché antérieure à la date limite de remise des offres".to_string(),
                );
            }
        }
    }
}
