//! Quality reporting: corrections, warnings and an overall label.

use serde::{Deserialize, Serialize};

use crate::models::schema::FieldKey;

/// One automatic correction applied by the validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub field: FieldKey,
    pub old_value: String,
    pub new_value: String,
    pub reason: String,
}

/// Coarse quality bucket derived from the overall confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLabel {
    High,
    Medium,
    Low,
}

impl QualityLabel {
    pub fn from_score(score: f32) -> Self {
        if score >= 0.75 {
            QualityLabel::High
        } else if score >= 0.45 {
            QualityLabel::Medium
        } else {
            QualityLabel::Low
        }
    }
}

/// Summary of one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QualityReport {
    /// Mean confidence over all filled fields of all records.
    pub overall_confidence: f32,
    /// Fraction of schema fields filled, averaged over records.
    pub completeness: f32,
    /// Number of lot records produced.
    pub record_count: usize,
    /// Which segmentation strategy won, if any detected lots.
    pub segmentation_strategy: Option<String>,
    pub corrections: Vec<Correction>,
    pub warnings: Vec<String>,
}

impl QualityReport {
    pub fn label(&self) -> QualityLabel {
        QualityLabel::from_score(self.overall_confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_thresholds() {
        assert_eq!(QualityLabel::from_score(0.75), QualityLabel::High);
        assert_eq!(QualityLabel::from_score(0.749), QualityLabel::Medium);
        assert_eq!(QualityLabel::from_score(0.45), QualityLabel::Medium);
        assert_eq!(QualityLabel::from_score(0.449), QualityLabel::Low);
        assert_eq!(QualityLabel::from_score(0.0), QualityLabel::Low);
    }
}
