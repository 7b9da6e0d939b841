//! Lot records: typed field values with confidence and provenance.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::schema::FieldKey;

/// A typed field value.
///
/// Tagged representation so `Integer(3)` and `Amount(3)` stay distinguishable
/// on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Amount(Decimal),
    Integer(i64),
    Boolean(bool),
}

impl FieldValue {
    /// Display form used by text and CSV exporters. Dates render as
    /// DD/MM/YYYY, booleans as OUI/NON.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Date(d) => d.format("%d/%m/%Y").to_string(),
            FieldValue::Amount(a) => a.to_string(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Boolean(true) => "OUI".to_string(),
            FieldValue::Boolean(false) => "NON".to_string(),
        }
    }
}

/// Where a field value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Matched directly in the document text.
    Extracted,
    /// Produced by inference (keywords, correlations, defaults).
    Generated,
    /// Rewritten by the validation pass.
    Corrected,
}

/// A filled field: value, confidence in [0, 1], provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub value: FieldValue,
    pub confidence: f32,
    pub provenance: Provenance,
}

/// One extraction record, i.e. one lot (or the whole procedure when no lots
/// were detected). Fields absent from the map are null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LotRecord {
    /// Lot number, `None` for a single-entry document without detected lots.
    pub lot_number: Option<u32>,
    pub fields: BTreeMap<FieldKey, FieldEntry>,
}

impl LotRecord {
    pub fn new(lot_number: Option<u32>) -> Self {
        LotRecord {
            lot_number,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: FieldKey) -> Option<&FieldEntry> {
        self.fields.get(&key)
    }

    pub fn is_filled(&self, key: FieldKey) -> bool {
        self.fields.contains_key(&key)
    }

    /// Text value of a field, if present and textual.
    pub fn text(&self, key: FieldKey) -> Option<&str> {
        match self.fields.get(&key) {
            Some(FieldEntry {
                value: FieldValue::Text(s),
                ..
            }) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn date(&self, key: FieldKey) -> Option<NaiveDate> {
        match self.fields.get(&key) {
            Some(FieldEntry {
                value: FieldValue::Date(d),
                ..
            }) => Some(*d),
            _ => None,
        }
    }

    pub fn amount(&self, key: FieldKey) -> Option<Decimal> {
        match self.fields.get(&key) {
            Some(FieldEntry {
                value: FieldValue::Amount(a),
                ..
            }) => Some(*a),
            _ => None,
        }
    }

    pub fn integer(&self, key: FieldKey) -> Option<i64> {
        match self.fields.get(&key) {
            Some(FieldEntry {
                value: FieldValue::Integer(n),
                ..
            }) => Some(*n),
            _ => None,
        }
    }

    pub fn set_extracted(&mut self, key: FieldKey, value: FieldValue, confidence: f32) {
        self.fields.insert(
            key,
            FieldEntry {
                value,
                confidence,
                provenance: Provenance::Extracted,
            },
        );
    }

    pub fn set_generated(&mut self, key: FieldKey, value: FieldValue, confidence: f32) {
        self.fields.insert(
            key,
            FieldEntry {
                value,
                confidence,
                provenance: Provenance::Generated,
            },
        );
    }

    pub fn set_corrected(&mut self, key: FieldKey, value: FieldValue, confidence: f32) {
        self.fields.insert(
            key,
            FieldEntry {
                value,
                confidence,
                provenance: Provenance::Corrected,
            },
        );
    }

    /// Fraction of the 44 schema fields that are filled.
    pub fn completeness(&self) -> f32 {
        self.fields.len() as f32 / FieldKey::ALL.len() as f32
    }

    /// Mean confidence over filled fields, 0.0 when empty.
    pub fn mean_confidence(&self) -> f32 {
        if self.fields.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.fields.values().map(|e| e.confidence).sum();
        sum / self.fields.len() as f32
    }

    /// Copy document-level fields from `doc` into this record without
    /// overwriting anything already filled. Lot-specific fields never
    /// propagate.
    pub fn merge_document_fields(&mut self, doc: &LotRecord) {
        for (key, entry) in &doc.fields {
            if key.is_lot_specific() || self.fields.contains_key(key) {
                continue;
            }
            self.fields.insert(*key, entry.clone());
        }
    }
}
