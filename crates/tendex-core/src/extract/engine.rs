//! Pattern engine: runs the field pattern tables over the document text.

use tracing::debug;

use crate::extract::patterns::FIELD_PATTERNS;
use crate::models::schema::FieldKey;

/// One raw extraction candidate, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCandidate {
    pub key: FieldKey,
    /// Raw matched fragment (first capture group).
    pub raw: String,
    /// Byte offset of the match in the source text.
    pub position: usize,
    /// Index of the pattern that matched; 0 is most specific.
    pub priority: usize,
    pub confidence: f32,
}

/// Confidence is driven by pattern specificity: the top pattern of a field
/// scores 0.95, each fallback costs 0.1, floored at 0.5.
fn confidence_for_priority(priority: usize) -> f32 {
    (0.95 - 0.1 * priority as f32).max(0.5)
}

/// Stateless wrapper over the static pattern tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternEngine;

impl PatternEngine {
    pub fn new() -> Self {
        PatternEngine
    }

    /// All candidates for one field, ordered by priority then position.
    pub fn extract(&self, text: &str, key: FieldKey) -> Vec<FieldCandidate> {
        let Some(patterns) = FIELD_PATTERNS.get(&key) else {
            return Vec::new();
        };
        let mut candidates = Vec::new();
        for (priority, pattern) in patterns.iter().enumerate() {
            for caps in pattern.captures_iter(text) {
                let Some(group) = caps.get(1) else { continue };
                candidates.push(FieldCandidate {
                    key,
                    raw: group.as_str().trim().to_string(),
                    position: group.start(),
                    priority,
                    confidence: confidence_for_priority(priority),
                });
            }
        }
        candidates.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(a.position.cmp(&b.position))
        });
        candidates
    }

    /// Best candidate for one field: highest-priority pattern, earliest match.
    pub fn extract_best(&self, text: &str, key: FieldKey) -> Option<FieldCandidate> {
        let candidate = self.extract(text, key).into_iter().next();
        if let Some(c) = &candidate {
            debug!(field = key.name(), raw = %c.raw, confidence = c.confidence, "field matched");
        }
        candidate
    }

    /// Fields the pattern tables know how to extract.
    pub fn extractable_fields(&self) -> impl Iterator<Item = FieldKey> + '_ {
        FieldKey::ALL
            .iter()
            .copied()
            .filter(|key| FIELD_PATTERNS.contains_key(key))
    }
}
