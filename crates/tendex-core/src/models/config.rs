//! Runtime configuration, loadable from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TendexError};

/// Top-level configuration for the extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TendexConfig {
    pub extraction: ExtractionConfig,
    pub segmentation: SegmentationConfig,
    pub inference: InferenceConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Candidates below this confidence are discarded.
    pub min_field_confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Lot numbers above this are treated as false positives.
    pub max_lot_number: u32,
    /// Two strategies disagree "ambiguously" when their lot counts differ by
    /// more than this fraction of the larger count.
    pub ambiguity_ratio: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Correlation suggestions below this confidence are ignored.
    pub min_correlation_confidence: f32,
    /// Minimum observations before a correlation is usable.
    pub min_support: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub capacity: usize,
    pub ttl_hours: u64,
}

impl Default for TendexConfig {
    fn default() -> Self {
        TendexConfig {
            extraction: ExtractionConfig::default(),
            segmentation: SegmentationConfig::default(),
            inference: InferenceConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            min_field_confidence: 0.5,
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        SegmentationConfig {
            max_lot_number: 200,
            ambiguity_ratio: 0.5,
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        InferenceConfig {
            min_correlation_confidence: 0.6,
            min_support: 3,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: true,
            capacity: 1000,
            ttl_hours: 24,
        }
    }
}

impl TendexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| TendexError::Config(format!("invalid configuration: {e}")))
    }

    /// Save configuration to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| TendexError::Config(format!("serialization failed: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.extraction.min_field_confidence) {
            return Err(TendexError::Config(
                "extraction.min_field_confidence must be in [0, 1]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.inference.min_correlation_confidence) {
            return Err(TendexError::Config(
                "inference.min_correlation_confidence must be in [0, 1]".to_string(),
            ));
        }
        if self.segmentation.max_lot_number == 0 {
            return Err(TendexError::Config(
                "segmentation.max_lot_number must be positive".to_string(),
            ));
        }
        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(TendexError::Config(
                "cache.capacity must be positive when the cache is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TendexConfig::default();
        assert_eq!(config.extraction.min_field_confidence, 0.5);
        assert_eq!(config.segmentation.max_lot_number, 200);
        assert_eq!(config.inference.min_support, 3);
        assert_eq!(config.cache.capacity, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: TendexConfig =
            serde_json::from_str(r#"{"cache": {"enabled": false}}"#).unwrap();
        assert!(!config.cache.enabled);
        // untouched sections keep their defaults
        assert_eq!(config.cache.capacity, 1000);
        assert_eq!(config.inference.min_correlation_confidence, 0.6);
    }

    #[test]
    fn test_validate_rejects_bad_confidence() {
        let mut config = TendexConfig::default();
        config.extraction.min_field_confidence = 1.5;
        assert!(config.validate().is_err());
    }
}
