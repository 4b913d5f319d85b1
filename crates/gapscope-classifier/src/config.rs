//! Configuration for the classification pipeline

use gapscope_domain::ValidationMode;
use serde::{Deserialize, Serialize};

/// Which classifier turns a document into domain chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Segment, label a capped batch of statements, aggregate
    #[default]
    Batch,
    /// One model call partitions the whole document
    Document,
}

/// Order in which classified statements are concatenated per domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationOrder {
    /// The order the model returned classifications in
    #[default]
    Response,
    /// Ascending statement index
    Document,
}

/// Configuration for the classification pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Classification strategy
    pub strategy: Strategy,

    /// Statements sent to the model per batch; the rest are not classified
    pub max_statements_per_batch: usize,

    /// Taxonomy gate for batch classifications
    pub batch_validation: ValidationMode,

    /// Taxonomy gate for whole-document chunks
    pub document_validation: ValidationMode,

    /// Concatenation order within a domain chunk
    pub aggregation_order: AggregationOrder,

    /// Maximum input text length (characters)
    pub max_text_length: usize,
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_statements_per_batch == 0 {
            return Err("max_statements_per_batch must be greater than 0".to_string());
        }
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.batch_validation == ValidationMode::Off {
            return Err("batch_validation cannot be off: batch classifications carry a typed domain".to_string());
        }
        Ok(())
    }

    /// Strict preset: both strategies check domains and subdomains, and
    /// chunks follow document order
    pub fn strict() -> Self {
        Self {
            batch_validation: ValidationMode::Strict,
            document_validation: ValidationMode::Strict,
            aggregation_order: AggregationOrder::Document,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Batch,
            max_statements_per_batch: 8,
            batch_validation: ValidationMode::DomainOnly,
            document_validation: ValidationMode::Off,
            aggregation_order: AggregationOrder::Response,
            max_text_length: 200_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_statements_per_batch, 8);
        assert_eq!(config.document_validation, ValidationMode::Off);
    }

    #[test]
    fn test_strict_config_is_valid() {
        assert!(PipelineConfig::strict().validate().is_ok());
    }

    #[test]
    fn test_batch_validation_off_rejected() {
        let config = PipelineConfig {
            batch_validation: ValidationMode::Off,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_batch_rejected() {
        let mut config = PipelineConfig::default();
        config.max_statements_per_batch = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PipelineConfig::from_toml(
            "strategy = \"document\"\ndocument_validation = \"strict\"\n",
        )
        .unwrap();
        assert_eq!(config.strategy, Strategy::Document);
        assert_eq!(config.document_validation, ValidationMode::Strict);
        assert_eq!(config.max_statements_per_batch, 8);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::strict();
        let parsed = PipelineConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
