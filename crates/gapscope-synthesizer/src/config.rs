//! Configuration for retrieval and gap synthesis

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How reference controls are chosen for a subdomain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Nearest neighbours of the policy text, filtered by subdomain
    #[default]
    Semantic,
    /// Every control filed under the subdomain, in storage order
    Exact,
}

/// Configuration for the gap analysis stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Retrieval strategy
    pub retrieval_mode: RetrievalMode,

    /// Reference controls retrieved per analysis
    pub top_k: usize,

    /// Reference controls echoed back as provenance
    pub provenance_limit: usize,

    /// Syntheses allowed in flight at once
    pub max_concurrent_syntheses: usize,

    /// Wall-clock budget for one synthesis (seconds)
    pub synthesis_timeout_secs: u64,
}

impl SynthesizerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.max_concurrent_syntheses == 0 {
            return Err("max_concurrent_syntheses must be greater than 0".to_string());
        }
        if self.synthesis_timeout_secs == 0 {
            return Err("synthesis_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Timeout for one synthesis
    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
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

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            retrieval_mode: RetrievalMode::Semantic,
            top_k: 10,
            provenance_limit: 5,
            max_concurrent_syntheses: 4,
            synthesis_timeout_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SynthesizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_k, 10);
        assert_eq!(config.provenance_limit, 5);
        assert_eq!(config.synthesis_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_zero_values_rejected() {
        for config in [
            SynthesizerConfig { top_k: 0, ..SynthesizerConfig::default() },
            SynthesizerConfig { max_concurrent_syntheses: 0, ..SynthesizerConfig::default() },
            SynthesizerConfig { synthesis_timeout_secs: 0, ..SynthesizerConfig::default() },
        ] {
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_provenance_may_be_disabled() {
        let config = SynthesizerConfig { provenance_limit: 0, ..SynthesizerConfig::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SynthesizerConfig::from_toml("retrieval_mode = \"exact\"\ntop_k = 3\n").unwrap();
        assert_eq!(config.retrieval_mode, RetrievalMode::Exact);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.max_concurrent_syntheses, 4);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SynthesizerConfig {
            retrieval_mode: RetrievalMode::Exact,
            ..SynthesizerConfig::default()
        };
        let parsed = SynthesizerConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
