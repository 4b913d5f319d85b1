//! Configuration management for the CLI.
//!
//! One TOML file with a section per layer:
//!
//! ```toml
//! [pipeline]
//! strategy = "batch"
//!
//! [synthesis]
//! retrieval_mode = "semantic"
//!
//! [llm]
//! model = "mistral"
//!
//! [store]
//! dimension = 384
//!
//! [audit]
//! path = "raw_llm_output.log"
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use crate::error::{CliError, Result};
use gapscope_classifier::PipelineConfig;
use gapscope_llm::ollama::{DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS};
use gapscope_synthesizer::SynthesizerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Classification settings
    pub pipeline: PipelineConfig,

    /// Retrieval and gap synthesis settings
    pub synthesis: SynthesizerConfig,

    /// Generation model settings
    pub llm: LlmSettings,

    /// Reference store settings
    pub store: StoreSettings,

    /// Raw model output audit trail
    pub audit: AuditSettings,
}

/// Generation model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Ollama endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Attempts per request
    pub max_retries: u32,

    /// Request timeout (seconds)
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,
}

/// Which embedding model vectors come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// Ollama `/api/embed`
    #[default]
    Ollama,
    /// Local hashed bag-of-words; no model server required
    Hashed,
}

/// Reference store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// SQLite file; defaults to `~/.gapscope/references.db`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Embedding backend
    pub embedder: EmbedderKind,

    /// Embedding model name (Ollama backend)
    pub embedding_model: String,

    /// Embedding vector length
    pub dimension: usize,
}

/// Raw model output audit trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    /// Append raw responses here; disabled when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `~/.gapscope/config.toml`
    /// is used if present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_toml(&fs::read_to_string(path)?)?
            }
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::from_toml(&fs::read_to_string(&path)?)?
                } else {
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.pipeline
            .validate()
            .map_err(|e| CliError::Config(format!("[pipeline] {}", e)))?;
        self.synthesis
            .validate()
            .map_err(|e| CliError::Config(format!("[synthesis] {}", e)))?;
        if self.llm.model.trim().is_empty() {
            return Err(CliError::Config("[llm] model must not be empty".to_string()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(CliError::Config("[llm] timeout_secs must be greater than 0".to_string()));
        }
        if self.store.dimension == 0 {
            return Err(CliError::Config("[store] dimension must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Resolved reference store path.
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store.path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("references.db")),
        }
    }
}

fn data_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".gapscope"))
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: "mistral".to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: None,
            embedder: EmbedderKind::Ollama,
            embedding_model: "all-minilm".to_string(),
            dimension: 384,
        }
    }
}
