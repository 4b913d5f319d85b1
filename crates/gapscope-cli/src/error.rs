//! Error types for the CLI application.

use gapscope_classifier::ClassifierError;
use gapscope_llm::LlmError;
use gapscope_store::StoreError;
use gapscope_synthesizer::SynthesizerError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Document text could not be extracted
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Model collaborator error
    #[error("{0}")]
    Llm(#[from] LlmError),

    /// Reference store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Classification error
    #[error("Classification error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Synthesizer setup error
    #[error("{0}")]
    Synthesizer(#[from] SynthesizerError),

    /// Single-domain gap analysis failed
    #[error("Gap analysis failed\n{0}")]
    GapAnalysis(SynthesizerError),
}
