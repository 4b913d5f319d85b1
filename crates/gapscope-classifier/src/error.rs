//! Error types for the classifier

use thiserror::Error;

/// Errors that can occur while turning text into domain chunks
///
/// Malformed model output is not an error: it degrades to an empty result.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// No usable text, or no statements after segmentation
    #[error("Input contains no usable policy text")]
    EmptyInput,

    /// Text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// A classification points past the end of the statement list
    #[error("Statement index {index} out of range (1..={count})")]
    StatementOutOfRange {
        /// Offending 1-based index
        index: usize,
        /// Number of statements available
        count: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
