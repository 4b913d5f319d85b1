//! Error types for retrieval and gap synthesis

use thiserror::Error;

/// Errors that can occur while retrieving references or synthesizing gaps
///
/// An unparseable model response is not an error; it becomes a failed
/// [`crate::GapOutcome`].
#[derive(Error, Debug)]
pub enum SynthesizerError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Reference index error
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Embedding collaborator error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// No policy text to analyze
    #[error("Input contains no usable policy text")]
    EmptyInput,

    /// A required request field is blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Synthesis did not finish in time
    #[error("Synthesis timeout after {0}s")]
    Timeout(u64),

    /// A synthesis task failed to run to completion
    #[error("Synthesis task failed: {0}")]
    Task(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
