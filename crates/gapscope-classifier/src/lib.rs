//! Gapscope Classifier
//!
//! Turns cleaned policy text into per-domain chunks.
//!
//! # Architecture
//!
//! ```text
//! text → segment → BatchClassifier → aggregate ─┐
//!                                               ├→ Vec<DomainChunk>
//! text → DocumentChunker ───────────────────────┘
//! ```
//!
//! Both strategies sit behind [`DomainChunker`]; [`build_chunker`] picks one
//! from [`PipelineConfig::strategy`]. Model output is recovered with
//! `gapscope_llm::extract_structured` and checked against the taxonomy with
//! the configured [`gapscope_domain::ValidationMode`]. Malformed output
//! degrades to an empty result; only empty input, oversized input and model
//! call failures are errors.
//!
//! # Example Usage
//!
//! ```
//! use gapscope_classifier::{build_chunker, PipelineConfig};
//! use gapscope_llm::{MockProvider, NullAudit};
//! use std::sync::Arc;
//!
//! let llm = MockProvider::new(
//!     r#"[{"sentence_id":1,"domain":"Patch Management","subdomain":"Patch Management"}]"#,
//! );
//! let chunker = build_chunker(Arc::new(llm), Arc::new(NullAudit), PipelineConfig::default()).unwrap();
//!
//! let chunks = chunker.chunk("- Systems must be updated monthly.").unwrap();
//! assert_eq!(chunks[0].domain, "Patch Management");
//! ```

#![warn(missing_docs)]

mod aggregate;
mod batch;
mod chunker;
mod config;
mod document;
mod error;
mod infer;
mod prompt;
mod segment;
mod text;

pub use aggregate::aggregate;
pub use batch::{BatchClassifier, BatchOutcome, BATCH_STAGE};
pub use chunker::{build_chunker, DomainChunker};
pub use config::{AggregationOrder, PipelineConfig, Strategy};
pub use document::{DocumentChunker, DOCUMENT_STAGE};
pub use error::ClassifierError;
pub use infer::{infer_domain, DomainInference, INFERENCE_STAGE};
pub use segment::segment;
pub use text::clean_text;

/// Reject blank or oversized input before any model call
pub(crate) fn check_input(text: &str, max_len: usize) -> Result<(), ClassifierError> {
    if text.trim().is_empty() {
        return Err(ClassifierError::EmptyInput);
    }
    let len = text.chars().count();
    if len > max_len {
        return Err(ClassifierError::TextTooLong(len, max_len));
    }
    Ok(())
}
