//! Gapscope Synthesizer
//!
//! Gap analysis for classified domain chunks.
//!
//! # Architecture
//!
//! ```text
//! DomainChunk ─→ Analyzer ─┬→ Retriever ─→ ReferenceIndex (+ EmbeddingModel)
//!                          └→ GapSynthesizer ─→ LlmProvider
//!                                   │
//!                                   ↓
//!                      GapReport ─→ format_report
//! ```
//!
//! Retrieval never fails because the corpus is empty; zero references is a
//! valid, low-confidence input to synthesis. A response without a usable
//! JSON object becomes a failed [`GapOutcome`] for its subdomain only.
//!
//! # Example Usage
//!
//! ```
//! use gapscope_synthesizer::{reference_block, GapSynthesizer, GapOutcome};
//! use gapscope_llm::MockProvider;
//! use std::sync::Arc;
//!
//! let llm = MockProvider::new(r#"{"gap_analysis": [{"gap_id": "GAP-1", "description": "No SLA"}]}"#);
//! let synthesizer = GapSynthesizer::new(Arc::new(llm), 5);
//!
//! let outcome = synthesizer
//!     .synthesize("Patch Management", "Patch Management", "Patch monthly.", &[])
//!     .unwrap();
//! assert!(matches!(outcome, GapOutcome::Completed(_)));
//! assert!(reference_block(&[]).starts_with("No relevant"));
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
mod error;
mod gap;
mod prompt;
mod report;
mod retriever;
mod types;

pub use analyzer::Analyzer;
pub use config::{RetrievalMode, SynthesizerConfig};
pub use error::SynthesizerError;
pub use gap::{GapSynthesizer, GAP_STAGE, PARSE_FAILURE};
pub use prompt::{gap_prompt, reference_block, NO_REFERENCES};
pub use report::{format_chunk_listing, format_outcome, format_report, CHUNK_PREVIEW_CHARS};
pub use retriever::{similarity, Retriever};
pub use types::{
    DomainAnalysis, Gap, GapAnalysis, GapFailure, GapOutcome, GapReport, GapResult, ReferenceUsed,
    RevisedPolicy, Roadmap, RoadmapAction,
};
