//! Trait definitions for external interactions
//!
//! These traits define the boundaries between pipeline logic and
//! infrastructure. Implementations live in other crates.

use crate::reference::{ReferenceFilter, ReferenceRecord};
use std::path::Path;
use std::sync::Arc;

/// Trait for language model operations
///
/// Implemented by the infrastructure layer (gapscope-llm). Output carries no
/// format guarantee; callers recover structure themselves.
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// Trait for text-to-vector embedding
///
/// The same model (and dimension) must be used to build the reference index
/// and to embed queries against it.
pub trait EmbeddingModel {
    /// Error type for embedding
    type Error;

    /// Embed `text` into a fixed-length vector
    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error>;

    /// Length of every vector this model produces
    fn dimension(&self) -> usize;
}

/// Trait for the reference corpus index
///
/// Implemented by the infrastructure layer (gapscope-store). Distances
/// returned by `query_by_vector` must come from a cosine-style metric
/// bounded in `[0, 2]`, so that `1 - distance` lands in `[-1, 1]`.
pub trait ReferenceIndex {
    /// Error type for index operations
    type Error;

    /// Fetch up to `limit` records matching `filter`, in storage order
    fn query_by_filter(
        &self,
        filter: &ReferenceFilter,
        limit: usize,
    ) -> Result<Vec<ReferenceRecord>, Self::Error>;

    /// Fetch up to `limit` nearest records to `vector`, ascending distance
    fn query_by_vector(
        &self,
        vector: &[f32],
        filter: Option<&ReferenceFilter>,
        limit: usize,
    ) -> Result<Vec<(ReferenceRecord, f64)>, Self::Error>;
}

/// Append-only sink for raw model output
///
/// Recording never fails from the caller's point of view.
pub trait AuditSink {
    /// Append one raw response produced at `stage`
    fn record(&self, stage: &str, raw: &str);
}

impl<T: AuditSink + ?Sized> AuditSink for Arc<T> {
    fn record(&self, stage: &str, raw: &str) {
        (**self).record(stage, raw)
    }
}

/// Trait for turning a document into raw text
pub trait TextSource {
    /// Error type for extraction
    type Error;

    /// Extract all text from the document at `path`
    ///
    /// May return an empty string when nothing could be extracted.
    fn extract_text(&self, path: &Path) -> Result<String, Self::Error>;
}
