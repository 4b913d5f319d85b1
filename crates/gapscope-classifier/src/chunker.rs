//! One interface over both classification strategies

use crate::aggregate::aggregate;
use crate::batch::BatchClassifier;
use crate::config::{PipelineConfig, Strategy};
use crate::document::DocumentChunker;
use crate::error::ClassifierError;
use gapscope_domain::traits::{AuditSink, LlmProvider};
use gapscope_domain::DomainChunk;
use std::fmt::Display;
use std::sync::Arc;

/// Turns cleaned policy text into domain chunks
///
/// Chunks come back in first-seen domain order with non-blank text. Callers
/// do not need to know which strategy produced them.
pub trait DomainChunker {
    /// Partition `text` into domain chunks
    fn chunk(&self, text: &str) -> Result<Vec<DomainChunk>, ClassifierError>;
}

impl<L> DomainChunker for BatchClassifier<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    fn chunk(&self, text: &str) -> Result<Vec<DomainChunk>, ClassifierError> {
        let outcome = self.classify_batch(text)?;
        aggregate(
            &outcome.statements,
            &outcome.classifications,
            self.config().aggregation_order,
        )
    }
}

impl<L> DomainChunker for DocumentChunker<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    fn chunk(&self, text: &str) -> Result<Vec<DomainChunk>, ClassifierError> {
        self.chunk_document(text)
    }
}

/// Build the chunker selected by `config.strategy`
pub fn build_chunker<L>(
    llm: Arc<L>,
    audit: Arc<dyn AuditSink + Send + Sync>,
    config: PipelineConfig,
) -> Result<Box<dyn DomainChunker + Send + Sync>, ClassifierError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    config.validate().map_err(ClassifierError::Config)?;

    Ok(match config.strategy {
        Strategy::Batch => Box::new(BatchClassifier::new(llm, config).with_audit(audit)),
        Strategy::Document => Box::new(DocumentChunker::new(llm, config).with_audit(audit)),
    })
}
