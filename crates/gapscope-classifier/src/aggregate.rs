//! Merge per-statement classifications into per-domain chunks

use crate::config::AggregationOrder;
use crate::error::ClassifierError;
use gapscope_domain::{Classification, DomainChunk, Statement};
use tracing::debug;

/// Group classified statements by domain
///
/// Chunks are returned in the order their domain is first seen. Within a
/// chunk, statement texts are space-joined in the order classifications
/// are processed: as returned by the model for
/// [`AggregationOrder::Response`], or by ascending statement index for
/// [`AggregationOrder::Document`]. Subdomains keep first-seen order without
/// duplicates.
///
/// Every classification must reference an existing statement; callers
/// filter invalid ones first. A dangling index is reported as
/// [`ClassifierError::StatementOutOfRange`].
pub fn aggregate(
    statements: &[Statement],
    classifications: &[Classification],
    order: AggregationOrder,
) -> Result<Vec<DomainChunk>, ClassifierError> {
    let mut ordered: Vec<&Classification> = classifications.iter().collect();
    if order == AggregationOrder::Document {
        ordered.sort_by_key(|c| c.statement_index);
    }

    let mut chunks: Vec<DomainChunk> = Vec::new();
    for classification in ordered {
        let statement = classification
            .statement_index
            .checked_sub(1)
            .and_then(|i| statements.get(i))
            .ok_or(ClassifierError::StatementOutOfRange {
                index: classification.statement_index,
                count: statements.len(),
            })?;

        let label = classification.domain.label();
        let position = match chunks.iter().position(|c| c.domain == label) {
            Some(position) => position,
            None => {
                chunks.push(DomainChunk::new(label));
                chunks.len() - 1
            }
        };

        let chunk = &mut chunks[position];
        chunk.push_text(&statement.text);
        chunk.add_subdomain(&classification.subdomain);
    }

    debug!(
        "Aggregated {} classifications into {} domain chunks",
        classifications.len(),
        chunks.len()
    );
    Ok(chunks)
}
