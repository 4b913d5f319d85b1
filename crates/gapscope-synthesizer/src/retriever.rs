//! Reference control retrieval
//!
//! Two modes over the same [`ReferenceIndex`]:
//!
//! - exact: metadata equality filter, storage order, no similarity
//! - semantic: embed the query, nearest neighbours by cosine distance,
//!   `similarity = 1 - distance`
//!
//! An empty index or a filter that matches nothing is an empty list, not an
//! error. Only collaborator failures are errors.

use crate::error::SynthesizerError;
use gapscope_domain::traits::{EmbeddingModel, ReferenceIndex};
use gapscope_domain::{ReferenceFilter, ReferenceRecord};
use std::fmt::Display;
use std::sync::Arc;
use tracing::debug;

/// Fetches reference controls for gap synthesis
pub struct Retriever<I, E> {
    index: Arc<I>,
    embedder: Arc<E>,
}

impl<I, E> Clone for Retriever<I, E> {
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
            embedder: Arc::clone(&self.embedder),
        }
    }
}

impl<I, E> Retriever<I, E>
where
    I: ReferenceIndex,
    I::Error: Display,
    E: EmbeddingModel,
    E::Error: Display,
{
    /// Create a retriever over `index`, embedding queries with `embedder`
    pub fn new(index: Arc<I>, embedder: Arc<E>) -> Self {
        Self { index, embedder }
    }

    /// Controls filed under `subdomain` (and `domain`, if given)
    pub fn fetch_by_subdomain(
        &self,
        subdomain: &str,
        domain: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ReferenceRecord>, SynthesizerError> {
        let mut filter = ReferenceFilter::subdomain(subdomain);
        if let Some(domain) = domain {
            filter = filter.with_domain(domain);
        }
        self.fetch_by_filter(&filter, limit)
    }

    /// Controls matching `filter`, in storage order
    pub fn fetch_by_filter(
        &self,
        filter: &ReferenceFilter,
        limit: usize,
    ) -> Result<Vec<ReferenceRecord>, SynthesizerError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut records = self
            .index
            .query_by_filter(filter, limit)
            .map_err(|e| SynthesizerError::Retrieval(e.to_string()))?;
        records.truncate(limit);
        for record in &mut records {
            record.similarity = None;
        }

        debug!("Exact retrieval returned {} records for {:?}", records.len(), filter);
        Ok(records)
    }

    /// Nearest controls to `query`, optionally restricted to `subdomain`
    pub fn fetch_similar(
        &self,
        query: &str,
        subdomain: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ReferenceRecord>, SynthesizerError> {
        let filter = subdomain.map(ReferenceFilter::subdomain);
        self.fetch_similar_filtered(query, filter.as_ref(), limit)
    }

    /// Nearest controls to `query` among those matching `filter`
    ///
    /// Results are ordered by ascending distance. A blank query retrieves
    /// nothing and is never embedded.
    pub fn fetch_similar_filtered(
        &self,
        query: &str,
        filter: Option<&ReferenceFilter>,
        limit: usize,
    ) -> Result<Vec<ReferenceRecord>, SynthesizerError> {
        if limit == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let vector = self
            .embedder
            .embed(query)
            .map_err(|e| SynthesizerError::Embedding(e.to_string()))?;

        let mut hits = self
            .index
            .query_by_vector(&vector, filter, limit)
            .map_err(|e| SynthesizerError::Retrieval(e.to_string()))?;
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.truncate(limit);

        let records: Vec<ReferenceRecord> = hits
            .into_iter()
            .map(|(mut record, distance)| {
                record.similarity = Some(similarity(distance));
                record
            })
            .collect();

        debug!("Semantic retrieval returned {} records", records.len());
        Ok(records)
    }
}

/// Convert a cosine distance in `[0, 2]` to a similarity in `[-1, 1]`
pub fn similarity(distance: f64) -> f64 {
    1.0 - distance
}
