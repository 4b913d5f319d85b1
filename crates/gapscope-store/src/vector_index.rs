//! HNSW Vector Index for Semantic Search
//!
//! In-memory nearest-neighbour index over reference-control embeddings. The
//! index is never persisted: SQLite is the source of truth and the index is
//! rebuilt from it whenever a store is opened.
//!
//! Points are keyed by the SQLite `rowid` of their row, so no separate id map
//! is kept. Distances are cosine distances (`DistCosine`), bounded in `[0, 2]`.
//!
//! # HNSW Parameters
//!
//! - **M**: Number of bi-directional links per node (default: 16)
//! - **efConstruction**: Candidate list size during construction (default: 200)
//! - **efSearch**: Candidate list size during search (default: 64, raised to `k`)

use hnsw_rs::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;

const DEFAULT_M: usize = 16;
const DEFAULT_EF_CONSTRUCTION: usize = 200;
const DEFAULT_MAX_ELEMENTS: usize = 100_000;

/// Default search-quality parameter
pub const DEFAULT_EF_SEARCH: usize = 64;

/// Errors that can occur during vector index operations
#[derive(Error, Debug)]
pub enum VectorIndexError {
    /// Invalid embedding dimension
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },

    /// Internal HNSW error
    #[error("HNSW error: {0}")]
    Internal(String),
}

/// A wrapper around HNSW for vector similarity search
///
/// # Examples
///
/// ```
/// use gapscope_store::vector_index::VectorIndex;
///
/// let index = VectorIndex::new(3);
/// index.add(7, &[1.0, 0.0, 0.0]).unwrap();
///
/// let hits = index.search(&[1.0, 0.0, 0.0], 1).unwrap();
/// assert_eq!(hits[0].0, 7);
/// ```
pub struct VectorIndex {
    dimension: usize,
    hnsw: Mutex<Hnsw<'static, f32, DistCosine>>,
    count: AtomicUsize,
}

fn new_hnsw() -> Hnsw<'static, f32, DistCosine> {
    let nb_layer = 16.min((DEFAULT_MAX_ELEMENTS as f32).ln().trunc() as usize);
    Hnsw::<'static, f32, DistCosine>::new(
        DEFAULT_M,
        DEFAULT_MAX_ELEMENTS,
        nb_layer,
        DEFAULT_EF_CONSTRUCTION,
        DistCosine {},
    )
}

impl VectorIndex {
    /// Create an empty index for `dimension`-length vectors
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            hnsw: Mutex::new(new_hnsw()),
            count: AtomicUsize::new(0),
        }
    }

    /// Expected vector length
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), VectorIndexError> {
        if vector.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Add a point under `row_id`
    pub fn add(&self, row_id: usize, embedding: &[f32]) -> Result<(), VectorIndexError> {
        self.check_dimension(embedding)?;

        let embedding_vec = embedding.to_vec();
        let hnsw = self
            .hnsw
            .lock()
            .map_err(|_| VectorIndexError::Internal("index lock poisoned".to_string()))?;
        hnsw.insert((&embedding_vec, row_id));
        self.count.fetch_add(1, Ordering::Relaxed);

        Ok(())
    }

    /// Search for the `k` nearest points to `query`
    ///
    /// Returns `(row_id, distance)` pairs in ascending distance. An empty
    /// index yields an empty list.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, VectorIndexError> {
        self.check_dimension(query)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let hnsw = self
            .hnsw
            .lock()
            .map_err(|_| VectorIndexError::Internal("index lock poisoned".to_string()))?;

        let mut hits: Vec<(usize, f32)> = hnsw
            .search(query, k, DEFAULT_EF_SEARCH.max(k))
            .into_iter()
            .map(|neighbour| (neighbour.d_id, neighbour.distance))
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.truncate(k);

        Ok(hits)
    }

    /// Number of points in the index
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every point
    pub fn clear(&self) {
        let mut hnsw = self.hnsw.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *hnsw = new_hnsw();
        self.count.store(0, Ordering::Relaxed);
    }
}
