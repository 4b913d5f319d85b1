//! Embedding Model for Text Vectorization
//!
//! Reference controls and policy chunks are compared by cosine similarity of
//! their embeddings. The real model is an external collaborator (see
//! `gapscope_llm::OllamaEmbedder`); this module provides a deterministic
//! stand-in so ingestion and retrieval can run without one.
//!
//! # Examples
//!
//! ```rust
//! use gapscope_store::embedding::MockEmbeddingModel;
//! use gapscope_domain::traits::EmbeddingModel;
//!
//! let model = MockEmbeddingModel::new(384);
//! let embedding = model.embed("Systems must be patched monthly").unwrap();
//! assert_eq!(embedding.len(), 384);
//!
//! // Same text always produces same embedding
//! assert_eq!(embedding, model.embed("Systems must be patched monthly").unwrap());
//! ```

use gapscope_domain::traits::EmbeddingModel;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model inference error
    #[error("Model inference failed: {0}")]
    InferenceFailed(String),
}

/// Deterministic hashed bag-of-words embedding
///
/// Each lower-cased alphanumeric token is hashed into a few signed buckets,
/// and the vector is normalized to unit length. The result is:
///
/// - **Deterministic**: same text, same vector
/// - **Normalized**: suitable for cosine distance
/// - **Lexically aware**: texts sharing words are closer than texts that don't
///
/// It carries no semantics beyond word overlap.
#[derive(Debug, Clone)]
pub struct MockEmbeddingModel {
    dimension: usize,
}

/// Buckets each token is spread over
const PROJECTIONS: u64 = 4;

impl MockEmbeddingModel {
    /// Create a new mock embedding model
    ///
    /// # Parameters
    ///
    /// - `dimension`: The embedding dimension (e.g., 384 for all-MiniLM-L6-v2)
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash_with_seed(token: &str, seed: u64) -> u64 {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        seed.hash(&mut hasher);
        hasher.finish()
    }
}

impl EmbeddingModel for MockEmbeddingModel {
    type Error = EmbeddingError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();

        if tokens.is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let mut embedding = vec![0.0f32; self.dimension];
        for token in &tokens {
            for seed in 0..PROJECTIONS {
                let hash = Self::hash_with_seed(token, seed);
                let bucket = (hash % self.dimension as u64) as usize;
                let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
                embedding[bucket] += sign;
            }
        }

        // Normalize to unit length for cosine similarity
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude == 0.0 {
            // Every bucket cancelled out; fall back to a fixed axis
            embedding[0] = 1.0;
        } else {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Calculate cosine similarity between two embedding vectors
///
/// Returns a value in `[-1, 1]`; `0.0` when either vector has zero
/// magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

/// Cosine distance, `1 - cosine_similarity`, bounded in `[0, 2]`
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}
