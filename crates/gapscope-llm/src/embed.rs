//! Ollama Embedding Provider
//!
//! Calls `POST /api/embed` on a local Ollama instance. Requires an embedding
//! model to be pulled first (e.g. `ollama pull nomic-embed-text`).
//!
//! The reference index must be built with the same model and dimension that
//! queries are embedded with; a mismatched vector is rejected here rather than
//! silently producing meaningless neighbours.

use crate::ollama::{block_on, DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES};
use crate::LlmError;
use gapscope_domain::traits::EmbeddingModel;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default request timeout for embedding calls
pub const DEFAULT_EMBED_TIMEOUT_SECS: u64 = 30;

/// Embedding model served by Ollama
pub struct OllamaEmbedder {
    endpoint: String,
    model: String,
    dimension: usize,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    /// Create an embedder for `model`, expected to produce `dimension`-length vectors
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_EMBED_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            dimension,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create an embedder against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>, dimension: usize) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model, dimension)
    }

    /// Set the maximum number of attempts per request
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Embed one text
    ///
    /// Retries connection failures, 429 and 5xx responses with exponential
    /// backoff; any other HTTP status fails immediately.
    pub async fn embed_async(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let url = format!("{}/api/embed", self.endpoint);
        let body = EmbedRequest {
            model: &self.model,
            input: text,
        };

        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                warn!("Ollama embed failed (attempt {}), retrying in {:?}", attempt, delay);
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&url).json(&body).send().await {
                Ok(response) => response,
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!(
                        "Ollama connection error (is Ollama running at {}?): {}",
                        self.endpoint, e
                    )));
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                let parsed: EmbedResponse = response
                    .json()
                    .await
                    .map_err(|e| LlmError::InvalidResponse(format!("Bad embed response: {}", e)))?;
                return self.first_vector(parsed);
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(LlmError::ModelNotAvailable(self.model.clone()));
            }

            let text = response.text().await.unwrap_or_default();
            let error = LlmError::Communication(format!("Ollama API error {}: {}", status, text));
            if status.as_u16() == 429 || status.is_server_error() {
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Ollama embedding failed after retries".to_string())))
    }

    fn first_vector(&self, response: EmbedResponse) -> Result<Vec<f32>, LlmError> {
        let vector = response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("missing embeddings array".to_string()))?;

        if vector.len() != self.dimension {
            return Err(LlmError::InvalidResponse(format!(
                "expected {}-dimensional embedding from {}, got {}",
                self.dimension,
                self.model,
                vector.len()
            )));
        }
        debug!("Embedded {} dims with {}", vector.len(), self.model);
        Ok(vector)
    }
}

impl EmbeddingModel for OllamaEmbedder {
    type Error = LlmError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        if text.trim().is_empty() {
            return Err(LlmError::InvalidResponse("cannot embed empty text".to_string()));
        }
        block_on(self.embed_async(text))?
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = OllamaEmbedder::default_endpoint("nomic-embed-text", 768).unwrap();
        assert_eq!(embedder.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(embedder.dimension(), 768);
        assert_eq!(embedder.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_first_vector_checks_dimension() {
        let embedder = OllamaEmbedder::default_endpoint("nomic-embed-text", 3).unwrap();

        let ok = embedder.first_vector(EmbedResponse {
            embeddings: vec![vec![0.1, 0.2, 0.3]],
        });
        assert_eq!(ok.unwrap(), vec![0.1, 0.2, 0.3]);

        let wrong = embedder.first_vector(EmbedResponse {
            embeddings: vec![vec![0.1, 0.2]],
        });
        assert!(matches!(wrong, Err(LlmError::InvalidResponse(_))));

        let empty = embedder.first_vector(EmbedResponse { embeddings: vec![] });
        assert!(matches!(empty, Err(LlmError::InvalidResponse(_))));
    }

    #[test]
    fn test_empty_text_rejected_without_request() {
        let embedder = OllamaEmbedder::new("http://127.0.0.1:9", "nomic-embed-text", 768).unwrap();
        assert!(embedder.embed("   ").is_err());
    }

    #[test]
    fn test_unreachable_endpoint_is_communication_error() {
        let embedder = OllamaEmbedder::new("http://127.0.0.1:9", "nomic-embed-text", 768)
            .unwrap()
            .with_max_retries(1);
        let result = embedder.embed("patch monthly");
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
