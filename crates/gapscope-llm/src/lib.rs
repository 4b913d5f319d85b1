//! Gapscope LLM Provider Layer
//!
//! Model collaborators and everything needed to consume their output safely.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `OllamaEmbedder`: Ollama embeddings for the reference index
//!
//! # Output handling
//!
//! - [`structured`]: recovers a JSON value from free-text model output
//! - [`audit`]: append-only sinks for the raw responses
//!
//! # Examples
//!
//! ```
//! use gapscope_llm::MockProvider;
//! use gapscope_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod audit;
pub mod embed;
pub mod ollama;
pub mod structured;

use gapscope_domain::traits::LlmProvider as LlmProviderTrait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use audit::{AuditEntry, FileAudit, MemoryAudit, NullAudit};
pub use embed::OllamaEmbedder;
pub use ollama::OllamaProvider;
pub use structured::{extract_structured, Structured};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// A scripted response is chosen when its key occurs anywhere in the
/// prompt; the first matching key (in registration order) wins.
///
/// # Examples
///
/// ```
/// use gapscope_llm::MockProvider;
/// use gapscope_domain::traits::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt").unwrap(), "Fixed response");
///
/// // Responses keyed by a prompt fragment
/// let mut provider = MockProvider::default();
/// provider.add_response("Subdomain: Encryption", "{\"gap_analysis\": []}");
/// assert_eq!(
///     provider.generate("...\nSubdomain: Encryption\n...").unwrap(),
///     "{\"gap_analysis\": []}"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, Scripted)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Return `response` for any prompt containing `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push((fragment.into(), Scripted::Reply(response.into())));
    }

    /// Fail any prompt containing `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push((fragment.into(), Scripted::Fail));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Reset the recorded prompts
    pub fn reset_call_count(&self) {
        self.prompts.lock().unwrap().clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let responses = self.responses.lock().unwrap();
        let scripted = responses
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, scripted)| scripted.clone());

        match scripted {
            Some(Scripted::Reply(response)) => Ok(response),
            Some(Scripted::Fail) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}
