//! Aggregated per-domain content

use serde::{Deserialize, Serialize};

/// The aggregated content for one domain within one document
///
/// Owns a copy of its text. `subdomains` holds distinct values in the order
/// they were first seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainChunk {
    /// Domain label
    pub domain: String,
    /// Statement texts joined by single spaces
    pub text: String,
    /// Distinct subdomains, insertion order
    pub subdomains: Vec<String>,
}

impl DomainChunk {
    /// Create an empty chunk for a domain
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            text: String::new(),
            subdomains: Vec::new(),
        }
    }

    /// Append one statement's text, space-separated
    pub fn push_text(&mut self, text: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(text);
    }

    /// Record a subdomain if it has not been seen yet
    pub fn add_subdomain(&mut self, subdomain: &str) {
        if !self.subdomains.iter().any(|s| s == subdomain) {
            self.subdomains.push(subdomain.to_string());
        }
    }

    /// Whether the chunk carries no text
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
