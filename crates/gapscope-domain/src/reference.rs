//! Records retrieved from the reference control corpus

use serde::{Deserialize, Serialize};

/// Metadata carried by every reference record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReferenceMetadata {
    /// Domain the control was filed under
    pub domain: String,
    /// Subdomain the control was filed under
    pub subdomain: String,
    /// Originating document
    pub source: String,
}

/// One read-only item from the reference corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Corpus identifier
    pub id: String,
    /// Control text
    pub text: String,
    /// Filing metadata
    pub metadata: ReferenceMetadata,
    /// `1 - distance`; present only for semantic-search results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// Equality filter over record metadata
///
/// Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceFilter {
    /// Required domain
    pub domain: Option<String>,
    /// Required subdomain
    pub subdomain: Option<String>,
}

impl ReferenceFilter {
    /// Filter on subdomain only
    pub fn subdomain(subdomain: impl Into<String>) -> Self {
        Self {
            domain: None,
            subdomain: Some(subdomain.into()),
        }
    }

    /// Add a domain constraint
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Whether the filter constrains nothing
    pub fn is_empty(&self) -> bool {
        self.domain.is_none() && self.subdomain.is_none()
    }

    /// Whether `metadata` satisfies every set constraint
    pub fn matches(&self, metadata: &ReferenceMetadata) -> bool {
        self.domain.as_deref().map_or(true, |d| d == metadata.domain)
            && self.subdomain.as_deref().map_or(true, |s| s == metadata.subdomain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ReferenceMetadata {
        ReferenceMetadata {
            domain: "Patch Management".to_string(),
            subdomain: "Vulnerability Scanning".to_string(),
            source: "nist-800-40.pdf".to_string(),
        }
    }

    #[test]
    fn test_empty_filter_matches_all() {
        assert!(ReferenceFilter::default().matches(&metadata()));
    }

    #[test]
    fn test_subdomain_filter() {
        assert!(ReferenceFilter::subdomain("Vulnerability Scanning").matches(&metadata()));
        assert!(!ReferenceFilter::subdomain("Encryption").matches(&metadata()));
    }

    #[test]
    fn test_domain_and_subdomain_filter() {
        let filter = ReferenceFilter::subdomain("Vulnerability Scanning").with_domain("Risk Management");
        assert!(!filter.matches(&metadata()));
    }

    #[test]
    fn test_similarity_omitted_when_absent() {
        let record = ReferenceRecord {
            id: "PM-1".to_string(),
            text: "Apply patches".to_string(),
            metadata: metadata(),
            similarity: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("similarity"));
    }
}
