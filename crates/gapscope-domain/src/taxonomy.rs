//! The fixed domain/subdomain taxonomy and the shared validation gate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four top-level policy domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Domain {
    /// Information Security Management System
    #[serde(rename = "Information Security Management System (ISMS)")]
    Isms,
    /// Data Privacy and Security
    #[serde(rename = "Data Privacy and Security")]
    DataPrivacy,
    /// Patch Management
    #[serde(rename = "Patch Management")]
    PatchManagement,
    /// Risk Management
    #[serde(rename = "Risk Management")]
    RiskManagement,
}

impl Domain {
    /// All domains in prompt order
    pub const ALL: [Domain; 4] = [
        Domain::Isms,
        Domain::DataPrivacy,
        Domain::PatchManagement,
        Domain::RiskManagement,
    ];

    /// The exact label the model is asked to emit
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Isms => "Information Security Management System (ISMS)",
            Domain::DataPrivacy => "Data Privacy and Security",
            Domain::PatchManagement => "Patch Management",
            Domain::RiskManagement => "Risk Management",
        }
    }

    /// Resolve a label by exact match. No trimming, no case folding.
    ///
    /// # Examples
    ///
    /// ```
    /// use gapscope_domain::Domain;
    ///
    /// assert_eq!(Domain::from_label("Risk Management"), Some(Domain::RiskManagement));
    /// assert_eq!(Domain::from_label("risk management"), None);
    /// assert_eq!(Domain::from_label("Access Control Policy"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }
}

impl Domain {
    /// Resolve a key of a domain-keyed JSON object
    ///
    /// Accepts the full label, or the bare `ISMS` abbreviation models often
    /// use for the first domain.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ISMS" => Some(Domain::Isms),
            _ => Self::from_label(key),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Allowed subdomain labels, exact wording
pub const SUBDOMAINS: &[&str] = &[
    "Acceptable Use Of Information Technology Resources Policy",
    "Access Control Policy",
    "Account Management Access Control",
    "Auditing And Accountability Policy",
    "Authentication Tokens",
    "Computer Security Threat Response Policy",
    "Configuration Management Policy",
    "Contingency Planning Policy",
    "Cyber Incident Response",
    "Encryption",
    "Identification And Authentication Policy",
    "Incident Response Policy",
    "Information Classification",
    "Information Security Policy",
    "Information Security Risk Management",
    "Maintenance Policy",
    "Media Protection Policy",
    "Mobile Device Security",
    "Patch Management",
    "Personnel Security Policy",
    "Physical And Environmental Protection Policy",
    "Planning Policy",
    "Remote Access",
    "Risk Assessment Policy",
    "Sanitization Secure Disposal",
    "Secure Configuration",
    "Secure System Development Life Cycle",
    "Security Assessment And Authorization Policy",
    "Security Awareness And Training Policy",
    "Security Logging",
    "System And Communications Protection Policy",
    "System And Information Integrity Policy",
    "System And Services Acquisition Policy",
    "Vulnerability Scanning",
];

/// Whether `label` is one of [`SUBDOMAINS`] (exact match)
pub fn is_allowed_subdomain(label: &str) -> bool {
    SUBDOMAINS.contains(&label)
}

/// How strictly model-produced labels are checked against the taxonomy
///
/// Both classification strategies run their parsed output through the same
/// gate; they differ only in the mode they are configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Accept any domain and subdomain
    Off,
    /// Domain must be one of the four labels; subdomains unchecked
    DomainOnly,
    /// Domain and subdomains must both be in the taxonomy
    Strict,
}

impl Default for ValidationMode {
    fn default() -> Self {
        ValidationMode::DomainOnly
    }
}

impl ValidationMode {
    /// Whether a domain label passes this gate
    pub fn admits_domain(self, label: &str) -> bool {
        match self {
            ValidationMode::Off => true,
            ValidationMode::DomainOnly | ValidationMode::Strict => Domain::from_label(label).is_some(),
        }
    }

    /// Whether a subdomain label passes this gate
    pub fn admits_subdomain(self, label: &str) -> bool {
        match self {
            ValidationMode::Strict => is_allowed_subdomain(label),
            ValidationMode::Off | ValidationMode::DomainOnly => true,
        }
    }

    /// Drop subdomains this gate rejects, keeping order
    pub fn retain_subdomains(self, subdomains: Vec<String>) -> Vec<String> {
        subdomains
            .into_iter()
            .filter(|s| self.admits_subdomain(s))
            .collect()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn label() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::sample::select(SUBDOMAINS).prop_map(|s| s.to_string()),
            "[A-Za-z ]{1,16}",
        ]
    }

    proptest! {
        /// Property: retained subdomains are an ordered subsequence of the input
        #[test]
        fn test_retain_is_ordered_subsequence(labels in prop::collection::vec(label(), 0..12)) {
            for mode in [ValidationMode::Off, ValidationMode::DomainOnly, ValidationMode::Strict] {
                let kept = mode.retain_subdomains(labels.clone());
                let mut rest = labels.iter();
                for k in &kept {
                    prop_assert!(rest.any(|l| l == k));
                    prop_assert!(mode.admits_subdomain(k));
                }
            }
        }

        /// Property: only strict mode ever drops a subdomain
        #[test]
        fn test_lenient_modes_keep_everything(labels in prop::collection::vec(label(), 0..12)) {
            prop_assert_eq!(ValidationMode::Off.retain_subdomains(labels.clone()), labels.clone());
            prop_assert_eq!(ValidationMode::DomainOnly.retain_subdomains(labels.clone()), labels);
        }
    }
}
