//! Statements and the classifications that point at them

use crate::taxonomy::Domain;
use serde::{Deserialize, Serialize};

/// An atomic unit of policy text produced by segmentation
///
/// `index` is 1-based and stable within one segmentation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// 1-based position in the segmentation output
    pub index: usize,
    /// Trimmed, non-empty statement text
    pub text: String,
}

impl Statement {
    /// Create a new statement
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// A claim that one statement belongs to one domain/subdomain pair
///
/// References its statement by index only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// 1-based index of the classified statement
    pub statement_index: usize,
    /// Validated domain
    pub domain: Domain,
    /// Subdomain label as returned by the model
    pub subdomain: String,
}

impl Classification {
    /// Whether the referenced statement exists in a run of `statement_count` statements
    pub fn is_in_range(&self, statement_count: usize) -> bool {
        self.statement_index >= 1 && self.statement_index <= statement_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range() {
        let c = Classification {
            statement_index: 2,
            domain: Domain::RiskManagement,
            subdomain: "Risk Assessment Policy".to_string(),
        };
        assert!(c.is_in_range(2));
        assert!(!c.is_in_range(1));
    }

    #[test]
    fn test_zero_index_out_of_range() {
        let c = Classification {
            statement_index: 0,
            domain: Domain::Isms,
            subdomain: "Planning Policy".to_string(),
        };
        assert!(!c.is_in_range(5));
    }
}
