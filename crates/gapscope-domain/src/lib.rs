//! Gapscope Domain Layer
//!
//! Value types and collaborator traits shared by every other crate.
//!
//! ## Key Concepts
//!
//! - **Domain / Subdomain**: the fixed taxonomy every classification is checked against
//! - **Statement**: one atomic, 1-indexed unit of policy text
//! - **Classification**: a claim that a statement belongs to a domain/subdomain pair
//! - **DomainChunk**: the aggregated text and subdomains for one domain
//! - **ReferenceRecord**: one control retrieved from the reference corpus
//!
//! ## Architecture
//!
//! Infrastructure (model, embeddings, vector index, document extraction) is
//! reached only through the traits in [`traits`]. Implementations live in
//! `gapscope-llm` and `gapscope-store`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod reference;
pub mod run;
pub mod statement;
pub mod taxonomy;
pub mod traits;

// Re-exports for convenience
pub use chunk::DomainChunk;
pub use reference::{ReferenceFilter, ReferenceMetadata, ReferenceRecord};
pub use run::RunId;
pub use statement::{Classification, Statement};
pub use taxonomy::{Domain, ValidationMode, SUBDOMAINS};
