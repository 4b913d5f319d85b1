//! Command implementations.

pub mod analyze;
pub mod analyze_domain;
pub mod classify;
pub mod config;
pub mod infer;
pub mod ingest;

pub use self::analyze::execute_analyze;
pub use self::analyze_domain::execute_analyze_domain;
pub use self::classify::execute_classify;
pub use self::config::execute_config;
pub use self::infer::execute_infer;
pub use self::ingest::execute_ingest;
