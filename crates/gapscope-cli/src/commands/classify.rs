//! Classify command implementation.

use crate::cli::DocumentArgs;
use crate::config::Config;
use crate::context;
use crate::error::Result;
use crate::output::Formatter;
use crate::source::load_document;
use gapscope_classifier::build_chunker;
use gapscope_domain::DomainChunk;

/// Execute the classify command.
pub fn execute_classify(args: DocumentArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let chunks = classify_document(&args, config, &context::audit(config))?;
    if chunks.is_empty() {
        eprintln!("{}", formatter.warning("No domain chunks were produced"));
    }
    println!("{}", formatter.chunks(&chunks)?);
    Ok(())
}

/// Extract a document and split it into domain chunks.
pub(crate) fn classify_document(
    args: &DocumentArgs,
    config: &Config,
    audit: &context::SharedAudit,
) -> Result<Vec<DomainChunk>> {
    let text = load_document(&args.document)?;
    let chunker = build_chunker(context::llm(config)?, audit.clone(), config.pipeline.clone())?;
    Ok(chunker.chunk(&text)?)
}
