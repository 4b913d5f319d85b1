//! Analyze command implementation.

use crate::cli::DocumentArgs;
use crate::commands::classify::classify_document;
use crate::config::Config;
use crate::context;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the analyze command.
pub async fn execute_analyze(args: DocumentArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let audit = context::audit(config);
    let chunks = classify_document(&args, config, &audit)?;
    if chunks.is_empty() {
        eprintln!("{}", formatter.warning("No domain chunks were produced; nothing to analyze"));
    }

    let analyzer = context::analyzer(config, context::llm(config)?, audit)?;
    let report = analyzer.analyze_chunks(&chunks).await;

    println!("{}", formatter.analysis(&chunks, &report)?);
    Ok(())
}
