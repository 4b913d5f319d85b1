//! Analyze-domain command implementation.

use crate::cli::AnalyzeDomainArgs;
use crate::config::Config;
use crate::context;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::source::{load_document, prepare_text};

/// Execute the analyze-domain command.
pub async fn execute_analyze_domain(
    args: AnalyzeDomainArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let text = match (&args.text, &args.file) {
        (Some(text), _) => prepare_text(text)?,
        (None, Some(path)) => load_document(path)?,
        (None, None) => {
            return Err(CliError::InvalidInput("Must specify either --text or --file".to_string()))
        }
    };

    let analyzer = context::analyzer(config, context::llm(config)?, context::audit(config))?;
    let outcome = analyzer
        .analyze_domain(&args.domain, &text)
        .await
        .map_err(CliError::GapAnalysis)?;

    println!("{}", formatter.domain_outcome(&args.domain, &outcome)?);
    Ok(())
}
