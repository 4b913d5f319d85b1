//! Infer command implementation.

use crate::cli::InferArgs;
use crate::config::Config;
use crate::context;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::source::{load_document, prepare_text};
use gapscope_classifier::infer_domain;

/// Execute the infer command.
pub fn execute_infer(args: InferArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let text = match (&args.text, &args.file) {
        (Some(text), _) => prepare_text(text)?,
        (None, Some(path)) => load_document(path)?,
        (None, None) => {
            return Err(CliError::InvalidInput("Must specify either --text or --file".to_string()))
        }
    };

    let llm = context::llm(config)?;
    let audit = context::audit(config);
    let inference = infer_domain(llm.as_ref(), audit.as_ref(), &text)?;

    println!("{}", formatter.inference(&inference)?);
    Ok(())
}
