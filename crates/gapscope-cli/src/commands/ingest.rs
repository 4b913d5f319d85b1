//! Ingest command implementation.

use crate::cli::IngestArgs;
use crate::config::Config;
use crate::context;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use gapscope_store::{ingest, load_corpus};

/// Execute the ingest command.
pub fn execute_ingest(args: IngestArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let entries = load_corpus(&args.corpus)?;
    if entries.is_empty() {
        return Err(CliError::InvalidInput(format!(
            "{} contains no reference controls",
            args.corpus.display()
        )));
    }

    let path = config.store_path()?;
    eprintln!("{}", formatter.info(&format!("Reference store: {}", path.display())));
    let store = context::open_store(config)?;
    let embedder = context::embedder(config)?;
    let summary = ingest(&store, &embedder, entries)?;

    println!("{}", formatter.ingest_summary(&summary, store.len()?)?);
    Ok(())
}
