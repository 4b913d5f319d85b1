//! Gapscope CLI - policy gap analysis against a reference control corpus.

use clap::Parser;
use gapscope_cli::cli::{ConfigAction, ConfigArgs};
use gapscope_cli::commands;
use gapscope_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> gapscope_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (log to stderr, RUST_LOG wins)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // `config init` must work before any config file exists
    let config = match &cli.command {
        Command::Config(ConfigArgs {
            action: ConfigAction::Init { .. },
        }) => Config::default(),
        _ => Config::load(cli.config.as_deref())?,
    };

    let formatter = Formatter::new(cli.format, !cli.no_color);

    match cli.command {
        Command::Ingest(args) => commands::execute_ingest(args, &config, &formatter)?,
        Command::Classify(args) => commands::execute_classify(args, &config, &formatter)?,
        Command::Analyze(args) => commands::execute_analyze(args, &config, &formatter).await?,
        Command::AnalyzeDomain(args) => {
            commands::execute_analyze_domain(args, &config, &formatter).await?
        }
        Command::Infer(args) => commands::execute_infer(args, &config, &formatter)?,
        Command::Config(args) => {
            commands::execute_config(args, &config, cli.config.as_deref(), &formatter)?
        }
    }

    Ok(())
}
