//! CLI command definitions and argument parsing.

use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gapscope - Find gaps between a security policy and reference controls.
#[derive(Debug, Parser)]
#[command(name = "gapscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "GAPSCOPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a reference control corpus into the store
    Ingest(IngestArgs),

    /// Split a policy document into domain chunks
    Classify(DocumentArgs),

    /// Classify a policy document and analyze every domain for gaps
    Analyze(DocumentArgs),

    /// Analyze one piece of policy text for a given domain
    AnalyzeDomain(AnalyzeDomainArgs),

    /// Ask the model which domain a text belongs to
    Infer(InferArgs),

    /// Show or initialize the configuration file
    Config(ConfigArgs),
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// JSON array of {id, text, domain, subdomain, source_file}
    pub corpus: PathBuf,
}

/// Arguments for commands that take a policy document.
#[derive(Debug, Parser)]
pub struct DocumentArgs {
    /// Policy document (PDF or plain text)
    pub document: PathBuf,
}

/// Arguments for the analyze-domain command.
#[derive(Debug, Parser)]
pub struct AnalyzeDomainArgs {
    /// Domain label the text belongs to
    #[arg(short, long)]
    pub domain: String,

    /// Policy text
    #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
    pub text: Option<String>,

    /// Read the policy text from a document
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the infer command.
#[derive(Debug, Parser)]
pub struct InferArgs {
    /// Text to classify
    #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
    pub text: Option<String>,

    /// Read the text from a document
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from(["gapscope", "--format", "json", "analyze", "policy.pdf"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Command::Analyze(args) => assert_eq!(args.document, PathBuf::from("policy.pdf")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_analyze_domain_requires_text_or_file() {
        assert!(Cli::try_parse_from(["gapscope", "analyze-domain", "--domain", "Risk Management"]).is_err());
        assert!(Cli::try_parse_from([
            "gapscope",
            "analyze-domain",
            "--domain",
            "Risk Management",
            "--text",
            "Risks are assessed.",
            "--file",
            "policy.txt",
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "gapscope",
            "analyze-domain",
            "-d",
            "Risk Management",
            "-t",
            "Risks are assessed.",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::AnalyzeDomain(_)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["gapscope", "classify", "policy.txt", "--verbose", "--no-color"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::try_parse_from(["gapscope", "config", "init", "--force"]).unwrap();
        match cli.command {
            Command::Config(ConfigArgs { action: ConfigAction::Init { force } }) => assert!(force),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
