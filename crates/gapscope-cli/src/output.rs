//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use gapscope_classifier::DomainInference;
use gapscope_domain::DomainChunk;
use gapscope_store::IngestSummary;
use gapscope_synthesizer::{format_chunk_listing, format_report, DomainAnalysis, GapOutcome, GapReport};
use serde_json::{json, Map, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// Structured JSON
    Json,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format raw domain chunks.
    pub fn chunks(&self, chunks: &[DomainChunk]) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(format_chunk_listing(chunks)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&chunks_json(chunks))?),
        }
    }

    /// Format domain chunks together with their gap analysis.
    pub fn analysis(&self, chunks: &[DomainChunk], report: &GapReport) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(format_report(report)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "domain_chunks": chunks_json(chunks),
                "gap_analysis": report,
            }))?),
        }
    }

    /// Format a single-domain gap analysis.
    pub fn domain_outcome(&self, domain: &str, outcome: &GapOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Text => {
                let mut report = GapReport::new();
                report.push(domain, DomainAnalysis::Single(outcome.clone()));
                Ok(format_report(&report))
            }
            OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        }
    }

    /// Format a domain inference.
    pub fn inference(&self, inference: &DomainInference) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(inference)?),
            OutputFormat::Text => {
                let mut builder = Builder::default();
                builder.push_record(["Domain", "Subdomain", "Confidence"]);
                builder.push_record([
                    inference.domain.clone(),
                    inference.subdomain.clone(),
                    format!("{:.2}", inference.confidence),
                ]);
                Ok(self.table(builder))
            }
        }
    }

    /// Format the outcome of an ingestion run.
    pub fn ingest_summary(&self, summary: &IngestSummary, total: usize) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "inserted": summary.inserted,
                "duplicates": summary.duplicates,
                "blank": summary.blank,
                "total": total,
            }))?),
            OutputFormat::Text => {
                let mut builder = Builder::default();
                builder.push_record(["Inserted", "Duplicates", "Blank", "Total stored"]);
                builder.push_record([
                    summary.inserted.to_string(),
                    summary.duplicates.to_string(),
                    summary.blank.to_string(),
                    total.to_string(),
                ]);
                Ok(format!(
                    "{}\n{}",
                    self.success(&format!("Ingested {} reference controls", summary.inserted)),
                    self.table(builder)
                ))
            }
        }
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Chunks as `{domain: {text, subdomains}}`, in chunk order.
fn chunks_json(chunks: &[DomainChunk]) -> Value {
    let map: Map<String, Value> = chunks
        .iter()
        .map(|chunk| {
            (
                chunk.domain.clone(),
                json!({"text": chunk.text, "subdomains": chunk.subdomains}),
            )
        })
        .collect();
    Value::Object(map)
}
