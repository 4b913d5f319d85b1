//! Plain-text rendering of gap reports and domain chunks
//!
//! Pure formatting: identical input always renders byte-identical output.

use crate::types::{value_text, DomainAnalysis, GapOutcome, GapReport, GapResult, RevisedPolicy, Roadmap};
use gapscope_domain::DomainChunk;
use serde_json::Value;

const RULE_WIDTH: usize = 80;

/// Characters of each chunk shown by [`format_chunk_listing`]
pub const CHUNK_PREVIEW_CHARS: usize = 800;

fn rule(c: char) -> String {
    c.to_string().repeat(RULE_WIDTH)
}

/// Render a full gap report
pub fn format_report(report: &GapReport) -> String {
    let mut lines = vec![
        rule('='),
        "NIST COMPLIANCE GAP ANALYSIS REPORT".to_string(),
        rule('='),
        String::new(),
    ];

    for (domain, analysis) in report.iter() {
        lines.push(format!("\n{}", rule('=')));
        lines.push(format!("DOMAIN: {}", domain));
        lines.push(rule('='));

        match analysis {
            DomainAnalysis::Subdomains { subdomains_analysis } => {
                for outcome in subdomains_analysis {
                    format_outcome(outcome, &mut lines);
                }
            }
            DomainAnalysis::Single(outcome) => format_outcome(outcome, &mut lines),
        }
    }

    lines.push(format!("\n{}", rule('=')));
    lines.push("END OF REPORT".to_string());
    lines.push(rule('='));

    lines.join("\n")
}

/// Render one subdomain analysis
pub fn format_outcome(outcome: &GapOutcome, lines: &mut Vec<String>) {
    lines.push(format!("\nSubdomain: {}", outcome.subdomain()));
    lines.push(rule('-'));

    match outcome {
        GapOutcome::Failed(failure) => {
            lines.push(format!("ERROR: {}", failure.error));
        }
        GapOutcome::Completed(result) => {
            format_gaps(result, lines);
            if let Some(policy) = result.analysis.revised_policy.as_ref() {
                format_policy(policy, lines);
            }
            if let Some(roadmap) = result.analysis.implementation_roadmap.as_ref() {
                format_roadmap(roadmap, lines);
            }
            lines.push(String::new());
        }
    }
}

fn text_or(value: &Option<Value>, fallback: &str) -> String {
    value.as_ref().map_or_else(|| fallback.to_string(), value_text)
}

fn format_gaps(result: &GapResult, lines: &mut Vec<String>) {
    let gaps = &result.analysis.gap_analysis;
    if gaps.is_empty() {
        lines.push("\nNo gaps identified.".to_string());
        return;
    }

    lines.push(format!("\nGAP ANALYSIS ({} gaps identified):", gaps.len()));
    for gap in gaps {
        lines.push(format!(
            "\n  [{}] {}",
            text_or(&gap.gap_id, "N/A"),
            text_or(&gap.description, "")
        ));
        lines.push(format!("  NIST Reference: {}", text_or(&gap.nist_reference, "N/A")));
        lines.push(format!("  Severity: {}", text_or(&gap.severity, "N/A")));
        lines.push(format!("  Impact: {}", text_or(&gap.impact, "N/A")));
    }
}

fn format_policy(policy: &RevisedPolicy, lines: &mut Vec<String>) {
    if *policy == RevisedPolicy::default() {
        return;
    }

    lines.push("\nREVISED POLICY:".to_string());
    lines.push(format!("  {}", text_or(&policy.introduction, "")));
    if !policy.statements.is_empty() {
        lines.push("\n  Policy Statements:".to_string());
        for (i, statement) in policy.statements.iter().enumerate() {
            lines.push(format!("    {}. {}", i + 1, value_text(statement)));
        }
    }
}

fn format_roadmap(roadmap: &Roadmap, lines: &mut Vec<String>) {
    if *roadmap == Roadmap::default() {
        return;
    }

    lines.push("\nIMPLEMENTATION ROADMAP:".to_string());
    for (phase, actions) in roadmap.phases() {
        if actions.is_empty() {
            continue;
        }
        lines.push(format!("\n  {}:", phase));
        for action in actions {
            lines.push(format!("    • {}", text_or(&action.action, "")));
            lines.push(format!(
                "      Priority: {} | Timeline: {}",
                text_or(&action.priority, "N/A"),
                text_or(&action.timeline, "N/A")
            ));
        }
    }
}

/// Render raw domain chunks with a short preview of each
pub fn format_chunk_listing(chunks: &[DomainChunk]) -> String {
    let mut out = format!("TOTAL DOMAIN CHUNKS: {}\n", chunks.len());
    for chunk in chunks {
        let preview: String = chunk.text.chars().take(CHUNK_PREVIEW_CHARS).collect();
        out.push_str(&format!("\n==== {} ====\n{}\n", chunk.domain, preview));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gap, GapAnalysis, RoadmapAction};
    use serde_json::json;

    fn completed() -> GapOutcome {
        GapOutcome::Completed(GapResult {
            domain: "Patch Management".to_string(),
            subdomain: "Patch Management".to_string(),
            analysis: GapAnalysis {
                gap_analysis: vec![Gap {
                    gap_id: Some(json!("GAP-1")),
                    description: Some(json!("No patch SLA")),
                    severity: Some(json!(3)),
                    ..Gap::default()
                }],
                revised_policy: Some(RevisedPolicy {
                    introduction: Some(json!("Systems are patched on a schedule.")),
                    statements: vec![json!("Critical patches within 14 days.")],
                    compliance_notes: None,
                }),
                implementation_roadmap: Some(Roadmap {
                    short_term: vec![RoadmapAction {
                        action: Some(json!("Define SLA")),
                        priority: Some(json!("High")),
                        ..RoadmapAction::default()
                    }],
                    ..Roadmap::default()
                }),
                ..GapAnalysis::default()
            },
            references_count: 0,
            references_used: Vec::new(),
        })
    }

    #[test]
    fn test_completed_analysis_layout() {
        let mut lines = Vec::new();
        format_outcome(&completed(), &mut lines);
        let text = lines.join("\n");

        let dashes = rule('-');
        let expected = [
            "\nSubdomain: Patch Management",
            dashes.as_str(),
            "\nGAP ANALYSIS (1 gaps identified):",
            "\n  [GAP-1] No patch SLA",
            "  NIST Reference: N/A",
            "  Severity: 3",
            "  Impact: N/A",
            "\nREVISED POLICY:",
            "  Systems are patched on a schedule.",
            "\n  Policy Statements:",
            "    1. Critical patches within 14 days.",
            "\nIMPLEMENTATION ROADMAP:",
            "\n  SHORT-TERM (0-3 months):",
            "    • Define SLA",
            "      Priority: High | Timeline: N/A",
            "",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn test_error_short_circuits() {
        let mut lines = Vec::new();
        format_outcome(
            &GapOutcome::failed("Risk Management", "Risk Management", "parse failure", Some("{".into())),
            &mut lines,
        );
        assert_eq!(lines.last().unwrap(), "ERROR: parse failure");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_report_frame_and_nesting() {
        let mut report = GapReport::new();
        report.push(
            "Patch Management",
            DomainAnalysis::Subdomains {
                subdomains_analysis: vec![completed(), completed()],
            },
        );
        let text = format_report(&report);

        assert!(text.starts_with(&format!("{}\nNIST COMPLIANCE GAP ANALYSIS REPORT\n", rule('='))));
        assert!(text.contains("DOMAIN: Patch Management"));
        assert_eq!(text.matches("\nSubdomain: Patch Management").count(), 2);
        assert!(text.ends_with(&format!("END OF REPORT\n{}", rule('='))));
        assert_eq!(text, format_report(&report));
    }

    #[test]
    fn test_empty_analysis_says_no_gaps() {
        let outcome = GapOutcome::Completed(GapResult {
            domain: "Risk Management".to_string(),
            subdomain: "Risk Management".to_string(),
            analysis: GapAnalysis {
                revised_policy: Some(RevisedPolicy::default()),
                ..GapAnalysis::default()
            },
            references_count: 0,
            references_used: Vec::new(),
        });
        let mut lines = Vec::new();
        format_outcome(&outcome, &mut lines);
        assert!(lines.contains(&"\nNo gaps identified.".to_string()));
        assert!(!lines.iter().any(|l| l.contains("REVISED POLICY")));
    }

    #[test]
    fn test_chunk_listing_truncates_by_chars() {
        let mut chunk = DomainChunk::new("Patch Management");
        chunk.push_text(&"é".repeat(900));
        let listing = format_chunk_listing(&[chunk]);

        assert!(listing.starts_with("TOTAL DOMAIN CHUNKS: 1\n\n==== Patch Management ====\n"));
        assert_eq!(listing.matches('é').count(), CHUNK_PREVIEW_CHARS);
    }
}
