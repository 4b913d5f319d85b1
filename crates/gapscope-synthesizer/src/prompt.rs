//! Prompt construction for gap synthesis

use gapscope_domain::ReferenceRecord;

/// Placeholder used when retrieval found nothing
pub const NO_REFERENCES: &str = "No relevant reference controls found for this subdomain.";

/// Render retrieved controls as labelled sections
///
/// Each section carries the record's id, source, domain, subdomain,
/// similarity (semantic retrieval only) and text.
pub fn reference_block(records: &[ReferenceRecord]) -> String {
    if records.is_empty() {
        return NO_REFERENCES.to_string();
    }

    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let meta = &record.metadata;
            let mut section = format!("--- Reference Control #{} ---\n", i + 1);
            section.push_str(&format!("ID: {}\n", record.id));
            section.push_str(&format!("Source: {}\n", or_placeholder(&meta.source, "Unknown")));
            section.push_str(&format!("Domain: {}\n", or_placeholder(&meta.domain, "N/A")));
            section.push_str(&format!("Subdomain: {}\n", or_placeholder(&meta.subdomain, "N/A")));
            if let Some(similarity) = record.similarity {
                section.push_str(&format!("Similarity: {:.4}\n", similarity));
            }
            section.push_str(&format!("\nText:\n{}\n", record.text));
            section
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

/// Build the gap analysis prompt for one subdomain
pub fn gap_prompt(domain: &str, subdomain: &str, policy_text: &str, references: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(GAP_INSTRUCTIONS);
    prompt.push_str("\n\n");

    prompt.push_str(&format!("Domain: {}\n", domain));
    prompt.push_str(&format!("Subdomain: {}\n\n", subdomain));

    prompt.push_str("Organization policy:\n");
    prompt.push_str("---\n");
    prompt.push_str(policy_text);
    prompt.push_str("\n---\n\n");

    prompt.push_str("Reference controls:\n");
    prompt.push_str("---\n");
    prompt.push_str(references);
    prompt.push_str("\n---\n\n");

    prompt.push_str(GAP_OUTPUT_FORMAT);
    prompt
}

const GAP_INSTRUCTIONS: &str = r#"You are a compliance analyst comparing an organization's security policy against reference controls.

Identify every requirement in the reference controls that the policy does not meet, meets only partially, or states too vaguely to audit. Base each gap on a specific reference control. If no reference controls are provided, rely on generally accepted practice for the subdomain and keep confidence low.

Then write a revised policy for this subdomain that closes the gaps, and a phased implementation roadmap."#;

const GAP_OUTPUT_FORMAT: &str = r#"Return ONLY a JSON object with this structure:
{
  "gap_analysis": [
    {
      "gap_id": "GAP-1",
      "description": "What is missing or weak",
      "nist_reference": "Control identifier",
      "severity": "High|Medium|Low",
      "impact": "Consequence of leaving the gap open"
    }
  ],
  "revised_policy": {
    "introduction": "Opening paragraph",
    "statements": ["Policy statement"],
    "compliance_notes": "How the revision maps to the reference controls"
  },
  "implementation_roadmap": {
    "short_term": [{"action": "Step", "timeline": "0-3 months", "priority": "High|Medium|Low", "resources": "What it takes"}],
    "mid_term": [],
    "long_term": []
  },
  "confidence": 0.0
}

confidence is a number between 0 and 1. Do not include any text outside the JSON object."#;
