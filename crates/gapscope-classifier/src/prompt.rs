//! Prompts for classification, chunking and domain inference

use gapscope_domain::{Domain, Statement, SUBDOMAINS};

/// Render statements as a numbered list, `1. text` per line
pub fn numbered_block(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(|s| format!("{}. {}", s.index, s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn domain_list() -> String {
    Domain::ALL
        .iter()
        .map(|d| format!("- {}", d.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn subdomain_list() -> String {
    SUBDOMAINS
        .iter()
        .map(|s| format!("- {}", s))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt asking for one domain/subdomain label per numbered statement
pub fn batch_prompt(statements: &[Statement]) -> String {
    let mut prompt = String::new();

    prompt.push_str(BATCH_INSTRUCTIONS);
    prompt.push_str("\n\nDomains (choose ONLY ONE of these, exact match):\n");
    prompt.push_str(&domain_list());
    prompt.push_str("\n\nIMPORTANT:\n");
    prompt.push_str("- Domain must be EXACTLY one of the four above\n");
    prompt.push_str("- Subdomain must be chosen from the allowed list\n");
    prompt.push_str("- NEVER use a subdomain as a domain\n\n");
    prompt.push_str("Allowed Subdomains (use exact wording):\n");
    prompt.push_str(&subdomain_list());
    prompt.push_str("\n\nSentences:\n");
    prompt.push_str(&numbered_block(statements));
    prompt.push_str("\n\n");
    prompt.push_str(BATCH_OUTPUT_FORMAT);

    prompt
}

/// Prompt asking the model to partition a whole document into domains
pub fn document_prompt(policy_text: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(DOCUMENT_INSTRUCTIONS);
    prompt.push_str("\n\nDomains:\n");
    prompt.push_str(&domain_list());
    prompt.push_str("\n\nAllowed Subdomains (use exact wording):\n");
    prompt.push_str(&subdomain_list());
    prompt.push_str("\n\nPolicy Text:\n---\n");
    prompt.push_str(policy_text);
    prompt.push_str("\n---\n\n");
    prompt.push_str("Return the result as JSON ONLY, one key per domain, using the exact domain labels:\n{\n");

    let entries: Vec<String> = Domain::ALL
        .iter()
        .map(|d| format!("  \"{}\": {{\n    \"text\": [],\n    \"subdomains\": []\n  }}", d.label()))
        .collect();
    prompt.push_str(&entries.join(",\n"));
    prompt.push_str("\n}\n");

    prompt
}

/// Prompt asking for the single best domain/subdomain of a text
pub fn inference_prompt(policy_text: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are a cybersecurity policy analysis system.\n\n");
    prompt.push_str("Identify the ONE domain and ONE subdomain that best describe the policy text below.\n\n");
    prompt.push_str("Domains:\n");
    prompt.push_str(&domain_list());
    prompt.push_str("\n\nAllowed Subdomains (use exact wording):\n");
    prompt.push_str(&subdomain_list());
    prompt.push_str("\n\nPolicy Text:\n---\n");
    prompt.push_str(policy_text);
    prompt.push_str("\n---\n\n");
    prompt.push_str(
        "Return JSON ONLY:\n{\n  \"domain\": \"<domain>\",\n  \"subdomain\": \"<subdomain>\",\n  \"confidence\": <0.0-1.0>\n}\n",
    );

    prompt
}

const BATCH_INSTRUCTIONS: &str = "You are a cybersecurity policy classification system.

For EACH sentence below:
- Assign ONE domain
- Assign ONE subdomain
- Do NOT omit any sentence
- Do NOT merge sentences";

const BATCH_OUTPUT_FORMAT: &str = r#"Return JSON ONLY in the following format:
[
  {
    "sentence_id": 1,
    "domain": "<domain>",
    "subdomain": "<subdomain>"
  }
]"#;

const DOCUMENT_INSTRUCTIONS: &str = "You are a cybersecurity policy analysis system.

Read the organizational policy text below and group its content into the
four domains listed.

Instructions:
- Assign each sentence or paragraph to the most relevant domain
- Combine all related content under the same domain
- Ensure that ALL policy text is assigned to exactly ONE domain
- Do not invent content
- If a domain is not mentioned, leave it empty
- Do not explain your reasoning";
