//! Recover a JSON value from free-text model output
//!
//! Models wrap JSON in prose and code fences, or emit nothing usable at all.
//! [`extract_structured`] never fails: an unusable response is
//! [`Structured::Unparsed`], and every caller decides what that means for it.
//! Semantic shape checks are left to the caller.

use serde_json::{Map, Value};

/// Outcome of structured-output recovery
#[derive(Debug, Clone, PartialEq)]
pub enum Structured {
    /// A JSON value was recovered
    Parsed(Value),
    /// No JSON value could be recovered
    Unparsed,
}

impl Structured {
    /// Whether a value was recovered
    pub fn is_parsed(&self) -> bool {
        matches!(self, Structured::Parsed(_))
    }

    /// The recovered value if it is an array
    pub fn into_array(self) -> Option<Vec<Value>> {
        match self {
            Structured::Parsed(Value::Array(items)) => Some(items),
            _ => None,
        }
    }

    /// The recovered value if it is an object
    pub fn into_object(self) -> Option<Map<String, Value>> {
        match self {
            Structured::Parsed(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

/// Recover the first JSON value from model output
///
/// Order of attempts: code fences removed, then the whole trimmed text,
/// then each balanced `[...]` candidate, then each balanced `{...}`
/// candidate. The first candidate that parses wins.
///
/// # Examples
///
/// ```
/// use gapscope_llm::{extract_structured, Structured};
/// use serde_json::json;
///
/// let raw = "Here is the result:\n```json\n{\"a\":1}\n```\nThanks!";
/// assert_eq!(extract_structured(raw), Structured::Parsed(json!({"a": 1})));
/// assert_eq!(extract_structured("no json here"), Structured::Unparsed);
/// ```
pub fn extract_structured(raw: &str) -> Structured {
    let text = strip_code_fences(raw);
    let text = text.trim();
    if text.is_empty() {
        return Structured::Unparsed;
    }

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Structured::Parsed(value);
    }

    for (open, close) in [(b'[', b']'), (b'{', b'}')] {
        for candidate in balanced_candidates(text, open, close) {
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                return Structured::Parsed(value);
            }
        }
    }

    Structured::Unparsed
}

/// Remove every ```` ``` ```` marker and a directly following `json` tag
fn strip_code_fences(raw: &str) -> String {
    const FENCE: &str = "```";
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        if rest.len() >= 4 && rest.is_char_boundary(4) && rest[..4].eq_ignore_ascii_case("json") {
            rest = &rest[4..];
        }
    }
    out.push_str(rest);
    out
}

/// Every balanced `open ... close` substring, by start position
///
/// Brackets inside JSON string literals are ignored.
fn balanced_candidates(text: &str, open: u8, close: u8) -> impl Iterator<Item = &str> + '_ {
    let bytes = text.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(move |&(_, &b)| b == open)
        .filter_map(move |(start, _)| {
            matching_close(bytes, start, open, close).map(|end| &text[start..=end])
        })
}

fn matching_close(bytes: &[u8], start: usize, open: u8, close: u8) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(start + offset);
            }
        }
    }
    None
}
