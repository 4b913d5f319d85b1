//! Deterministic sentence and bullet segmentation
//!
//! No model is involved. Each input line is one of:
//!
//! - a **bullet** (starts with a bullet glyph): emitted whole, never split
//!   further, with every leading glyph removed
//! - a **prose line**: split after `.`, `!` or `?` followed by whitespace
//!
//! A prose line that is a single sentence ending with `:` is a section
//! heading and is discarded. Bullets and sentences within longer lines are
//! kept even when they end with `:`. Indices run from 1 across the whole
//! output.

use gapscope_domain::Statement;

/// Recognised bullet glyphs. `â€¢` is `•` decoded with the wrong charset,
/// which PDF extraction produces regularly.
const BULLET_GLYPHS: &[&str] = &["â€¢", "•", "●", "▪", "◦", "‣", "-", "*"];

/// Split cleaned text into ordered statements
///
/// # Examples
///
/// ```
/// use gapscope_classifier::segment;
///
/// let statements = segment("Patch Management:\n- Systems must be updated monthly.\nAccess Control:\nOnly admins may access production.");
/// assert_eq!(statements.len(), 2);
/// assert_eq!(statements[0].text, "Systems must be updated monthly.");
/// assert_eq!(statements[1].index, 2);
/// ```
pub fn segment(text: &str) -> Vec<Statement> {
    let mut texts: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (rest, bulleted) = strip_bullets(line);
        if bulleted {
            texts.push(rest);
            continue;
        }

        let sentences = split_sentences(line);
        if is_heading(&sentences) {
            continue;
        }
        texts.extend(sentences.into_iter().map(|s| strip_bullets(s).0));
    }

    texts
        .into_iter()
        .filter(|t| !t.is_empty())
        .enumerate()
        .map(|(i, t)| Statement::new(i + 1, t))
        .collect()
}

/// Remove all leading bullet glyphs and whitespace
///
/// Returns the trimmed remainder and whether any glyph was removed.
fn strip_bullets(mut s: &str) -> (&str, bool) {
    let mut stripped = false;
    loop {
        let trimmed = s.trim_start();
        match BULLET_GLYPHS.iter().find(|g| trimmed.starts_with(**g)) {
            Some(glyph) => {
                s = &trimmed[glyph.len()..];
                stripped = true;
            }
            None => return (trimmed.trim_end(), stripped),
        }
    }
}

fn is_heading(sentences: &[&str]) -> bool {
    matches!(sentences, [only] if only.ends_with(':'))
}

/// Split one line after sentence-final punctuation followed by whitespace
fn split_sentences(line: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut chars = line.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let Some(&(next_i, next)) = chars.peek() else {
            break;
        };
        if next.is_whitespace() {
            parts.push(line[start..next_i].trim());
            start = next_i;
        }
    }

    parts.push(line[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}
