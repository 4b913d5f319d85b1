//! Normalization of raw extracted text

/// Clean text produced by document extraction
///
/// Collapses runs of blank lines into one newline, collapses runs of spaces
/// and tabs into one space, drops form feeds and trims the ends.
///
/// # Examples
///
/// ```
/// use gapscope_classifier::clean_text;
///
/// assert_eq!(clean_text("  Scope:\n\n\n- Patch\t\tmonthly.\x0c "), "Scope:\n- Patch monthly.");
/// ```
pub fn clean_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev = None;

    for c in raw.chars() {
        match c {
            '\n' if prev == Some('\n') => continue,
            ' ' | '\t' if matches!(prev, Some(' ') | Some('\t')) => continue,
            ' ' | '\t' => {
                out.push(' ');
                prev = Some(' ');
                continue;
            }
            _ => {}
        }
        out.push(c);
        prev = Some(c);
    }

    out.replace('\x0c', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_collapsed() {
        assert_eq!(clean_text("a\n\n\n\nb\nc"), "a\nb\nc");
    }

    #[test]
    fn test_spaces_and_tabs_collapsed() {
        assert_eq!(clean_text("a \t \tb  c"), "a b c");
    }

    #[test]
    fn test_form_feed_removed() {
        assert_eq!(clean_text("page one\x0cpage two"), "page onepage two");
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n\t\n "), "");
    }
}
