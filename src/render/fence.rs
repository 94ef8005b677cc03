//! Fenced code block structure checks
//!
//! CommonMark lets an unclosed fence run to the end of the document, which
//! silently swallows the rest of a post. We treat that as malformed input.

use lazy_static::lazy_static;
use regex::Regex;

use super::RenderError;

lazy_static! {
    static ref FENCE: Regex = Regex::new(r"^( {0,3})(`{3,}|~{3,})(.*)$").unwrap();
}

struct OpenFence {
    line: usize,
    marker: char,
    len: usize,
    text: String,
}

/// Fail with [`RenderError::UnterminatedFence`] if a fence never closes
pub fn check_fences(markdown: &str) -> Result<(), RenderError> {
    let mut open: Option<OpenFence> = None;

    for (index, line) in markdown.lines().enumerate() {
        let Some(caps) = FENCE.captures(line) else {
            continue;
        };
        let run = &caps[2];
        let rest = &caps[3];
        let marker = run.chars().next().unwrap_or('`');
        let len = run.chars().count();

        match &open {
            None => {
                // Backtick info strings may not contain backticks
                if marker == '`' && rest.contains('`') {
                    continue;
                }
                open = Some(OpenFence {
                    line: index + 1,
                    marker,
                    len,
                    text: line.trim().to_string(),
                });
            }
            Some(fence) => {
                if marker == fence.marker && len >= fence.len && rest.trim().is_empty() {
                    open = None;
                }
            }
        }
    }

    match open {
        Some(fence) => Err(RenderError::UnterminatedFence {
            line: fence.line,
            fence: fence.text,
        }),
        None => Ok(()),
    }
}
