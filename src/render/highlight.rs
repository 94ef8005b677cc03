//! Server-side syntax highlighting with syntect

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{
    highlighted_html_for_string, start_highlighted_html_snippet, styled_line_to_highlighted_html,
    IncludeBackground,
};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::RenderError;
use crate::helpers::html_escape;

/// Syntax highlighter for fenced code blocks
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
    line_numbers: bool,
}

impl Highlighter {
    /// Create a highlighter using one of syntect's bundled themes
    pub fn new(theme_name: &str, line_numbers: bool) -> Result<Self, RenderError> {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = theme_set.themes.remove(theme_name).ok_or_else(|| {
            let mut known: Vec<_> = theme_set.themes.keys().cloned().collect();
            known.sort();
            RenderError::Highlight(format!(
                "unknown theme {:?} (available: {})",
                theme_name,
                known.join(", ")
            ))
        })?;

        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            line_numbers,
        })
    }

    /// Highlight a code block
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let highlighted = if self.line_numbers {
            self.highlight_lines(code, syntax)
                .map(|lines| self.numbered_table(&lines))
        } else {
            highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme)
        };

        let body = match highlighted {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!("Highlighting {} failed, using plain text: {}", lang, e);
                format!("<pre><code>{}</code></pre>", html_escape(code))
            }
        };

        let lang = html_escape(lang);
        format!(
            r#"<figure class="highlight {lang}" data-lang="{lang}">{}</figure>"#,
            body
        )
    }

    /// One HTML fragment per source line, newlines removed
    fn highlight_lines(
        &self,
        code: &str,
        syntax: &SyntaxReference,
    ) -> Result<Vec<String>, syntect::Error> {
        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        LinesWithEndings::from(code)
            .map(|line| {
                let regions = highlighter.highlight_line(line, &self.syntax_set)?;
                let html = styled_line_to_highlighted_html(&regions, IncludeBackground::No)?;
                Ok(html.replace(['\n', '\r'], ""))
            })
            .collect()
    }

    /// Line-number gutter next to the highlighted lines, one row per line
    fn numbered_table(&self, lines: &[String]) -> String {
        let (pre_open, _) = start_highlighted_html_snippet(&self.theme);

        let gutter: Vec<String> = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect();

        format!(
            r#"<table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}{}</pre></td></tr></table>"#,
            gutter.join("\n"),
            pre_open.trim_end(),
            lines.join("\n")
        )
    }
}
