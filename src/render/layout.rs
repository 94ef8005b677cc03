//! Page layout: wraps a rendered body in a complete HTML document

use std::fmt::Write;

use super::PageMeta;
use crate::config::SiteConfig;
use crate::helpers::{html_escape, meta_generator, strip_html, truncate};

/// Length of the `<meta name="description">` text
const DESCRIPTION_LEN: usize = 160;

/// Format a date with the configured strftime pattern, falling back to ISO dates
pub fn format_date(meta: &PageMeta, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", meta.date.format(format)).is_err() {
        out.clear();
        out.push_str(&meta.date.format("%Y-%m-%d").to_string());
    }
    out
}

/// Render the full post page
pub fn post_page(config: &SiteConfig, meta: &PageMeta, body_html: &str) -> String {
    let title = html_escape(&meta.title);
    let description = meta
        .excerpt
        .as_deref()
        .map(strip_html)
        .unwrap_or_else(|| strip_html(body_html));
    let description = truncate(
        &description.split_whitespace().collect::<Vec<_>>().join(" "),
        DESCRIPTION_LEN,
        None,
    );

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n");
    let _ = writeln!(html, r#"<html lang="{}">"#, html_escape(&config.language));
    html.push_str("<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
    );
    if config.title.is_empty() {
        let _ = writeln!(html, "<title>{}</title>", title);
    } else {
        let _ = writeln!(
            html,
            "<title>{} | {}</title>",
            title,
            html_escape(&config.title)
        );
    }
    if !description.is_empty() {
        let _ = writeln!(
            html,
            r#"<meta name="description" content="{}">"#,
            html_escape(&description)
        );
    }
    let _ = writeln!(
        html,
        r#"<link rel="canonical" href="{}">"#,
        html_escape(&meta.permalink)
    );
    html.push_str(&meta_generator());
    html.push_str("\n</head>\n<body>\n");

    let _ = writeln!(
        html,
        r#"<article class="post" data-id="{}">"#,
        html_escape(&meta.id)
    );
    html.push_str("<header class=\"post-header\">\n");
    let _ = writeln!(html, r#"<h1 class="post-title">{}</h1>"#, title);
    let _ = writeln!(
        html,
        r#"<time class="post-date" datetime="{}">{}</time>"#,
        meta.date.to_rfc3339(),
        html_escape(&format_date(meta, &config.date_format))
    );
    push_term_list(&mut html, "post-categories", &meta.categories);
    push_term_list(&mut html, "post-tags", &meta.tags);
    html.push_str("</header>\n");

    html.push_str("<div class=\"post-content\">\n");
    html.push_str(body_html);
    if !body_html.ends_with('\n') {
        html.push('\n');
    }
    html.push_str("</div>\n</article>\n</body>\n</html>\n");

    html
}

fn push_term_list<'a>(html: &mut String, class: &str, terms: impl IntoIterator<Item = &'a String>) {
    let items: Vec<String> = terms
        .into_iter()
        .map(|t| format!("<li>{}</li>", html_escape(t)))
        .collect();
    if items.is_empty() {
        return;
    }
    let _ = writeln!(html, r#"<ul class="{}">{}</ul>"#, class, items.concat());
}

/// Render the home page listing published posts, newest first
pub fn index_page(config: &SiteConfig, posts: &[PageMeta]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n");
    let _ = writeln!(html, r#"<html lang="{}">"#, html_escape(&config.language));
    html.push_str("<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", html_escape(&config.title));
    html.push_str(&meta_generator());
    html.push_str("\n</head>\n<body>\n");
    let _ = writeln!(html, r#"<h1 class="site-title">{}</h1>"#, html_escape(&config.title));
    if !config.description.is_empty() {
        let _ = writeln!(
            html,
            r#"<p class="site-description">{}</p>"#,
            html_escape(&config.description)
        );
    }

    html.push_str("<ul class=\"post-list\">\n");
    for post in posts {
        let _ = writeln!(
            html,
            r#"<li><time datetime="{}">{}</time> <a href="{}">{}</a></li>"#,
            post.date.to_rfc3339(),
            html_escape(&format_date(post, &config.date_format)),
            html_escape(&post.url),
            html_escape(&post.title)
        );
    }
    html.push_str("</ul>\n</body>\n</html>\n");

    html
}
