//! HTML helper functions

/// Generate an image tag
///
/// # Examples
/// ```ignore
/// image_tag("/images/photo.jpg", "My Photo", None, true)
/// // -> <img src="/images/photo.jpg" alt="My Photo" loading="lazy">
/// ```
pub fn image_tag(src: &str, alt: &str, title: Option<&str>, lazy: bool) -> String {
    let title_attr = title
        .map(|t| format!(r#" title="{}""#, html_escape(t)))
        .unwrap_or_default();
    let loading = if lazy { r#" loading="lazy""# } else { "" };

    format!(
        r#"<img src="{}" alt="{}"{}{}>"#,
        html_escape(src),
        html_escape(alt),
        title_attr,
        loading
    )
}

/// Placeholder shown in place of an image that could not be resolved
pub fn media_placeholder(src: &str, alt: &str, fallback_text: &str) -> String {
    let label = if alt.trim().is_empty() {
        fallback_text
    } else {
        alt
    };
    format!(
        r#"<span class="media-placeholder" role="img" aria-label="{label}" data-src="{}">{label}</span>"#,
        html_escape(src),
        label = html_escape(label)
    )
}

/// Generate meta generator tag
pub fn meta_generator() -> String {
    format!(
        r#"<meta name="generator" content="postpress {}">"#,
        env!("CARGO_PKG_VERSION")
    )
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Reverse of [`html_escape`]
pub fn html_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Truncate a string to a specified length
pub fn truncate(s: &str, length: usize, omission: Option<&str>) -> String {
    let omission = omission.unwrap_or("...");

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let truncated: String = s
            .chars()
            .take(length.saturating_sub(omission.chars().count()))
            .collect();
        format!("{}{}", truncated.trim_end(), omission)
    }
}
