//! URL helper functions

use percent_encoding::percent_decode_str;
use std::path::{Component, Path};

use crate::config::SiteConfig;
use crate::content::ContentItem;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://example.com/blog/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Output key of a post: the permalink pattern filled in from its date and title
///
/// The key is relative (no leading slash) and always ends with `/`.
pub fn permalink_key(config: &SiteConfig, item: &ContentItem) -> String {
    let date = &item.date;

    let mut title = slug::slugify(&item.title);
    if title.is_empty() {
        title = slug::slugify(&item.id);
    }
    if title.is_empty() {
        title = "untitled".to_string();
    }

    let category = item
        .categories
        .first()
        .map(|c| slug::slugify(c))
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "uncategorized".to_string());

    let key = config
        .permalink
        .replace(":year", &date.format("%Y").to_string())
        .replace(":month", &date.format("%m").to_string())
        .replace(":day", &date.format("%d").to_string())
        .replace(":i_month", &date.format("%-m").to_string())
        .replace(":i_day", &date.format("%-d").to_string())
        .replace(":title", &title)
        .replace(":category", &category)
        .replace(":id", &item.id);

    let key = key.trim_start_matches('/');
    if key.ends_with('/') {
        key.to_string()
    } else {
        format!("{}/", key)
    }
}

/// Where a site-local media URL points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalMedia {
    /// Path under the site root (URL started with `/`), root prefix removed
    SiteRoot(String),
    /// Path relative to the page that embeds it
    PageRelative(String),
}

/// Decode a local media URL: query and fragment dropped, percent-decoded,
/// site root removed. Remote and inline URLs give `None`, and so do paths
/// with `..` or other components that could leave the source directory.
pub fn local_media(config: &SiteConfig, url: &str) -> Option<LocalMedia> {
    let url = url.trim();
    if url.is_empty() || url.starts_with("data:") || is_remote(url) {
        return None;
    }

    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = percent_decode_str(&url[..end])
        .decode_utf8_lossy()
        .to_string();

    if path.starts_with('/') {
        let root = config.root.trim_end_matches('/');
        let relative = path
            .strip_prefix(root)
            .filter(|rest| rest.starts_with('/'))
            .unwrap_or(&path)
            .trim_start_matches('/');
        stays_inside(relative).then(|| LocalMedia::SiteRoot(relative.to_string()))
    } else {
        let relative = path.trim_start_matches("./");
        stays_inside(relative).then(|| LocalMedia::PageRelative(relative.to_string()))
    }
}

fn stays_inside(relative: &str) -> bool {
    Path::new(relative)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// URLs with a scheme (or protocol-relative) are served by someone else
pub fn is_remote(url: &str) -> bool {
    if url.starts_with("//") {
        return true;
    }
    match url.split_once(':') {
        // Single letters are drive prefixes, not schemes
        Some((scheme, _)) => {
            scheme.len() > 1
                && scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Encode a URL path
pub fn encode_url(path: &str) -> String {
    const PATH: &percent_encoding::AsciiSet = &percent_encoding::CONTROLS
        .add(b' ')
        .add(b'"')
        .add(b'<')
        .add(b'>')
        .add(b'`');
    percent_encoding::utf8_percent_encode(path, PATH).to_string()
}
