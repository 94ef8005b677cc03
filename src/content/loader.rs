//! Content loader - loads posts from the source directory

use chrono_tz::Tz;
use indexmap::IndexSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::{ContentItem, FrontMatter, LoadError};
use crate::Site;

/// Posts that loaded, and the files that did not
#[derive(Debug, Default)]
pub struct LoadReport {
    pub items: Vec<ContentItem>,
    pub failures: Vec<(PathBuf, LoadError)>,
}

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    tz: Tz,
    skip: Vec<glob::Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        // SiteConfig::load validates the timezone; a hand-built config falls back to UTC
        let tz = site.config.tz().unwrap_or(Tz::UTC);
        let skip = site.config.skip_patterns();
        Self { site, tz, skip }
    }

    /// Whether a loaded item may be published: not marked `published: false`
    /// (unless drafts are rendered) and not matched by `skip_render`
    pub fn is_publishable(&self, item: &ContentItem) -> bool {
        (item.published || self.site.config.render_drafts) && !self.is_skipped(&item.source)
    }

    /// Whether `skip_render` matches a file, relative to the source directory
    fn is_skipped(&self, path: &Path) -> bool {
        let relative = path
            .strip_prefix(&self.site.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        self.skip.iter().any(|p| p.matches(&relative))
    }

    /// Directories searched for posts, in priority order
    fn content_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.site.posts_dir()];
        if self.site.config.render_drafts {
            dirs.push(self.site.drafts_dir());
        }
        dirs
    }

    /// Load a single post by its content identifier
    pub fn load(&self, id: &str) -> Result<ContentItem, LoadError> {
        let id = normalize_id(id).ok_or_else(|| LoadError::NotFound(id.to_string()))?;

        for dir in self.content_dirs() {
            for ext in ["md", "markdown"] {
                let path = dir.join(format!("{}.{}", id, ext));
                if path.is_file() {
                    return self.load_path(&path, &id);
                }
            }
        }

        Err(LoadError::NotFound(id))
    }

    /// Load every post (and draft, when enabled)
    ///
    /// A file that fails to load is recorded in the report and skipped.
    pub fn load_all(&self) -> Result<LoadReport, LoadError> {
        let mut report = LoadReport::default();

        for dir in self.content_dirs() {
            if !dir.exists() {
                continue;
            }

            for entry in WalkDir::new(&dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !path.is_file() || !is_markdown_file(path) {
                    continue;
                }

                if self.is_skipped(path) {
                    tracing::debug!("Skipping {:?} (skip_render)", path);
                    continue;
                }

                let id = id_for(&dir, path);
                match self.load_path(path, &id) {
                    Ok(item) => {
                        if self.is_publishable(&item) {
                            report.items.push(item);
                        } else {
                            tracing::debug!("Skipping unpublished post {}", id);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load post {:?}: {}", path, e);
                        report.failures.push((path.to_path_buf(), e));
                    }
                }
            }
        }

        // Newest first; ids break ties so the order is stable
        report
            .items
            .sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));

        Ok(report)
    }

    /// Load a single post from a file
    fn load_path(&self, path: &Path, id: &str) -> Result<ContentItem, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (fm, body) =
            FrontMatter::parse(&content).map_err(|e| LoadError::parse(id, e.to_string()))?;

        let date = match fm.date.as_deref() {
            None => return Err(LoadError::parse(id, "missing date in front-matter")),
            Some(raw) => fm
                .parse_date(&self.tz)
                .ok_or_else(|| LoadError::parse(id, format!("invalid date {:?}", raw)))?,
        };

        // Title from front-matter, or the file name
        let title = fm
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Untitled")
                    .to_string()
            });

        let mut item = ContentItem::new(id, title, date).with_body(body);
        item.categories = collect_set(fm.categories);
        item.tags = collect_set(fm.tags);
        item.layout = fm.layout.unwrap_or_else(|| "post".to_string());
        item.published = fm.published;
        item.source = path.to_path_buf();
        item.extra = fm.extra;

        tracing::debug!("Loaded {} from {:?}", item.id, path);
        Ok(item)
    }
}

/// Trim names and drop empties, keeping the first occurrence of each
fn collect_set(values: Vec<String>) -> IndexSet<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Validate an id: relative, no `..`, extension optional
fn normalize_id(id: &str) -> Option<String> {
    let id = id.trim().replace('\\', "/");
    let id = id
        .strip_suffix(".markdown")
        .or_else(|| id.strip_suffix(".md"))
        .unwrap_or(&id)
        .trim_matches('/');

    if id.is_empty() {
        return None;
    }

    let safe = Path::new(id)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));

    safe.then(|| id.to_string())
}

/// Content id of a file inside `dir`
fn id_for(dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(dir).unwrap_or(path);
    let without_ext = relative.with_extension("");
    without_ext
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("/")
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn site_with_posts(posts: &[(&str, &str)]) -> (TempDir, Site) {
        let tmp = TempDir::new().unwrap();
        let posts_dir = tmp.path().join("source/_posts");
        for (name, content) in posts {
            let path = posts_dir.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let site = Site::with_config(tmp.path(), SiteConfig::default());
        (tmp, site)
    }

    const POST: &str = "---\ntitle: Wrapping UIKit views in SwiftUI\ndate: 2022-05-03\ncategories: [Swift, Swift]\n---\n\nBody text.\n";

    #[test]
    fn test_load_by_id() {
        let (_tmp, site) = site_with_posts(&[("uikit-in-swiftui.md", POST)]);
        let loader = ContentLoader::new(&site);

        let item = loader.load("uikit-in-swiftui").unwrap();
        assert_eq!(item.id, "uikit-in-swiftui");
        assert_eq!(item.title, "Wrapping UIKit views in SwiftUI");
        assert_eq!(item.date.to_rfc3339(), "2022-05-03T00:00:00+00:00");
        assert_eq!(item.categories.len(), 1);
        assert_eq!(item.body, "Body text.\n");

        // Extension in the id is accepted
        assert_eq!(loader.load("uikit-in-swiftui.md").unwrap().id, "uikit-in-swiftui");
    }

    #[test]
    fn test_load_nested_id() {
        let (_tmp, site) = site_with_posts(&[("2022/swift/webview.markdown", POST)]);
        let item = ContentLoader::new(&site).load("2022/swift/webview").unwrap();
        assert_eq!(item.id, "2022/swift/webview");
    }

    #[test]
    fn test_missing_is_not_found() {
        let (_tmp, site) = site_with_posts(&[]);
        let loader = ContentLoader::new(&site);
        assert!(matches!(loader.load("nope"), Err(LoadError::NotFound(_))));
        assert!(matches!(loader.load("../_config"), Err(LoadError::NotFound(_))));
        assert!(matches!(loader.load(""), Err(LoadError::NotFound(_))));
    }

    #[test]
    fn test_missing_date_is_parse_error() {
        let (_tmp, site) = site_with_posts(&[("undated.md", "---\ntitle: No date\n---\nBody\n")]);
        let err = ContentLoader::new(&site).load("undated").unwrap_err();
        match err {
            LoadError::Parse { id, message } => {
                assert_eq!(id, "undated");
                assert!(message.contains("missing date"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_date_is_parse_error() {
        let (_tmp, site) =
            site_with_posts(&[("bad.md", "---\ntitle: Bad\ndate: someday\n---\nBody\n")]);
        let err = ContentLoader::new(&site).load("bad").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_title_falls_back_to_file_name() {
        let (_tmp, site) = site_with_posts(&[("untitled-note.md", "---\ndate: 2022-05-03\n---\nBody\n")]);
        let item = ContentLoader::new(&site).load("untitled-note").unwrap();
        assert_eq!(item.title, "untitled-note");
    }

    #[test]
    fn test_load_all_collects_failures_and_sorts() {
        let (_tmp, site) = site_with_posts(&[
            ("old.md", "---\ntitle: Old\ndate: 2020-01-01\n---\nold\n"),
            ("new.md", "---\ntitle: New\ndate: 2022-05-03\n---\nnew\n"),
            ("broken.md", "no front matter here\n"),
            ("hidden.md", "---\ntitle: Hidden\ndate: 2021-01-01\npublished: false\n---\n"),
            ("notes.txt", "ignored"),
        ]);

        let report = ContentLoader::new(&site).load_all().unwrap();
        let ids: Vec<&str> = report.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].0.ends_with("broken.md"));
    }

    #[test]
    fn test_load_all_honours_skip_render() {
        let (tmp, _) = site_with_posts(&[
            ("keep.md", "---\ntitle: Keep\ndate: 2022-05-03\n---\n"),
            ("wip/skip.md", "---\ntitle: Skip\ndate: 2022-05-03\n---\n"),
        ]);
        let config = SiteConfig {
            skip_render: vec!["_posts/wip/**".to_string()],
            ..Default::default()
        };
        let site = Site::with_config(tmp.path(), config);

        let report = ContentLoader::new(&site).load_all().unwrap();
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].id, "keep");
    }

    #[test]
    fn test_is_publishable() {
        let (tmp, _) = site_with_posts(&[
            ("keep.md", "---\ntitle: Keep\ndate: 2022-05-03\n---\n"),
            ("hidden.md", "---\ntitle: Hidden\ndate: 2022-05-03\npublished: false\n---\n"),
            ("wip/skip.md", "---\ntitle: Skip\ndate: 2022-05-03\n---\n"),
        ]);
        let config = SiteConfig {
            skip_render: vec!["_posts/wip/**".to_string()],
            ..Default::default()
        };
        let site = Site::with_config(tmp.path(), config);
        let loader = ContentLoader::new(&site);

        // Single loads still succeed; publishing is a separate decision
        assert!(loader.is_publishable(&loader.load("keep").unwrap()));
        assert!(!loader.is_publishable(&loader.load("hidden").unwrap()));
        assert!(!loader.is_publishable(&loader.load("wip/skip").unwrap()));
    }

    #[test]
    fn test_drafts_only_when_enabled() {
        let (tmp, site) = site_with_posts(&[]);
        let drafts = tmp.path().join("source/_drafts");
        fs::create_dir_all(&drafts).unwrap();
        fs::write(drafts.join("idea.md"), "---\ntitle: Idea\ndate: 2022-05-03\n---\n").unwrap();

        assert!(ContentLoader::new(&site).load("idea").is_err());

        let config = SiteConfig {
            render_drafts: true,
            ..Default::default()
        };
        let site = Site::with_config(tmp.path(), config);
        assert_eq!(ContentLoader::new(&site).load("idea").unwrap().title, "Idea");
    }
}
