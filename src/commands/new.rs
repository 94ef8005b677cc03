//! Create a new post

use anyhow::{bail, Result};
use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::path::PathBuf;

use crate::Site;

const DEFAULT_SCAFFOLD: &str = "---\ntitle: {{ title }}\ndate: {{ date }}\ncategories:\n---\n";

/// Create a new post in `_posts` from the post scaffold
pub fn create_post(site: &Site, title: &str, categories: &[String]) -> Result<PathBuf> {
    let now = Utc::now().with_timezone(&site.config.tz()?);
    create_post_at(site, title, categories, now)
}

fn create_post_at<Z: TimeZone>(
    site: &Site,
    title: &str,
    categories: &[String],
    now: DateTime<Z>,
) -> Result<PathBuf>
where
    Z::Offset: std::fmt::Display,
{
    if title.trim().is_empty() {
        bail!("A post needs a title");
    }

    let target_dir = site.posts_dir();
    fs::create_dir_all(&target_dir)?;

    let slug = match slug::slugify(title) {
        s if s.is_empty() => "untitled".to_string(),
        s => s,
    };
    let filename = site
        .config
        .new_post_name
        .replace(":title", &slug)
        .replace(":year", &now.format("%Y").to_string())
        .replace(":month", &now.format("%m").to_string())
        .replace(":day", &now.format("%d").to_string())
        .replace(":i_month", &now.format("%-m").to_string())
        .replace(":i_day", &now.format("%-d").to_string());
    let file_path = target_dir.join(&filename);

    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    let scaffold_path = site.base_dir.join("scaffolds").join("post.md");
    let scaffold = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)?
    } else {
        DEFAULT_SCAFFOLD.to_string()
    };

    let mut content = scaffold
        .replace("{{ title }}", &yaml_scalar(title))
        .replace("{{ date }}", &now.format("%Y-%m-%d %H:%M:%S").to_string());
    if !categories.is_empty() {
        let list: Vec<String> = categories.iter().map(|c| yaml_scalar(c)).collect();
        content = content.replacen(
            "categories:\n",
            &format!("categories: [{}]\n", list.join(", ")),
            1,
        );
    }

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Quote a front-matter value when plain YAML would misread it
fn yaml_scalar(value: &str) -> String {
    let needs_quotes = value.trim() != value
        || value.contains(": ")
        || value.contains(" #")
        || value.starts_with(|c: char| "!&*[]{}|>'\"%@`#,?-".contains(c));
    if needs_quotes {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::ContentLoader;
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<chrono::FixedOffset> {
        DateTime::parse_from_rfc3339("2022-05-03T09:30:00+02:00").unwrap()
    }

    #[test]
    fn test_new_post_is_loadable() {
        let tmp = TempDir::new().unwrap();
        let site = Site::with_config(tmp.path(), SiteConfig::default());
        let path = create_post_at(
            &site,
            "Wrapping UIKit views in SwiftUI",
            &["Swift".to_string()],
            fixed_now(),
        )
        .unwrap();
        assert_eq!(
            path.file_name().unwrap(),
            "wrapping-uikit-views-in-swiftui.md"
        );

        let item = ContentLoader::new(&site)
            .load("wrapping-uikit-views-in-swiftui")
            .unwrap();
        assert_eq!(item.title, "Wrapping UIKit views in SwiftUI");
        assert!(item.categories.contains("Swift"));
        assert_eq!(item.date.format("%Y-%m-%d").to_string(), "2022-05-03");
    }

    #[test]
    fn test_new_post_name_pattern() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig {
            new_post_name: ":year-:month-:day-:title.md".to_string(),
            ..Default::default()
        };
        let site = Site::with_config(tmp.path(), config);
        let path = create_post_at(&site, "Hello", &[], fixed_now()).unwrap();
        assert_eq!(path.file_name().unwrap(), "2022-05-03-hello.md");
        assert!(create_post_at(&site, "Hello", &[], fixed_now()).is_err());
    }

    #[test]
    fn test_title_with_colon_is_quoted() {
        assert_eq!(yaml_scalar("Swift: the basics"), "\"Swift: the basics\"");
        assert_eq!(yaml_scalar("Plain"), "Plain");
    }
}
