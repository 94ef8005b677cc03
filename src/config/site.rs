//! Site configuration (_config.yml)

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    /// IANA timezone used for front-matter dates without an offset
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,
    pub permalink: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    #[serde(default)]
    pub skip_render: Vec<String>,

    // Writing
    pub new_post_name: String,
    pub render_drafts: bool,
    pub post_asset_folder: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub media: MediaConfig,

    // Date format used on rendered pages (chrono strftime)
    pub date_format: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Postpress".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),
            timezone: String::new(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),
            permalink: ":year/:month/:day/:title/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),
            skip_render: Vec::new(),

            new_post_name: ":title.md".to_string(),
            render_drafts: false,
            post_asset_folder: false,
            highlight: HighlightConfig::default(),
            media: MediaConfig::default(),

            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later, in the middle of a run
    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        for pattern in &self.skip_render {
            glob::Pattern::new(pattern)
                .map_err(|e| anyhow!("Invalid skip_render pattern {:?}: {}", pattern, e))?;
        }
        let bad_format = chrono::format::StrftimeItems::new(&self.date_format)
            .any(|item| matches!(item, chrono::format::Item::Error));
        if bad_format {
            return Err(anyhow!("Invalid date_format {:?}", self.date_format));
        }
        if !self.permalink.contains(":title") && !self.permalink.contains(":id") {
            return Err(anyhow!(
                "permalink {:?} must contain :title or :id",
                self.permalink
            ));
        }
        Ok(())
    }

    /// Timezone for naive dates; an empty setting means UTC
    pub fn tz(&self) -> Result<Tz> {
        if self.timezone.trim().is_empty() {
            return Ok(Tz::UTC);
        }
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid timezone {:?}: {}", self.timezone, e))
    }

    /// Compiled `skip_render` patterns (invalid ones are dropped)
    pub fn skip_patterns(&self) -> Vec<glob::Pattern> {
        self.skip_render
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect()
    }
}

/// Server-side code highlighting (off by default: code blocks keep their
/// language class for client-side highlighters)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: false,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Media reference handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Check that site-local images exist in the source tree
    pub check_local: bool,
    /// Text used for a placeholder when the image has no alt text
    pub placeholder_text: String,
    /// Add `loading="lazy"` to rendered images
    pub lazy_load: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            check_local: true,
            placeholder_text: "image unavailable".to_string(),
            lazy_load: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Postpress");
        assert_eq!(config.permalink, ":year/:month/:day/:title/");
        assert!(!config.highlight.enable);
        assert!(config.media.check_local);
        assert_eq!(config.tz().unwrap(), Tz::UTC);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
author: Test User
timezone: Asia/Shanghai
highlight:
  enable: true
  line_number: true
skip_render:
  - "drafts/**"
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.author, "Test User");
        assert!(config.highlight.enable);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
        assert_eq!(config.tz().unwrap(), chrono_tz::Asia::Shanghai);
        assert_eq!(config.skip_patterns().len(), 1);
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let config = SiteConfig {
            timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_date_format_rejected() {
        let config = SiteConfig {
            date_format: "%Y-%Q".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_permalink_needs_unique_part() {
        let config = SiteConfig {
            permalink: ":year/:month/".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
