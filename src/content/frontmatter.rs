//! Front-matter parsing

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Why a front-matter block could not be read
#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("no front-matter block found")]
    Missing,
    #[error("front-matter block opened with {0} is never closed")]
    Unclosed(&'static str),
    #[error("invalid YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON front-matter: {0}")]
    Json(#[from] serde_json::Error),
}

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter data from a post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub categories: Vec<String>,
    pub layout: Option<String>,
    /// Posts are published unless they opt out
    #[serde(default = "default_published")]
    pub published: bool,

    /// Additional custom fields, in authoring order
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

fn default_published() -> bool {
    true
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            date: None,
            tags: Vec::new(),
            categories: Vec::new(),
            layout: None,
            published: true,
            extra: IndexMap::new(),
        }
    }
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        if content.starts_with("---") {
            return Self::parse_yaml(content);
        }

        if content.starts_with(";;;") || content.starts_with('{') {
            return Self::parse_json(content);
        }

        Err(FrontMatterError::Missing)
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let rest = content[3..].trim_start_matches([' ', '\t']);
        let rest = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .ok_or(FrontMatterError::Unclosed("---"))?;

        // An empty block closes immediately
        let (yaml_content, remaining) = if let Some(after) = rest.strip_prefix("---") {
            ("", after)
        } else {
            let end_pos = rest.find("\n---").ok_or(FrontMatterError::Unclosed("---"))?;
            (&rest[..end_pos], &rest[end_pos + 4..])
        };

        // The closing line may only carry trailing dashes or whitespace
        let remaining = match remaining.find('\n') {
            Some(pos) => &remaining[pos + 1..],
            None => "",
        };
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml_content)?;
        Ok((fm, remaining))
    }

    fn parse_json(content: &str) -> Result<(Self, &str), FrontMatterError> {
        // JSON front-matter ends with ;;;
        if let Some(rest) = content.strip_prefix(";;;") {
            let end_pos = rest.find(";;;").ok_or(FrontMatterError::Unclosed(";;;"))?;
            let json_content = rest[..end_pos].trim();
            let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);

            let json_content = if json_content.starts_with('{') {
                json_content.to_string()
            } else {
                format!("{{{}}}", json_content)
            };
            let fm: FrontMatter = serde_json::from_str(&json_content)?;
            return Ok((fm, remaining));
        }

        // A JSON object at the start of the file
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        let mut end_pos = None;
        for (i, c) in content.char_indices() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        end_pos = Some(i + 1);
                        break;
                    }
                }
                _ => {}
            }
        }

        let end_pos = end_pos.ok_or(FrontMatterError::Unclosed("{"))?;
        let fm: FrontMatter = serde_json::from_str(&content[..end_pos])?;
        let remaining = content[end_pos..].trim_start_matches(['\n', '\r']);
        Ok((fm, remaining))
    }

    /// Parse the date field; naive dates are read in `tz`
    pub fn parse_date(&self, tz: &Tz) -> Option<DateTime<FixedOffset>> {
        self.date.as_deref().and_then(|s| parse_date_string(s, tz))
    }
}

/// Parse a date string in the formats blog front-matter commonly uses
pub fn parse_date_string(s: &str, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let offset_formats = ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S %z"];
    for fmt in offset_formats {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return localize(naive, tz);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return localize(d.and_hms_opt(0, 0, 0)?, tz);
        }
    }

    None
}

fn localize(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Wrapping UIKit views in SwiftUI
date: 2022-05-03 10:30:00
tags:
  - swiftui
  - uikit
categories:
  - Swift
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Wrapping UIKit views in SwiftUI"));
        assert_eq!(fm.tags, vec!["swiftui", "uikit"]);
        assert_eq!(fm.categories, vec!["Swift"]);
        assert!(fm.published);
        assert!(remaining.starts_with("This is the content."));
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = r#"{"title": "Test {Post}", "date": "2022-05-03", "tags": ["a", "b"]}

This is content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Test {Post}"));
        assert_eq!(fm.tags, vec!["a", "b"]);
        assert!(remaining.starts_with("This is content."));
    }

    #[test]
    fn test_parse_semicolon_json_frontmatter() {
        let content = ";;;\n\"title\": \"Hello\",\n\"date\": \"2022-05-03\"\n;;;\nBody";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert_eq!(remaining, "Body");
    }

    #[test]
    fn test_parse_single_string_categories() {
        let content = r#"---
title: Single Category Post
date: 2022-05-03
tags: Notes
categories: Swift
---

Content here.
"#;

        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["Notes"]);
        assert_eq!(fm.categories, vec!["Swift"]);
    }

    #[test]
    fn test_extra_fields_keep_order() {
        let content = "---\ntitle: X\nzeta: 1\nalpha: two\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let keys: Vec<&str> = fm.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_missing_frontmatter() {
        let err = FrontMatter::parse("Just some prose.\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::Missing));
    }

    #[test]
    fn test_unclosed_frontmatter() {
        let err = FrontMatter::parse("---\ntitle: Open\n\nNo closing line").unwrap_err();
        assert!(matches!(err, FrontMatterError::Unclosed("---")));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = FrontMatter::parse("---\ntitle: [unclosed\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn test_parse_date_in_timezone() {
        let fm = FrontMatter {
            date: Some("2022-05-03".to_string()),
            ..Default::default()
        };

        let utc = fm.parse_date(&Tz::UTC).unwrap();
        assert_eq!(utc.to_rfc3339(), "2022-05-03T00:00:00+00:00");

        let shanghai = fm.parse_date(&chrono_tz::Asia::Shanghai).unwrap();
        assert_eq!(shanghai.to_rfc3339(), "2022-05-03T00:00:00+08:00");
    }

    #[test]
    fn test_parse_date_variants() {
        let tz = Tz::UTC;
        assert!(parse_date_string("2022/05/03 09:15", &tz).is_some());
        assert!(parse_date_string("2022-05-03T09:15:00", &tz).is_some());
        let with_offset = parse_date_string("2022-05-03T09:15:00+02:00", &tz).unwrap();
        assert_eq!(with_offset.offset().local_minus_utc(), 2 * 3600);
        assert!(parse_date_string("May 3rd", &tz).is_none());
        assert!(parse_date_string("2022-13-45", &tz).is_none());
    }
}
