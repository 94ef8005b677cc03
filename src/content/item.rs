//! Content item model

use chrono::{DateTime, FixedOffset};
use indexmap::{IndexMap, IndexSet};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A post loaded from the source tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    /// Content identifier: path under the posts directory, without extension
    pub id: String,

    /// Post title
    pub title: String,

    /// Publication date
    pub date: DateTime<FixedOffset>,

    /// Categories in authoring order, duplicates collapsed
    pub categories: IndexSet<String>,

    /// Post tags
    pub tags: IndexSet<String>,

    /// Markdown body (front-matter removed)
    pub body: String,

    /// Layout name from front-matter
    pub layout: String,

    /// Whether the post is published
    pub published: bool,

    /// Full source file path
    pub source: PathBuf,

    /// Custom front-matter fields
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl ContentItem {
    /// Create an item with the required fields
    pub fn new(id: impl Into<String>, title: impl Into<String>, date: DateTime<FixedOffset>) -> Self {
        let id = id.into();
        Self {
            source: PathBuf::from(format!("{}.md", id)),
            id,
            title: title.into(),
            date,
            categories: IndexSet::new(),
            tags: IndexSet::new(),
            body: String::new(),
            layout: "post".to_string(),
            published: true,
            extra: IndexMap::new(),
        }
    }

    /// Set the body (builder style, mostly for tests and scaffolding)
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Add categories (builder style)
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories
            .extend(categories.into_iter().map(Into::into));
        self
    }

    /// All code blocks in the body, in document order
    pub fn code_blocks(&self) -> Vec<CodeBlock> {
        let mut blocks = Vec::new();
        let mut current: Option<CodeBlock> = None;

        for event in Parser::new(&self.body) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    current = Some(CodeBlock {
                        language: CodeBlock::language_from(&kind),
                        literal: String::new(),
                    });
                }
                Event::Text(text) => {
                    if let Some(block) = current.as_mut() {
                        block.literal.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(block) = current.take() {
                        blocks.push(block);
                    }
                }
                _ => {}
            }
        }

        blocks
    }
}

/// A fenced or indented code block
///
/// The literal text is display-only: nothing checks that it is valid code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Language tag from the fence info string (first word)
    pub language: Option<String>,
    /// Exact text between the fences
    pub literal: String,
}

impl CodeBlock {
    /// Language tag of a pulldown-cmark code block
    pub fn language_from(kind: &CodeBlockKind<'_>) -> Option<String> {
        match kind {
            CodeBlockKind::Fenced(info) => info
                .split(|c: char| c.is_whitespace() || c == ',' || c == '{')
                .next()
                .filter(|lang| !lang.is_empty())
                .map(str::to_string),
            CodeBlockKind::Indented => None,
        }
    }
}
