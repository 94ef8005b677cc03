//! Markdown to HTML conversion

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;

use super::highlight::Highlighter;
use crate::config::MediaConfig;
use crate::content::CodeBlock;
use crate::helpers::{encode_url, html_escape, image_tag, media_placeholder};
use crate::resolve::{MediaReference, ReferenceStatus};

/// Parser options shared by the renderer and the reference resolver
pub fn markdown_options() -> Options {
    // Front-matter is stripped by the loader, so no YAML metadata blocks here
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_DEFINITION_LIST
        | Options::ENABLE_GFM
}

/// Image being collected between `Start(Image)` and `End(Image)`
struct PendingImage {
    url: String,
    title: String,
    alt: String,
}

/// Converts a Markdown body into an HTML fragment
pub(crate) struct BodyRenderer<'a> {
    pub highlighter: Option<&'a Highlighter>,
    pub media: &'a MediaConfig,
    pub references: &'a [MediaReference],
}

/// HTML fragment plus what went into it
pub(crate) struct RenderedBody {
    pub html: String,
    pub code_blocks: usize,
    pub media_elements: usize,
}

impl BodyRenderer<'_> {
    pub fn render(&self, markdown: &str) -> RenderedBody {
        let statuses: HashMap<&str, &ReferenceStatus> = self
            .references
            .iter()
            .map(|r| (r.url.as_str(), &r.status))
            .collect();

        let mut events: Vec<Event> = Vec::new();
        let mut code: Option<(Option<String>, String)> = None;
        let mut image: Option<PendingImage> = None;
        let mut code_blocks = 0;
        let mut media_elements = 0;

        for event in Parser::new_ext(markdown, markdown_options()) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code = Some((CodeBlock::language_from(&kind), String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, literal)) = code.take() {
                        let html = self.code_block(&literal, lang.as_deref());
                        events.push(Event::Html(CowStr::from(html)));
                        code_blocks += 1;
                    }
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, literal)) = code.as_mut() {
                        literal.push_str(&text);
                    }
                }
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    image = Some(PendingImage {
                        url: dest_url.trim().to_string(),
                        title: title.to_string(),
                        alt: String::new(),
                    });
                }
                Event::End(TagEnd::Image) => {
                    if let Some(pending) = image.take() {
                        let status = statuses.get(pending.url.as_str()).copied();
                        let html = self.media_element(&pending, status);
                        events.push(Event::InlineHtml(CowStr::from(html)));
                        media_elements += 1;
                    }
                }
                Event::Text(text) | Event::Code(text) if image.is_some() => {
                    if let Some(pending) = image.as_mut() {
                        pending.alt.push_str(&text);
                    }
                }
                // Formatting inside alt text is flattened
                _ if image.is_some() => {}
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        RenderedBody {
            html: html_output,
            code_blocks,
            media_elements,
        }
    }

    /// Code block markup; the language tag is kept for client-side highlighters
    fn code_block(&self, literal: &str, lang: Option<&str>) -> String {
        if let Some(highlighter) = self.highlighter {
            return highlighter.highlight(literal, lang);
        }

        match lang {
            Some(lang) => {
                let lang = html_escape(lang);
                format!(
                    "<pre><code class=\"language-{lang}\" data-lang=\"{lang}\">{}</code></pre>\n",
                    html_escape(literal)
                )
            }
            None => format!("<pre><code>{}</code></pre>\n", html_escape(literal)),
        }
    }

    /// `<img>` for servable media, a placeholder for unresolved ones
    fn media_element(&self, image: &PendingImage, status: Option<&ReferenceStatus>) -> String {
        match status {
            Some(ReferenceStatus::Unresolved(_)) => {
                media_placeholder(&image.url, &image.alt, &self.media.placeholder_text)
            }
            _ => {
                let title = (!image.title.is_empty()).then_some(image.title.as_str());
                image_tag(&encode_url(&image.url), &image.alt, title, self.media.lazy_load)
            }
        }
    }
}
