//! List site content

use anyhow::{bail, Result};
use indexmap::IndexMap;

use crate::content::{ContentItem, ContentLoader};
use crate::resolve::ReferenceResolver;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let loader = ContentLoader::new(site);
    let report = loader.load_all()?;
    for (path, error) in &report.failures {
        tracing::warn!("Skipped {:?}: {}", path, error);
    }
    let posts = report.items;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", posts.len());
            for post in &posts {
                println!(
                    "  {} - {} [{}]",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    post.id
                );
            }
        }
        "tag" | "tags" => {
            let tags = count_terms(&posts, |p| p.tags.iter());
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        "category" | "categories" => {
            let categories = count_terms(&posts, |p| p.categories.iter());
            println!("Categories ({}):", categories.len());
            for (cat, count) in categories {
                println!("  {} ({})", cat, count);
            }
        }
        "media" => {
            let resolver = ReferenceResolver::new(site);
            let references: Vec<_> = posts.iter().flat_map(|p| resolver.resolve(p)).collect();
            let missing = references.iter().filter(|r| r.status.is_unresolved()).count();
            println!("Media ({}, {} missing):", references.len(), missing);
            for reference in &references {
                println!(
                    "  {} [{}] {}",
                    reference.url, reference.source_id, reference.status
                );
            }
        }
        _ => {
            bail!(
                "Unknown type: {}. Available: post, category, tag, media",
                content_type
            );
        }
    }

    Ok(())
}

/// Count posts per term, most used first
fn count_terms<'p, F, I>(posts: &'p [ContentItem], terms: F) -> Vec<(&'p str, usize)>
where
    F: Fn(&'p ContentItem) -> I,
    I: Iterator<Item = &'p String>,
{
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for post in posts {
        for term in terms(post) {
            *counts.entry(term.as_str()).or_insert(0) += 1;
        }
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
