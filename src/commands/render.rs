//! Publish a single post

use anyhow::Result;

use crate::pipeline::{ItemReport, Pipeline};
use crate::Site;

/// Load, render, and publish one post by id, then refresh the home page
pub fn run(site: &Site, id: &str) -> Result<ItemReport> {
    let mut pipeline = Pipeline::new(site)?;
    let report = pipeline.process(id)?;
    pipeline.refresh_index()?;
    pipeline.finish()?;

    tracing::info!(
        "{} -> {} ({:?}, {} code blocks, {} media, {} unresolved)",
        report.id,
        report.key,
        report.outcome,
        report.code_blocks,
        report.media,
        report.unresolved
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::pipeline::PipelineError;
    use crate::publish::PAGE_FILE;
    use std::fs;
    use tempfile::TempDir;

    fn site(posts: &[(&str, &str)]) -> (TempDir, Site) {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("source/_posts");
        fs::create_dir_all(&dir).unwrap();
        for (name, content) in posts {
            fs::write(dir.join(name), content).unwrap();
        }
        let site = Site::with_config(tmp.path(), SiteConfig::default());
        (tmp, site)
    }

    #[test]
    fn test_render_one_updates_index() {
        let (_tmp, site) = site(&[
            ("old.md", "---\ntitle: Old\ndate: 2021-01-01\n---\nOld\n"),
            ("new.md", "---\ntitle: New\ndate: 2022-05-03\n---\nNew\n"),
        ]);
        run(&site, "old").unwrap();
        let index = fs::read_to_string(site.public_dir.join(PAGE_FILE)).unwrap();
        assert!(index.contains(">Old</a>"));
        assert!(!index.contains(">New</a>"));

        run(&site, "new").unwrap();
        let index = fs::read_to_string(site.public_dir.join(PAGE_FILE)).unwrap();
        let new_at = index.find(">New</a>").unwrap();
        let old_at = index.find(">Old</a>").unwrap();
        assert!(new_at < old_at);
    }

    #[test]
    fn test_render_refuses_unpublished_post() {
        let (_tmp, site) = site(&[(
            "hidden.md",
            "---\ntitle: Hidden\ndate: 2022-05-03\npublished: false\n---\nSecret\n",
        )]);
        let err = run(&site, "hidden").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Unpublished(id)) if id == "hidden"
        ));
        assert!(!site.public_dir.join("2022/05/03/hidden").exists());
    }
}
