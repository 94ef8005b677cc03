//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::publish::MANIFEST_FILE;
use crate::Site;

/// Remove published output and the publish manifest
pub fn run(site: &Site) -> Result<()> {
    if site.public_dir.exists() {
        fs::remove_dir_all(&site.public_dir)?;
        tracing::info!("Deleted: {:?}", site.public_dir);
    }

    let manifest_path = site.base_dir.join(MANIFEST_FILE);
    if let Some(state_dir) = manifest_path.parent() {
        if state_dir != site.base_dir && state_dir.exists() {
            fs::remove_dir_all(state_dir)?;
            tracing::info!("Deleted: {:?}", state_dir);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_output_and_manifest() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("source/_posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("a.md"), "---\ntitle: A\ndate: 2022-05-03\n---\nHi\n").unwrap();
        let site = Site::with_config(tmp.path(), SiteConfig::default());

        site.generate().unwrap();
        assert!(site.base_dir.join(MANIFEST_FILE).exists());

        run(&site).unwrap();
        assert!(!site.public_dir.exists());
        assert!(!site.base_dir.join(MANIFEST_FILE).exists());
        assert!(posts.join("a.md").exists());

        // Cleaning twice is fine
        run(&site).unwrap();
    }
}
