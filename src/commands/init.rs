//! Initialize a new site

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# Postpress configuration

# Site
title: Postpress
description: ''
author: John Doe
language: en
# IANA name, e.g. Europe/Berlin; empty means UTC
timezone: ''

# URL
url: http://example.com
root: /
permalink: :year/:month/:day/:title/

# Directory
source_dir: source
public_dir: public
skip_render: []

# Writing
new_post_name: :title.md
render_drafts: false
post_asset_folder: false
date_format: '%Y-%m-%d'
highlight:
  enable: false
  theme: base16-ocean.dark
  line_number: false
media:
  check_local: true
  placeholder_text: image unavailable
  lazy_load: true
"#;

const POST_SCAFFOLD: &str = r#"---
title: {{ title }}
date: {{ date }}
categories:
---
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        bail!("{:?} already contains a site", target_dir);
    }

    fs::create_dir_all(target_dir.join("source/_posts"))?;
    fs::create_dir_all(target_dir.join("source/_drafts"))?;
    fs::create_dir_all(target_dir.join("source/images"))?;
    fs::create_dir_all(target_dir.join("scaffolds"))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;
    fs::write(target_dir.join("scaffolds/post.md"), POST_SCAFFOLD)?;

    tracing::info!("Initialized site in {:?}", target_dir);
    Ok(())
}
