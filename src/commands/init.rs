//! Initialize a new blog site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Blog;

const CONFIG: &str = r#"# Site
title: My Blog
description: ''
author: John Doe
language: en

# Content
index_file: posts.json
pages_dir: pages
date_format: YYYY. MM. DD

# Code highlighting
highlight:
  line_number: false
  light_theme: InspiredGitHub
  dark_theme: base16-ocean.dark

# Search box
search:
  debounce_ms: 300

# Theme preference
theme:
  store_path: .blogfront/preferences.json
  storage_key: blog-theme

# Comments (https://giscus.app)
giscus:
  enable: false
  repo: ''
  repo_id: ''
  category: General
  category_id: ''
  mapping: pathname
  lang: en
"#;

const STYLESHEET: &str = r#":root {
  --bg: #ffffff;
  --fg: #1f2328;
  --muted: #656d76;
  --accent: #0969da;
  --card: #f6f8fa;
}

[data-theme="dark"] {
  --bg: #0d1117;
  --fg: #e6edf3;
  --muted: #8d96a0;
  --accent: #4493f8;
  --card: #161b22;
}

body { background: var(--bg); color: var(--fg); font-family: system-ui, sans-serif; margin: 0; }
a { color: var(--accent); text-decoration: none; }
.site-header { display: flex; justify-content: space-between; align-items: center; padding: 1rem 2rem; }
.site-title { font-weight: 700; font-size: 1.25rem; color: var(--fg); }
.theme-toggle { width: 2rem; height: 2rem; border-radius: 50%; border: 1px solid var(--muted); background: var(--card); cursor: pointer; }
.container { max-width: 48rem; margin: 0 auto; padding: 0 1rem 3rem; }
.search-box input { width: 100%; padding: 0.5rem 0.75rem; font-size: 1rem; }
.tags-filter { display: flex; flex-wrap: wrap; gap: 0.5rem; margin: 1rem 0; }
.tag-btn { padding: 0.25rem 0.75rem; border-radius: 1rem; background: var(--card); color: var(--fg); }
.tag-btn.active { background: var(--accent); color: var(--bg); }
.post-card { background: var(--card); border-radius: 0.5rem; margin-bottom: 1rem; padding: 1rem 1.25rem; }
.post-card-link { color: inherit; display: block; }
.post-card-meta, .post-meta { color: var(--muted); display: flex; gap: 0.75rem; font-size: 0.875rem; }
.post-card-tags, .post-tags { display: flex; flex-wrap: wrap; gap: 0.5rem; }
.no-posts { color: var(--muted); text-align: center; padding: 3rem 0; }
.highlight pre, .post-content pre { overflow-x: auto; padding: 1rem; border-radius: 0.5rem; }
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("pages"))?;
    fs::create_dir_all(target_dir.join("css"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("A site already exists in {:?}", target_dir);
    }
    fs::write(&config_path, CONFIG)?;
    fs::write(target_dir.join("css/style.css"), STYLESHEET)?;

    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
category: General
tags: ["welcome"]
---

Welcome to your new blog! This is your very first post.

<!-- more -->

## Quick Start

### Create a new post

```bash
$ blogfront new "My New Post"
```

### Rebuild the post index

```bash
$ blogfront index
```

### Run server

```bash
$ blogfront server
```
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );
    fs::write(target_dir.join("pages/hello-world.md"), sample_post)?;

    let blog = Blog::new(target_dir)?;
    super::index::write_index(&blog)?;

    Ok(())
}
