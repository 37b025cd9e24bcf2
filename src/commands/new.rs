//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Blog;

/// Create a new markdown document under the pages directory.
///
/// `path` overrides the slugified title as the file name (without `.md`).
pub fn create_post(
    blog: &Blog,
    title: &str,
    path: Option<&str>,
    tags: &[String],
) -> Result<PathBuf> {
    let now = chrono::Local::now();

    let name = match path {
        Some(p) => p.trim_end_matches(".md").to_string(),
        None => slug::slugify(title),
    };
    if name.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let file_path = blog.pages_dir.join(format!("{}.md", name));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = format!(
        "---\ntitle: {}\ndate: {}\ntags: {}\n---\n",
        title,
        now.format("%Y-%m-%d %H:%M:%S"),
        serde_json::to_string(tags)?
    );
    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);

    Ok(file_path)
}
