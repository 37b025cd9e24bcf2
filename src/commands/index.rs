//! Rebuild the post index from the pages directory

use anyhow::Result;
use std::fs;

use crate::content::{ContentLoader, Post};
use crate::Blog;

/// Scan the pages directory and write the post index
pub fn write_index(blog: &Blog) -> Result<Vec<Post>> {
    let loader = ContentLoader::new(blog);
    let posts = loader.scan_pages(&blog.markdown_renderer())?;

    if let Some(parent) = blog.index_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&blog.index_path, serde_json::to_string_pretty(&posts)?)?;

    tracing::debug!("Wrote {} entries to {:?}", posts.len(), blog.index_path);
    Ok(posts)
}

/// Run the index command
pub fn run(blog: &Blog) -> Result<()> {
    let posts = write_index(blog)?;
    println!("Indexed {} posts into {:?}", posts.len(), blog.index_path);
    Ok(())
}
