//! Content loader - reads the post index and individual documents

use std::cmp::Ordering;
use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use super::markdown::split_excerpt;
use super::{FrontMatter, MarkdownRenderer, Post};
use crate::helpers::{parse_date_string, strip_html, truncate};
use crate::Blog;

/// Longest excerpt generated from a document body
const EXCERPT_LENGTH: usize = 160;

/// Failure to load the post index or a document.
///
/// Loads are never retried; callers show a terminal error state instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("post index not found: {0}")]
    IndexNotFound(PathBuf),

    #[error("post index {path} is not a valid post list: {source}")]
    InvalidIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("post not found: {0}")]
    DocumentNotFound(String),

    #[error("invalid post path: {0}")]
    InvalidPath(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loads the post index and documents from the site directory
#[derive(Debug, Clone)]
pub struct ContentLoader {
    index_path: PathBuf,
    pages_dir: PathBuf,
}

impl ContentLoader {
    /// Create a new content loader
    pub fn new(blog: &Blog) -> Self {
        Self {
            index_path: blog.index_path.clone(),
            pages_dir: blog.pages_dir.clone(),
        }
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn pages_dir(&self) -> &Path {
        &self.pages_dir
    }

    /// Load the whole post collection from the index file
    pub async fn load_posts(&self) -> Result<Vec<Post>, LoadError> {
        let content = match tokio::fs::read(&self.index_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::IndexNotFound(self.index_path.clone()));
            }
            Err(source) => {
                return Err(LoadError::Io {
                    path: self.index_path.clone(),
                    source,
                })
            }
        };

        let posts: Vec<Post> =
            serde_json::from_slice(&content).map_err(|source| LoadError::InvalidIndex {
                path: self.index_path.clone(),
                source,
            })?;

        tracing::debug!("Loaded {} posts from {:?}", posts.len(), self.index_path);
        Ok(posts)
    }

    /// Load and parse a single document by its index `file` attribute
    pub async fn load_document(&self, file: &str) -> Result<FrontMatter, LoadError> {
        let path = self.document_path(file)?;

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::DocumentNotFound(file.to_string()));
            }
            Err(source) => return Err(LoadError::Io { path, source }),
        };

        tracing::debug!("Loaded document {:?}", path);
        Ok(FrontMatter::parse(&raw))
    }

    /// Resolve a document path, refusing anything outside the pages directory
    pub fn document_path(&self, file: &str) -> Result<PathBuf, LoadError> {
        let relative = Path::new(file);
        let is_plain = !file.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !is_plain {
            return Err(LoadError::InvalidPath(file.to_string()));
        }

        Ok(self.pages_dir.join(relative))
    }

    /// Build index entries for every markdown document in the pages directory.
    ///
    /// Entries are sorted newest first; undated posts go last.
    pub fn scan_pages(&self, renderer: &MarkdownRenderer) -> anyhow::Result<Vec<Post>> {
        if !self.pages_dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(&self.pages_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            match self.scan_page(path, renderer) {
                Ok(post) => posts.push(post),
                Err(e) => tracing::warn!("Failed to index {:?}: {}", path, e),
            }
        }

        posts.sort_by(newest_first);

        Ok(posts)
    }

    fn scan_page(&self, path: &Path, renderer: &MarkdownRenderer) -> anyhow::Result<Post> {
        let raw = fs::read_to_string(path)?;
        let fm = FrontMatter::parse(&raw);

        // Index entries always use forward slashes
        let file = path
            .strip_prefix(&self.pages_dir)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let mut post = Post::from_front_matter(&file, &fm);
        if post.excerpt.is_none() {
            if let Some(excerpt) = split_excerpt(&fm.body) {
                let text = strip_html(&renderer.render(excerpt)?);
                post.excerpt = Some(truncate(text.trim(), EXCERPT_LENGTH, None));
            }
        }

        Ok(post)
    }
}

/// Order by parsed date, newest first; undated or unparseable dates last
fn newest_first(a: &Post, b: &Post) -> Ordering {
    let a = a.date.as_deref().and_then(parse_date_string);
    let b = b.date.as_deref().and_then(parse_date_string);
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "md" | "markdown"))
        .unwrap_or(false)
}
