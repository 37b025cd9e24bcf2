//! Content module - post index, documents and markdown processing

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::{parse_tags_lenient, FrontMatter, MetaValue};
pub use loader::{ContentLoader, LoadError};
pub use markdown::{split_excerpt, MarkdownRenderer};
pub use post::{fallback_title, Post};
