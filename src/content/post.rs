//! Post index records

use serde::{Deserialize, Serialize};

use super::FrontMatter;

/// One entry of the post index (`posts.json`)
///
/// Identity is `file`, the document path relative to the pages directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Document path relative to the pages directory
    pub file: String,

    /// Post title
    #[serde(default)]
    pub title: String,

    /// Publication date, ISO-like
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Short summary shown on the post card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Post tags; `None` when the post declares no tags at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(file: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            title: title.into(),
            date: None,
            excerpt: None,
            description: None,
            category: None,
            tags: None,
        }
    }

    /// Build an index entry from a parsed document.
    ///
    /// The title falls back to the file path without its `.md` extension.
    pub fn from_front_matter(file: &str, fm: &FrontMatter) -> Self {
        Self {
            file: file.to_string(),
            title: fm
                .title()
                .map(str::to_string)
                .unwrap_or_else(|| fallback_title(file)),
            date: fm.date().map(str::to_string),
            excerpt: fm.excerpt().map(str::to_string),
            description: fm.description().map(str::to_string),
            category: fm.category().map(str::to_string),
            tags: fm.tags().map(<[String]>::to_vec),
        }
    }

    /// Tags as a slice, empty when the post has none
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }

    /// Whether the post carries exactly this tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }

    /// Builder-style helpers, mostly for tests and tooling
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Title used when a document has none: the file path with `.md` removed
pub fn fallback_title(file: &str) -> String {
    file.replacen(".md", "", 1)
}
