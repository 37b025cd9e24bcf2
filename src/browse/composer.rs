//! Composition of the tag filter and the text search

use std::sync::Arc;

use super::filter::{apply_tag_filter, tag_vocabulary};
use super::search::{apply_search, normalize_query};
use crate::content::Post;

/// State of the list page.
///
/// Tag clicks and search input are two independent entry points. A tag click
/// narrows the *universe* the search runs over; a query change re-runs the
/// search over the current universe. Both end in [`Composer::render`], so the
/// visible set always honors the active tag and the query together.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    posts: Vec<Arc<Post>>,
    tags: Vec<String>,
    active_tag: Option<String>,
    universe: Vec<Arc<Post>>,
    query: String,
    visible: Vec<Arc<Post>>,
}

impl Composer {
    /// Create a composer over a freshly loaded collection
    pub fn new<I>(posts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<Post>>,
    {
        let mut composer = Self::default();
        composer.load(posts);
        composer
    }

    /// Replace the collection.
    ///
    /// Resets the tag filter and the query and recomputes the tag vocabulary.
    pub fn load<I>(&mut self, posts: I)
    where
        I: IntoIterator,
        I::Item: Into<Arc<Post>>,
    {
        self.posts = posts.into_iter().map(Into::into).collect();
        self.tags = tag_vocabulary(&self.posts);
        self.active_tag = None;
        self.query.clear();
        self.universe = self.posts.clone();
        self.render();
    }

    /// Select a tag (or `None` for all posts) and re-run the current query
    /// against the new universe.
    pub fn select_tag(&mut self, tag: Option<String>) -> &[Arc<Post>] {
        let universe = apply_tag_filter(&self.posts, tag.as_deref());
        self.active_tag = tag;
        self.set_universe(universe)
    }

    /// Replace the set the text search runs over
    pub fn set_universe(&mut self, universe: Vec<Arc<Post>>) -> &[Arc<Post>] {
        self.universe = universe;
        self.render()
    }

    /// Change the search query and re-run it against the current universe
    pub fn set_query(&mut self, query: &str) -> &[Arc<Post>] {
        self.query = normalize_query(query);
        self.render()
    }

    /// Clear the query immediately
    pub fn clear_query(&mut self) -> &[Arc<Post>] {
        self.set_query("")
    }

    fn render(&mut self) -> &[Arc<Post>] {
        self.visible = apply_search(&self.universe, &self.query);
        tracing::trace!(
            "Visible {} of {} posts (tag={:?}, query={:?})",
            self.visible.len(),
            self.posts.len(),
            self.active_tag,
            self.query
        );
        &self.visible
    }

    /// Posts currently shown
    pub fn visible(&self) -> &[Arc<Post>] {
        &self.visible
    }

    /// Full collection
    pub fn posts(&self) -> &[Arc<Post>] {
        &self.posts
    }

    /// Tag vocabulary computed at load time
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn active_tag(&self) -> Option<&str> {
        self.active_tag.as_deref()
    }

    /// Normalized query
    pub fn query(&self) -> &str {
        &self.query
    }
}
