//! Case-insensitive substring search

use std::borrow::Borrow;

use crate::content::Post;

/// Lowercase and trim a raw query
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Whether any searchable field contains an already-normalized query.
///
/// Searched fields: title, description, excerpt, category and every tag.
pub fn matches_query(post: &Post, normalized: &str) -> bool {
    if normalized.is_empty() {
        return true;
    }

    let contains = |field: &str| field.to_lowercase().contains(normalized);

    contains(&post.title)
        || post.description.as_deref().is_some_and(contains)
        || post.excerpt.as_deref().is_some_and(contains)
        || post.category.as_deref().is_some_and(contains)
        || post.tags().iter().any(|tag| contains(tag))
}

/// Keep the posts matching `query`, in input order.
///
/// A query that is empty after trimming returns every post.
pub fn apply_search<P>(posts: &[P], query: &str) -> Vec<P>
where
    P: Borrow<Post> + Clone,
{
    let normalized = normalize_query(query);
    if normalized.is_empty() {
        return posts.to_vec();
    }

    posts
        .iter()
        .filter(|post| {
            let post: &Post = (*post).borrow();
            matches_query(post, &normalized)
        })
        .cloned()
        .collect()
}
