//! Tag filtering

use std::borrow::Borrow;
use std::collections::BTreeSet;

use crate::content::Post;

/// Keep the posts carrying `tag`, in input order.
///
/// `None` means "show all" and returns every post. Matching is exact string
/// equality; posts without tags never match a tag.
pub fn apply_tag_filter<P>(posts: &[P], tag: Option<&str>) -> Vec<P>
where
    P: Borrow<Post> + Clone,
{
    match tag {
        None => posts.to_vec(),
        Some(tag) => posts
            .iter()
            .filter(|post| {
                let post: &Post = (*post).borrow();
                post.has_tag(tag)
            })
            .cloned()
            .collect(),
    }
}

/// Every distinct tag across `posts`, sorted ascending.
///
/// Deduplication is case-sensitive, so `Rust` and `rust` are both kept.
pub fn tag_vocabulary<P: Borrow<Post>>(posts: &[P]) -> Vec<String> {
    posts
        .iter()
        .flat_map(|post| {
            let post: &Post = post.borrow();
            post.tags().iter().cloned()
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
