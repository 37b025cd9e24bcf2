//! List page browsing: tag filter, text search and their composition
//!
//! The visible set is always `search(filter(all_posts, active_tag), query)`.
//! [`Composer`] owns that state; [`Debouncer`] rate-limits the text input that
//! feeds it.

mod composer;
mod debounce;
mod filter;
mod search;

pub use composer::Composer;
pub use debounce::Debouncer;
pub use filter::{apply_tag_filter, tag_vocabulary};
pub use search::{apply_search, matches_query, normalize_query};
