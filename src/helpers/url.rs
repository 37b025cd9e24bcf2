//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left alone by a browser's `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encode a query string component
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Link to a single post page
///
/// # Examples
/// ```ignore
/// post_url("dev/hello world.md") // -> "post.html?file=dev%2Fhello%20world.md"
/// ```
pub fn post_url(file: &str) -> String {
    format!("post.html?file={}", encode_component(file))
}

/// Link to the list page for a tag and search query.
/// Empty values are left out of the query string.
pub fn list_url(tag: Option<&str>, query: &str) -> String {
    let mut params = Vec::new();
    if let Some(tag) = tag.filter(|t| !t.is_empty()) {
        params.push(format!("tag={}", encode_component(tag)));
    }
    if !query.is_empty() {
        params.push(format!("q={}", encode_component(query)));
    }

    if params.is_empty() {
        "index.html".to_string()
    } else {
        format!("index.html?{}", params.join("&"))
    }
}
