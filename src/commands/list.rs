//! List posts from the post index

use anyhow::Result;
use std::collections::BTreeMap;

use crate::browse::Composer;
use crate::content::ContentLoader;
use crate::helpers::display_date;
use crate::Blog;

/// What to print
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub tag: Option<String>,
    pub query: Option<String>,
    /// Print the tag vocabulary with post counts instead of posts
    pub tags: bool,
}

/// List the posts visible for the given tag and query
pub async fn run(blog: &Blog, options: &ListOptions) -> Result<()> {
    let loader = ContentLoader::new(blog);
    let composer = Composer::new(loader.load_posts().await?);

    if options.tags {
        for line in tag_lines(&composer) {
            println!("{}", line);
        }
        return Ok(());
    }

    for line in post_lines(blog, &compose(composer, options)) {
        println!("{}", line);
    }

    Ok(())
}

fn compose(mut composer: Composer, options: &ListOptions) -> Composer {
    composer.select_tag(options.tag.clone().filter(|t| !t.is_empty()));
    if let Some(query) = &options.query {
        composer.set_query(query);
    }
    composer
}

fn post_lines(blog: &Blog, composer: &Composer) -> Vec<String> {
    let visible = composer.visible();
    let mut lines = vec![format!("Posts ({}):", visible.len())];
    for post in visible {
        let date = post
            .date
            .as_deref()
            .map(|d| display_date(d, &blog.config.date_format))
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!("  {} - {} [{}]", date, post.title, post.file));
    }
    lines
}

fn tag_lines(composer: &Composer) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for post in composer.posts() {
        for tag in post.tags() {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut lines = vec![format!("Tags ({}):", composer.tags().len())];
    for tag in composer.tags() {
        let count = counts.get(tag.as_str()).copied().unwrap_or(0);
        lines.push(format!("  {} ({})", tag, count));
    }
    lines
}
