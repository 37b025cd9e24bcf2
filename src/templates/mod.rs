//! HTML views for the list page and the post page
//!
//! Pages are Tera templates embedded in the binary. Autoescaping is off;
//! templates escape text explicitly with the `html` filter.

mod scripts;

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tera::{Context, Tera};

use crate::browse::Composer;
use crate::config::SiteConfig;
use crate::content::{fallback_title, FrontMatter, Post};
use crate::helpers::{display_date, html_escape, list_url, post_url};
use crate::theme::Theme;

pub use scripts::CLIENT_SCRIPT;

/// Post fields as the card templates see them
#[derive(Serialize)]
struct CardView<'a> {
    file: &'a str,
    title: &'a str,
    date: Option<&'a str>,
    category: Option<&'a str>,
    excerpt: Option<&'a str>,
    tags: &'a [String],
}

impl<'a> From<&'a Post> for CardView<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            file: &post.file,
            title: &post.title,
            date: post.date.as_deref(),
            category: post.category.as_deref(),
            excerpt: post.excerpt.as_deref(),
            tags: post.tags(),
        }
    }
}

/// Template renderer with the site pages loaded
pub struct TemplateRenderer {
    tera: Tera,
    config: SiteConfig,
}

impl TemplateRenderer {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("macros.html", include_str!("site/macros.html")),
            ("index.html", include_str!("site/index.html")),
            ("load_error.html", include_str!("site/load_error.html")),
            ("post.html", include_str!("site/post.html")),
            ("post_error.html", include_str!("site/post_error.html")),
            // Fragments
            ("card.html", include_str!("site/card.html")),
            ("post_list.html", include_str!("site/post_list.html")),
            ("tag_bar.html", include_str!("site/tag_bar.html")),
        ])?;

        tera.register_filter("html", html_filter);
        tera.register_filter("post_url", post_url_filter);
        tera.register_filter("list_url", list_url_filter);
        tera.register_filter("display_date", display_date_filter);

        Ok(Self {
            tera,
            config: config.clone(),
        })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// One post card in the list
    pub fn post_card(&self, post: &Post) -> Result<String> {
        let mut context = self.fragment_context();
        context.insert("post", &CardView::from(post));
        self.render("card.html", &context)
    }

    /// Cards for the visible posts, or the empty state
    pub fn post_list(&self, posts: &[Arc<Post>]) -> Result<String> {
        let mut context = self.fragment_context();
        context.insert("posts", &cards(posts));
        self.render("post_list.html", &context)
    }

    /// Tag buttons with an "All" entry first. Links keep `query`.
    pub fn tag_bar(&self, tags: &[String], active: Option<&str>, query: &str) -> Result<String> {
        let mut context = self.fragment_context();
        context.insert("tags", tags);
        context.insert("active_tag", active.unwrap_or_default());
        context.insert("query", query);
        self.render("tag_bar.html", &context)
    }

    /// The list page for the composer's current state
    pub fn index_page(&self, composer: &Composer, theme: Theme) -> Result<String> {
        let mut context = self.page_context(&self.config.title, theme);
        context.insert("query", composer.query());
        context.insert("tags", composer.tags());
        context.insert("active_tag", composer.active_tag().unwrap_or_default());
        context.insert("posts", &cards(composer.visible()));
        self.render("index.html", &context)
    }

    /// Terminal state when the post index could not be loaded
    pub fn load_error_page(&self, theme: Theme) -> Result<String> {
        let mut context = self.page_context(&self.config.title, theme);
        context.insert("index_file", &self.config.index_file);
        self.render("load_error.html", &context)
    }

    /// A single post with its rendered markdown body
    pub fn post_page(
        &self,
        file: &str,
        fm: &FrontMatter,
        content_html: &str,
        theme: Theme,
    ) -> Result<String> {
        let title = fm
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| fallback_title(file));

        let mut context = self.page_context(&self.page_title(&title), theme);
        context.insert("title", &title);
        context.insert("category", &fm.category().filter(|c| !c.is_empty()));
        context.insert("date", &fm.date().filter(|d| !d.is_empty()));
        context.insert("tags", fm.tags().unwrap_or_default());
        context.insert("content", content_html);
        context.insert("giscus", &self.config.giscus);
        self.render("post.html", &context)
    }

    /// Error state for a post that could not be shown
    pub fn post_error_page(&self, message: &str, theme: Theme) -> Result<String> {
        let mut context = self.page_context(&self.page_title("Error"), theme);
        context.insert("message", message);
        self.render("post_error.html", &context)
    }

    fn page_title(&self, title: &str) -> String {
        format!("{} - {}", title, self.config.title)
    }

    fn fragment_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("date_format", &self.config.date_format);
        context
    }

    fn page_context(&self, page_title: &str, theme: Theme) -> Context {
        let mut context = self.fragment_context();
        context.insert("page_title", page_title);
        context.insert("site_title", &self.config.title);
        context.insert("language", &self.config.language);
        context.insert("theme", theme.as_str());
        context.insert("script", CLIENT_SCRIPT);
        context
    }
}

fn cards(posts: &[Arc<Post>]) -> Vec<CardView<'_>> {
    posts.iter().map(|post| CardView::from(post.as_ref())).collect()
}

/// Tera filter: escape text for HTML content and attributes
fn html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("html", "value", String, value);
    Ok(tera::Value::String(html_escape(&s)))
}

/// Tera filter: link to a post page
fn post_url_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let file = tera::try_get_value!("post_url", "value", String, value);
    Ok(tera::Value::String(post_url(&file)))
}

/// Tera filter: link to the list page for a tag, keeping an optional `q`
fn list_url_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let tag = tera::try_get_value!("list_url", "value", String, value);
    let query = match args.get("q") {
        Some(val) => tera::try_get_value!("list_url", "q", String, val),
        None => String::new(),
    };
    Ok(tera::Value::String(list_url(Some(&tag), &query)))
}

/// Tera filter: show a post date in the site's date format
fn display_date_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let raw = tera::try_get_value!("display_date", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("display_date", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };
    Ok(tera::Value::String(display_date(&raw, &format)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new(&SiteConfig {
            title: "Test Blog".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_post_card() {
        let post = Post::new("dev/a b.md", "<Hello>")
            .with_date("2024-01-15")
            .with_category("Dev")
            .with_excerpt("Short & sweet")
            .with_tags(["rust"]);
        let html = renderer().post_card(&post).unwrap();

        assert!(html.contains(r#"href="post.html?file=dev%2Fa%20b.md""#));
        assert!(html.contains("&lt;Hello&gt;"));
        assert!(html.contains("2024. 01. 15"));
        assert!(html.contains(r#"<span class="post-card-category">Dev</span>"#));
        assert!(html.contains("Short &amp; sweet"));
        assert!(html.contains(r#"<span class="post-card-tag">rust</span>"#));
    }

    #[test]
    fn test_minimal_card_has_no_optional_parts() {
        let html = renderer().post_card(&Post::new("a.md", "A")).unwrap();
        assert!(html.contains(r#"<h2 class="post-card-title">A</h2>"#));
        assert!(!html.contains("post-card-category"));
        assert!(!html.contains("post-card-date"));
        assert!(!html.contains("post-card-excerpt"));
        assert!(!html.contains("post-card-tags"));
    }

    #[test]
    fn test_post_list() {
        let renderer = renderer();
        assert!(renderer.post_list(&[]).unwrap().contains("No posts found."));

        let posts = vec![
            Arc::new(Post::new("a.md", "Alpha")),
            Arc::new(Post::new("b.md", "Beta")),
        ];
        let html = renderer.post_list(&posts).unwrap();
        assert_eq!(html.matches(r#"<article class="post-card">"#).count(), 2);
        assert!(html.find("Alpha").unwrap() < html.find("Beta").unwrap());
        assert!(!html.contains("No posts found."));
    }

    #[test]
    fn test_tag_bar_marks_active() {
        let renderer = renderer();
        let tags = vec!["C++".to_string(), "rust".to_string()];

        let all = renderer.tag_bar(&tags, None, "").unwrap();
        assert!(all.contains(r#"<a class="tag-btn active" href="index.html" data-tag="">All</a>"#));

        let rust = renderer.tag_bar(&tags, Some("rust"), "").unwrap();
        assert!(rust.contains(r#"<a class="tag-btn" href="index.html" data-tag="">All</a>"#));
        assert!(rust.contains(
            r#"<a class="tag-btn active" href="index.html?tag=rust" data-tag="rust">rust</a>"#
        ));
        assert!(rust.contains(r#"href="index.html?tag=C%2B%2B" data-tag="C++""#));
    }

    #[test]
    fn test_tag_links_keep_query() {
        let tags = vec!["web".to_string()];
        let html = renderer().tag_bar(&tags, Some("web"), "css grid").unwrap();
        assert!(html.contains(r#"href="index.html?q=css%20grid" data-tag="">All</a>"#));
        assert!(html.contains(r#"href="index.html?tag=web&amp;q=css%20grid" data-tag="web""#));
    }

    #[test]
    fn test_index_page_reflects_composer() {
        let mut composer = Composer::new(vec![
            Post::new("a.md", "Alpha").with_tags(["x"]),
            Post::new("b.md", "Beta"),
        ]);
        composer.select_tag(Some("x".to_string()));
        composer.set_query("alp");

        let html = renderer().index_page(&composer, Theme::Dark).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"data-theme="dark""#));
        assert!(html.contains("<title>Test Blog</title>"));
        assert!(html.contains(r#"value="alp""#));
        assert!(html.contains(r#"data-active-tag="x""#));
        assert!(html.contains(r#"href="index.html?tag=x&amp;q=alp""#));
        assert!(html.contains("Alpha"));
        assert!(!html.contains("Beta"));
        assert!(html.contains("/__search"));
    }

    #[test]
    fn test_post_page() {
        let fm = FrontMatter::parse(
            "---\ntitle: Hello\ndate: 2024-03-01\ncategory: Notes\ntags: [a, b]\n---\nbody",
        );
        let html = renderer()
            .post_page("hello.md", &fm, "<p>body</p>", Theme::Light)
            .unwrap();

        assert!(html.contains("<title>Hello - Test Blog</title>"));
        assert!(html.contains(r#"<span class="post-category">Notes</span>"#));
        assert!(html.contains("2024. 03. 01"));
        assert!(html.contains(r#"<a href="index.html?tag=b" class="post-tag">b</a>"#));
        assert!(html.contains("<p>body</p>"));
        assert!(!html.contains("giscus.app/client.js"));
    }

    #[test]
    fn test_post_page_title_falls_back_to_file() {
        let fm = FrontMatter::parse("No header");
        let html = renderer()
            .post_page("drafts/idea.md", &fm, "", Theme::Light)
            .unwrap();
        assert!(html.contains("<title>drafts/idea - Test Blog</title>"));
        assert!(!html.contains("post-category"));
        assert!(!html.contains("post-date"));
    }

    #[test]
    fn test_giscus_follows_theme() {
        let mut config = SiteConfig::default();
        config.giscus.enable = true;
        config.giscus.repo = "me/blog".to_string();
        config.giscus.strict = true;
        let fm = FrontMatter::parse("text");

        let html = TemplateRenderer::new(&config)
            .unwrap()
            .post_page("a.md", &fm, "", Theme::Dark)
            .unwrap();
        assert!(html.contains(r#"src="https://giscus.app/client.js""#));
        assert!(html.contains(r#"data-repo="me/blog""#));
        assert!(html.contains(r#"data-strict="1""#));
        assert!(html.contains(r#"data-reactions-enabled="1""#));
        assert!(html.contains(r#"data-theme="dark" data-lang="#));
    }

    #[test]
    fn test_error_pages() {
        let renderer = renderer();
        let post_error = renderer
            .post_error_page("Post not found: <x>.md", Theme::Light)
            .unwrap();
        assert!(post_error.contains("Post not found: &lt;x&gt;.md"));
        assert!(post_error.contains("<title>Error - Test Blog</title>"));
        assert!(post_error.contains(r#"href="index.html""#));

        let list_error = renderer.load_error_page(Theme::Light).unwrap();
        assert!(list_error.contains("Failed to load posts."));
        assert!(list_error.contains("Check that posts.json exists."));
    }

    #[test]
    fn test_unparseable_date_shown_as_written() {
        let post = Post::new("a.md", "A").with_date("someday");
        let html = renderer().post_card(&post).unwrap();
        assert!(html.contains("someday</span>"));
    }
}
