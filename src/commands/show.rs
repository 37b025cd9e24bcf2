//! Render a single post page

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::content::ContentLoader;
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Render the post page for `file` in the current theme
pub async fn render_post(blog: &Blog, file: &str) -> Result<String> {
    let loader = ContentLoader::new(blog);
    let fm = loader.load_document(file).await?;

    let theme = blog.theme_controller().current();
    let content = blog
        .markdown_renderer()
        .render_with_theme(&fm.body, blog.config.highlight.theme_for(theme))?;

    TemplateRenderer::new(&blog.config)?.post_page(file, &fm, &content, theme)
}

/// Run the show command, writing to `output` or stdout
pub async fn run(blog: &Blog, file: &str, output: Option<&Path>) -> Result<()> {
    let html = render_post(blog, file).await?;

    match output {
        Some(path) => {
            fs::write(path, html)?;
            println!("Wrote {:?}", path);
        }
        None => println!("{}", html),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_show_writes_output() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        fs::write(
            dir.path().join("pages/post.md"),
            "---\ntitle: Shown\n---\nSome *text*",
        )
        .unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        let output = dir.path().join("out.html");

        run(&blog, "post.md", Some(&output)).await.unwrap();
        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("<title>Shown - Blog</title>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[tokio::test]
    async fn test_show_missing_post() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        let err = render_post(&blog, "nope.md").await.unwrap_err();
        assert!(err.to_string().contains("nope.md"));
    }
}
