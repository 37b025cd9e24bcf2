//! Markdown rendering with syntax highlighting

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::helpers::html_escape;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render markdown to HTML using the default highlight theme
    pub fn render(&self, markdown: &str) -> Result<String> {
        self.render_with_theme(markdown, &self.theme_name)
    }

    /// Render markdown to HTML, highlighting code with the named syntect theme.
    ///
    /// GFM extensions are on and single newlines inside a paragraph become
    /// `<br />`.
    pub fn render_with_theme(&self, markdown: &str, theme_name: &str) -> Result<String> {
        // Front-matter is stripped by FrontMatter::parse before we get here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<Option<String>> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|lang| lang.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(lang);
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_block.take().flatten();
                    let highlighted =
                        self.highlight_code(&code_block_content, lang.as_deref(), theme_name);
                    events.push(Event::Html(CowStr::from(highlighted)));
                }
                Event::Text(text) if code_block.is_some() => {
                    code_block_content.push_str(&text);
                }
                Event::SoftBreak if code_block.is_none() => {
                    events.push(Event::HardBreak);
                }
                _ => {
                    if code_block.is_none() {
                        events.push(event);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    fn theme(&self, name: &str) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(name)
            .or_else(|| self.theme_set.themes.get(&self.theme_name))
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Highlight a code block.
    ///
    /// Blocks without a known language are emitted escaped and unstyled.
    fn highlight_code(&self, code: &str, lang: Option<&str>, theme_name: &str) -> String {
        let plain = |lang: &str| {
            format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                html_escape(code)
            )
        };

        let Some(lang) = lang else {
            return format!("<pre><code>{}</code></pre>", html_escape(code));
        };

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang));
        let (Some(syntax), Some(theme)) = (syntax, self.theme(theme_name)) else {
            return plain(lang);
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => {
                if self.line_numbers {
                    add_line_numbers(&highlighted, code.lines().count(), lang)
                } else {
                    format!(
                        r#"<div class="highlight language-{}">{}</div>"#,
                        html_escape(lang),
                        highlighted
                    )
                }
            }
            Err(e) => {
                tracing::warn!("Failed to highlight {} block: {}", lang, e);
                plain(lang)
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Add a line number gutter next to highlighted code
fn add_line_numbers(highlighted: &str, line_count: usize, lang: &str) -> String {
    let gutter = (1..=line_count)
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        html_escape(lang),
        gutter, highlighted
    )
}

/// Split a leading excerpt marked by `<!-- more -->`
pub fn split_excerpt(content: &str) -> Option<&str> {
    content
        .find("<!-- more -->")
        .map(|pos| content[..pos].trim())
}
