//! blogfront: a markdown blog front end
//!
//! Loads a post index and markdown documents, filters the list by tag,
//! searches it as you type, renders posts with syntax highlighting and keeps a
//! light/dark theme preference in sync with an embedded comment widget.

pub mod browse;
pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod server;
pub mod templates;
pub mod theme;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A blog site on disk
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Post index file
    pub index_path: PathBuf,
    /// Markdown documents directory
    pub pages_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a Blog with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let index_path = base_dir.join(&config.index_file);
        let pages_dir = base_dir.join(&config.pages_dir);

        Self {
            config,
            base_dir,
            index_path,
            pages_dir,
        }
    }

    /// Path of the saved theme preference file
    pub fn preference_path(&self) -> PathBuf {
        self.base_dir.join(&self.config.theme.store_path)
    }

    /// Theme controller backed by the site's preference file
    pub fn theme_controller(&self) -> theme::ThemeController {
        theme::ThemeController::new(
            Some(Box::new(theme::FileStore::new(self.preference_path()))),
            Box::new(theme::EnvPreference),
            self.config.theme.storage_key.clone(),
        )
    }

    /// Markdown renderer configured for this site
    pub fn markdown_renderer(&self) -> content::MarkdownRenderer {
        content::MarkdownRenderer::with_options(
            &self.config.highlight.light_theme,
            self.config.highlight.line_number,
        )
    }
}
