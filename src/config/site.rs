//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::theme::Theme;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // Content
    /// Post index, relative to the site directory
    pub index_file: String,
    /// Directory holding the markdown documents
    pub pages_dir: String,

    // Writing
    pub date_format: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // List page
    #[serde(default)]
    pub search: SearchConfig,

    // Appearance
    #[serde(default)]
    pub theme: ThemeConfig,

    // Comments
    #[serde(default)]
    pub giscus: GiscusConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            index_file: "posts.json".to_string(),
            pages_dir: "pages".to_string(),

            date_format: "YYYY. MM. DD".to_string(),
            highlight: HighlightConfig::default(),

            search: SearchConfig::default(),
            theme: ThemeConfig::default(),
            giscus: GiscusConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub line_number: bool,
    /// syntect theme used while the light theme is active
    pub light_theme: String,
    /// syntect theme used while the dark theme is active
    pub dark_theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            line_number: false,
            light_theme: "InspiredGitHub".to_string(),
            dark_theme: "base16-ocean.dark".to_string(),
        }
    }
}

impl HighlightConfig {
    /// syntect theme matching the page theme
    pub fn theme_for(&self, theme: Theme) -> &str {
        match theme {
            Theme::Light => &self.light_theme,
            Theme::Dark => &self.dark_theme,
        }
    }
}

/// Search box configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet interval before a typed query is applied
    pub debounce_ms: u64,
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

/// Theme preference storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Preference file, relative to the site directory
    pub store_path: String,
    pub storage_key: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            store_path: ".blogfront/preferences.json".to_string(),
            storage_key: "blog-theme".to_string(),
        }
    }
}

/// giscus comment widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GiscusConfig {
    pub enable: bool,
    pub repo: String,
    pub repo_id: String,
    pub category: String,
    pub category_id: String,
    pub mapping: String,
    pub strict: bool,
    pub reactions_enabled: bool,
    pub emit_metadata: bool,
    pub input_position: String,
    pub lang: String,
}

impl Default for GiscusConfig {
    fn default() -> Self {
        Self {
            enable: false,
            repo: String::new(),
            repo_id: String::new(),
            category: "General".to_string(),
            category_id: String::new(),
            mapping: "pathname".to_string(),
            strict: false,
            reactions_enabled: true,
            emit_metadata: true,
            input_position: "top".to_string(),
            lang: "en".to_string(),
        }
    }
}
