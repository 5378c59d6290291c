use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::format::{Format, Toml};

pub const CONFIG_FILE: &str = "config.toml";
pub const CONTENT_DIR: &str = "content";
pub const THEMES_DIR: &str = "themes";
pub const LAYOUTS_DIR: &str = "layouts";
pub const STATIC_DIR: &str = "static";
pub const ARCHETYPE_FILE: &str = "archetypes/post.md";
pub const OUTPUT_DIR: &str = "public";

/// Site-wide settings from `config.toml`. Loaded once and never mutated.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    #[serde(rename = "baseURL")]
    pub base_url: String,
    pub theme: String,
    pub params: Params,
    /// Declared taxonomies mapped to the terms they always list.
    pub taxonomies: BTreeMap<String, Vec<String>>,
    pub build: BuildConfig,
    pub markdown: MarkdownConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Params {
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    pub recursive: bool,
    pub drafts: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub extended: bool,
}

impl SiteConfig {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        Toml::read(path)
    }

    pub fn taxonomy_names(&self) -> impl Iterator<Item = &str> {
        self.taxonomies.keys().map(|name| name.as_str())
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            title: String::new(),
            base_url: String::new(),
            theme: String::new(),
            params: Params::default(),
            taxonomies: BTreeMap::from([
                ("categories".into(), vec![]),
                ("tags".into(), vec![]),
            ]),
            build: BuildConfig::default(),
            markdown: MarkdownConfig::default(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig { recursive: true, drafts: false }
    }
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        MarkdownConfig { extended: true }
    }
}

/// Where a site's inputs live and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    pub root: PathBuf,
    pub output: PathBuf,
}

impl SitePaths {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        SitePaths { output: root.join(OUTPUT_DIR), root }
    }

    pub fn with_output<P: AsRef<Path>>(mut self, output: P) -> Self {
        self.output = self.root.join(output);
        self
    }

    pub fn config(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn content(&self) -> PathBuf {
        self.root.join(CONTENT_DIR)
    }

    pub fn archetype(&self) -> PathBuf {
        self.root.join(ARCHETYPE_FILE)
    }

    pub fn theme(&self, config: &SiteConfig) -> PathBuf {
        self.root.join(THEMES_DIR).join(&config.theme)
    }

    pub fn layouts(&self, config: &SiteConfig) -> PathBuf {
        self.theme(config).join(LAYOUTS_DIR)
    }

    pub fn assets(&self, config: &SiteConfig) -> PathBuf {
        self.theme(config).join(STATIC_DIR)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn recognized_keys_and_defaults() {
        let config: SiteConfig = Toml::from_str(r#"
            title = "Notes"
            baseURL = "https://example.org/"
            theme = "plain"
            unknown = 12

            [params]
            author = "Ada"
        "#).unwrap();

        assert_eq!(config.title, "Notes");
        assert_eq!(config.base_url, "https://example.org/");
        assert_eq!(config.theme, "plain");
        assert_eq!(config.params.author, "Ada");
        assert_eq!(config.taxonomy_names().collect::<Vec<_>>(), ["categories", "tags"]);
        assert!(config.build.recursive);
        assert!(config.markdown.extended);
    }

    #[test]
    fn declared_taxonomies_replace_the_defaults() {
        let config: SiteConfig = Toml::from_str(r#"
            [taxonomies]
            tags = ["tag1", "tag2"]

            [build]
            recursive = false
        "#).unwrap();

        assert_eq!(config.taxonomies.len(), 1);
        assert_eq!(config.taxonomies["tags"], ["tag1", "tag2"]);
        assert!(!config.build.recursive);
    }

    #[test]
    fn paths_are_rooted_at_the_site() {
        let config = SiteConfig { theme: "plain".into(), ..SiteConfig::default() };
        let paths = SitePaths::new("site").with_output("out");
        assert_eq!(paths.output, Path::new("site/out"));
        assert_eq!(paths.layouts(&config), Path::new("site/themes/plain/layouts"));
        assert_eq!(paths.assets(&config), Path::new("site/themes/plain/static"));
    }
}
