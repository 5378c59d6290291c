use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::error::{Chainable, Error, Result};
use crate::markdown::{self, FrontMatter, Html, Markdown};
use crate::taxonomy::PageSummary;
use crate::templating::{PageBinding, SiteBinding, TemplateSet, BASE_TEMPLATE};
use crate::util::PathExt;

/// A content document after front-matter extraction and Markdown rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub front_matter: FrontMatter,
    pub html: Html,
    /// Path of the source document relative to the content root.
    pub source: PathBuf,
}

impl RenderedPage {
    /// Renders the document `text` found at `source`. Front matter that
    /// couldn't be used is returned alongside the page, which then carries
    /// default front matter and the whole text as its body.
    pub fn new(source: &Path, text: &str, markdown: &Markdown) -> (Self, Option<Error>) {
        let extracted = markdown::extract(text);
        let page = RenderedPage {
            html: markdown.render(extracted.body),
            front_matter: extracted.front_matter,
            source: source.to_path_buf(),
        };

        (page, extracted.error)
    }

    /// Output path relative to the output root.
    pub fn destination(&self) -> PathBuf {
        self.source.html_destination()
    }

    /// Site-relative URL of the output.
    pub fn url(&self) -> String {
        format!("/{}", self.destination().to_slash_string())
    }

    pub fn summary(&self) -> PageSummary {
        PageSummary::new(&self.front_matter, &self.html.excerpt, &self.url())
    }
}

/// Writes content pages through the `base` layout.
#[derive(Debug, Clone, Copy)]
pub struct PageRenderer<'a> {
    pub config: &'a SiteConfig,
    pub site: &'a SiteBinding,
    pub templates: &'a TemplateSet,
    pub output: &'a Path,
}

impl PageRenderer<'_> {
    /// Renders `page` with `base` and writes it under the output root,
    /// returning the path written.
    pub fn write(&self, page: &RenderedPage) -> Result<PathBuf> {
        let url = page.url();
        let binding = PageBinding::new(self.site, self.config, &page.front_matter, &page.html.content, &url);
        let html = self.templates.render(BASE_TEMPLATE, &binding)?;

        let destination = self.output.join(page.destination());
        write_file(&destination, &html)?;
        Ok(destination)
    }
}

/// Writes `contents` to `path`, creating missing parent directories first.
/// Directories that already exist, including ones created concurrently, are
/// not an error.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).chain_with(|| error! {
            "failed to create output directory",
            "path" => parent.display(),
        })?;
    }

    fs::write(path, contents).chain_with(|| error! {
        "failed to write output file",
        "path" => path.display(),
    })
}
