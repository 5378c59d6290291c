use std::fmt;
use std::fs;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::assets::{self, MirrorReport};
use crate::config::{SiteConfig, SitePaths};
use crate::error::{Chainable, Error, Result};
use crate::fstree::{Depth, Entry, FsTree, Hidden};
use crate::markdown::{self, Markdown, RuleSet};
use crate::page::{PageRenderer, RenderedPage};
use crate::taxonomy::{self, PageIndex, TaxonomyReport};
use crate::templating::{SiteBinding, TemplateSet};

/// The stages a build moves through, in order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Init,
    ConfigLoaded,
    TemplatesLoaded,
    PagesRendering,
    PagesDone,
    TaxonomiesRendering,
    AssetsMirroring,
    Done,
}

/// A build that stopped: `stage` is where it was when `error` occurred. Only
/// `Init`, `ConfigLoaded`, and `TemplatesLoaded` fail this way.
#[derive(Debug)]
pub struct BuildFailure {
    pub stage: Stage,
    pub error: Error,
}

/// Settings that take precedence over `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub recursive: Option<bool>,
    pub drafts: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub pages: usize,
    pub failed_pages: usize,
    pub drafts: usize,
    pub non_pages: usize,
    pub taxonomy_pages: usize,
    pub failed_taxonomy_pages: usize,
    pub assets: usize,
    pub failed_assets: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub stats: BuildStats,
    pub elapsed: Duration,
}

/// One run of the pipeline over a site.
#[derive(Debug)]
pub struct Build {
    paths: SitePaths,
    options: BuildOptions,
    stage: Stage,
    start: Instant,
}

/// What page workers share. Everything but the two mutexes is read-only.
struct Workers<'a> {
    renderer: PageRenderer<'a>,
    markdown: Markdown,
    drafts: bool,
    stats: Mutex<BuildStats>,
    index: Mutex<PageIndex>,
}

enum Outcome {
    Rendered,
    Draft,
}

/// Builds the site at `paths`.
pub fn build(paths: SitePaths, options: BuildOptions) -> Result<BuildReport, BuildFailure> {
    Build::new(paths, options).run()
}

impl Build {
    pub fn new(paths: SitePaths, options: BuildOptions) -> Self {
        Build { paths, options, stage: Stage::Init, start: Instant::now() }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "{} cannot follow {}", next, self.stage);
        tracing::debug!(from = %self.stage, to = %next, "build stage");
        self.stage = next;
    }

    fn fail(&self, error: Error) -> BuildFailure {
        BuildFailure { stage: self.stage, error }
    }

    pub fn run(mut self) -> Result<BuildReport, BuildFailure> {
        let config = self.load_config().map_err(|e| self.fail(e))?;
        self.advance(Stage::ConfigLoaded);

        let templates = TemplateSet::load(self.paths.layouts(&config), &config)
            .map_err(|e| self.fail(e))?;
        self.advance(Stage::TemplatesLoaded);

        let content = self.discover(&config).map_err(|e| self.fail(e))?;
        self.advance(Stage::PagesRendering);

        let output = self.paths.output.clone();
        let site = SiteBinding::new(&config);
        let (documents, others): (Vec<&Entry>, Vec<&Entry>) = content.files()
            .partition(|entry| markdown::is_document(entry.file_ext()));

        let workers = Workers {
            renderer: PageRenderer { config: &config, site: &site, templates: &templates, output: &output },
            markdown: Markdown::new(RuleSet::from(config.markdown.extended)),
            drafts: config.build.drafts,
            stats: Mutex::new(BuildStats { non_pages: others.len(), ..BuildStats::default() }),
            index: Mutex::new(PageIndex::from_config(&config)),
        };

        documents.par_iter().for_each(|entry| workers.process(entry));
        self.advance(Stage::PagesDone);

        let Workers { stats, index, .. } = workers;
        let mut stats = stats.into_inner();
        let mut index = index.into_inner();
        index.sort();
        tracing::info!(pages = stats.pages, failed = stats.failed_pages, "pages rendered");

        self.advance(Stage::TaxonomiesRendering);
        let TaxonomyReport { rendered, failed } =
            taxonomy::render_taxonomies(&index, &templates, &site, &output);
        stats.taxonomy_pages = rendered;
        stats.failed_taxonomy_pages = failed;

        self.advance(Stage::AssetsMirroring);
        let MirrorReport { copied, failed } = assets::mirror(self.paths.assets(&config), &output);
        stats.assets = copied;
        stats.failed_assets = failed;

        self.advance(Stage::Done);
        Ok(BuildReport { stats, elapsed: self.start.elapsed() })
    }

    fn load_config(&self) -> Result<SiteConfig> {
        let mut config = SiteConfig::read(self.paths.config())?;
        if let Some(recursive) = self.options.recursive {
            config.build.recursive = recursive;
        }

        if let Some(drafts) = self.options.drafts {
            config.build.drafts = drafts;
        }

        Ok(config)
    }

    /// Walks the content root, hidden files excluded, and makes sure the
    /// output root exists.
    fn discover(&self, config: &SiteConfig) -> Result<FsTree> {
        let depth = match config.build.recursive {
            true => Depth::Recursive,
            false => Depth::Shallow,
        };

        let content_root = self.paths.content();
        let content = FsTree::build_with(&content_root, depth, Hidden::Skip).chain_with(|| error! {
            "failed to read content",
            "content root" => content_root.display(),
        })?;

        fs::create_dir_all(&self.paths.output).chain_with(|| error! {
            "failed to create output directory",
            "path" => self.paths.output.display(),
        })?;

        Ok(content)
    }
}

impl Workers<'_> {
    fn process(&self, entry: &Entry) {
        match self.render(entry) {
            Ok(Outcome::Rendered) => self.stats.lock().pages += 1,
            Ok(Outcome::Draft) => self.stats.lock().drafts += 1,
            Err(e) => {
                tracing::error!("{e}");
                self.stats.lock().failed_pages += 1;
            }
        }
    }

    fn render(&self, entry: &Entry) -> Result<Outcome> {
        let source = entry.relative_path();
        let bytes = fs::read(&entry.path)
            .chain_with(|| error!("failed to read document", "path" => source.display()))?;

        let text = std::str::from_utf8(&bytes)
            .chain_with(|| error!("document is not valid UTF-8", "path" => source.display()))?;

        let (page, warning) = RenderedPage::new(source, text, &self.markdown);
        if let Some(e) = warning {
            tracing::warn!("using default front matter for {}:\n{e}", source.display());
        }

        if page.front_matter.draft && !self.drafts {
            tracing::debug!(path = %source.display(), "skipping draft");
            return Ok(Outcome::Draft);
        }

        let written = self.renderer.write(&page)
            .chain_with(|| error!("failed to render page", "path" => source.display()))?;

        self.index.lock().add_page(&page.front_matter, &page.summary());
        tracing::debug!(path = %written.display(), "wrote page");
        Ok(Outcome::Rendered)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::ConfigLoaded => "config loaded",
            Stage::TemplatesLoaded => "templates loaded",
            Stage::PagesRendering => "pages rendering",
            Stage::PagesDone => "pages done",
            Stage::TaxonomiesRendering => "taxonomies rendering",
            Stage::AssetsMirroring => "assets mirroring",
            Stage::Done => "done",
        };

        f.write_str(name)
    }
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let next = match self.stage {
            Stage::Init => "loading the site config",
            Stage::ConfigLoaded => "loading templates",
            _ => "discovering content",
        };

        write!(f, "build failed while {next}:\n{}", self.error)
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.stats;
        writeln!(f, "--- Build Statistics ---")?;
        writeln!(f, "Pages: {} ({} failed, {} drafts skipped)", stats.pages, stats.failed_pages, stats.drafts)?;
        writeln!(f, "Non-page files: {}", stats.non_pages)?;
        writeln!(f, "Taxonomy pages: {} ({} failed)", stats.taxonomy_pages, stats.failed_taxonomy_pages)?;
        writeln!(f, "Static files: {} ({} failed)", stats.assets, stats.failed_assets)?;
        write!(f, "Total build time: {}ms", self.elapsed.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::Init < Stage::ConfigLoaded);
        assert!(Stage::PagesDone < Stage::TaxonomiesRendering);
        assert!(Stage::AssetsMirroring < Stage::Done);
    }

    #[test]
    fn report_lists_every_count() {
        let report = BuildReport {
            stats: BuildStats { pages: 3, failed_pages: 1, non_pages: 2, assets: 4, ..BuildStats::default() },
            elapsed: Duration::from_millis(12),
        };

        let text = report.to_string();
        assert!(text.contains("Pages: 3 (1 failed, 0 drafts skipped)"));
        assert!(text.contains("Non-page files: 2"));
        assert!(text.contains("Static files: 4 (0 failed)"));
        assert!(text.ends_with("Total build time: 12ms"));
    }

    #[test]
    fn missing_config_fails_at_init() {
        let dir = tempfile::tempdir().unwrap();
        let failure = build(SitePaths::new(dir.path()), BuildOptions::default()).unwrap_err();
        assert_eq!(failure.stage, Stage::Init);
        assert!(failure.to_string().starts_with("build failed while loading the site config"));
    }
}
