use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rustc_hash::FxHashMap;

use crate::error::{Chainable, Result};
use crate::fstree::Entry;
use crate::util::PathExt;

/// Directory under the layouts root holding partial templates.
pub const PARTIALS_DIR: &str = "partials";

/// The theme's partial templates, keyed by name: the path below `partials/`
/// without its extension, e.g. `header` or `nav/menu`.
///
/// Partials are validated when added. The bundle also backs the template
/// loader that `partial_cached` goes through, which compiles each partial at
/// most once; [`Partials::compilations()`] counts how often that happened.
#[derive(Debug, Default)]
pub struct Partials {
    sources: FxHashMap<String, Arc<str>>,
    compilations: AtomicUsize,
}

impl Partials {
    /// The name a partial is registered under in the template environment.
    pub fn template_name(name: &str) -> String {
        format!("{PARTIALS_DIR}/{name}")
    }

    /// Reads and validates the partial at `entry`, whose path relative to the
    /// partials directory is `relative`. Invalid partials are not added.
    pub(crate) fn add(&mut self, entry: &Entry, relative: &std::path::Path) -> Result<()> {
        let name = relative.without_extension().to_slash_string();
        let source = fs::read_to_string(&entry.path).chain_with(|| error! {
            "failed to read partial template",
            "path" => entry.path.display(),
        })?;

        minijinja::Environment::new()
            .template_from_named_str(&name, &source)
            .chain_with(|| error! {
                "failed to compile partial template",
                "path" => entry.path.display(),
            })?;

        self.sources.insert(name, source.into());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.sources.get(name).map(|source| &**source)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Template loader entry point: the source for a `partials/<name>`
    /// template, if the bundle has it.
    pub(crate) fn load(&self, template_name: &str) -> Option<String> {
        let name = template_name.strip_prefix(PARTIALS_DIR)?.strip_prefix('/')?;
        let source = self.sources.get(name)?;
        self.compilations.fetch_add(1, Ordering::Relaxed);
        Some(source.to_string())
    }

    /// How many partials the loader has handed out for compilation.
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }
}
