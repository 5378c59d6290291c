mod binding;
mod engine;
mod partials;

pub use binding::*;
pub use partials::{Partials, PARTIALS_DIR};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use minijinja::Environment;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::error::{Chainable, Result};
use crate::fstree::FsTree;
use crate::util::PathExt;

/// Logical name of the template every content page renders with.
pub const BASE_TEMPLATE: &str = "base";
/// Logical name of the taxonomy listing template.
pub const TERMS_TEMPLATE: &str = "taxonomy/terms";
/// Directory under the layouts root whose files keep their relative path as
/// their logical name.
pub const TAXONOMY_DIR: &str = "taxonomy";

/// The theme's compiled layouts, keyed by logical name, and its partials.
///
/// Built once per build. Nothing mutates it afterwards, so it's shared by
/// reference across page workers. The only interior state is the partial
/// cache, which locks internally.
#[derive(Debug)]
pub struct TemplateSet {
    env: Environment<'static>,
    layouts: FxHashMap<String, PathBuf>,
    partials: Arc<Partials>,
}

/// The logical name of the layout at `relative`, a path relative to the
/// layouts root: `taxonomy/<stem>` for files under `taxonomy/`, otherwise the
/// file stem.
pub fn logical_name(relative: &Path) -> String {
    if relative.starts_with(TAXONOMY_DIR) {
        return relative.without_extension().to_slash_string();
    }

    relative.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl TemplateSet {
    /// Compiles every partial and layout under `root`.
    ///
    /// Fails only when `root` can't be read. A layout or partial that can't be
    /// read or compiled is skipped with a warning, as is a second layout
    /// claiming a logical name already taken.
    pub fn load<P: AsRef<Path>>(root: P, config: &SiteConfig) -> Result<Self> {
        let root = root.as_ref();
        let tree = FsTree::build(root).chain_with(|| error! {
            "failed to read theme layouts",
            "layouts root" => root.display(),
        })?;

        let mut partials = Partials::default();
        let mut layouts = vec![];
        for entry in tree.files() {
            let relative = entry.relative_path();
            if let Ok(partial) = relative.strip_prefix(PARTIALS_DIR) {
                if let Err(e) = partials.add(entry, partial) {
                    tracing::warn!("skipping partial:\n{e}");
                }
            } else if entry.file_ext() == Some("html") {
                layouts.push(entry);
            }
        }

        let partials = Arc::new(partials);
        let mut set = TemplateSet {
            env: engine::environment(config, partials.clone()),
            layouts: FxHashMap::default(),
            partials,
        };

        for entry in layouts {
            if let Err(e) = set.add_layout(logical_name(entry.relative_path()), &entry.path) {
                tracing::warn!("skipping layout:\n{e}");
            }
        }

        tracing::debug!(layouts = set.layouts.len(), partials = set.partials.len(), "templates loaded");
        Ok(set)
    }

    fn add_layout(&mut self, name: String, path: &Path) -> Result<()> {
        if let Some(existing) = self.layouts.get(&name) {
            return err! {
                "duplicate layout name",
                "name" => name,
                "kept" => existing.display(),
                "skipped" => path.display(),
            };
        }

        let source = fs::read_to_string(path).chain_with(|| error! {
            "failed to read layout",
            "path" => path.display(),
        })?;

        self.env.add_template_owned(name.clone(), source).chain_with(|| error! {
            "failed to compile layout",
            "path" => path.display(),
        })?;

        self.layouts.insert(name, path.to_path_buf());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    /// Logical names of every layout that compiled, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(|name| name.as_str())
    }

    pub fn partials(&self) -> &Partials {
        &self.partials
    }

    /// Renders the layout `name` with `binding`.
    pub fn render<S: Serialize>(&self, name: &str, binding: S) -> Result<String> {
        if !self.contains(name) {
            return err!("template not found", "name" => name);
        }

        self.env.get_template(name)
            .and_then(|template| template.render(binding))
            .chain_with(|| error!("failed to render template", "name" => name))
    }
}
