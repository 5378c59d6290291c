//! A parallel static site build pipeline.
//!
//! # Overview
//!
//! Quire turns a site directory into static HTML. A site looks like:
//!
//! ```text
//! site/
//!   config.toml            title, baseURL, theme, [params], [taxonomies]
//!   content/               Markdown documents with optional front matter
//!   archetypes/post.md     skeleton for `new` documents (optional)
//!   themes/<theme>/
//!     layouts/             `base.html`, `partials/`, `taxonomy/`
//!     static/              copied verbatim into the output
//!   public/                output
//! ```
//!
//! A build is a short sequence of stages, see [`build::Stage`]:
//!
//! 1. The site config is read. Without it nothing else can happen.
//! 2. The theme's layouts are compiled into a [`TemplateSet`]. Partials are
//!    available to every layout through `partial()` and `partial_cached()`.
//! 3. Content documents are rendered in parallel: front matter is extracted,
//!    the body is rendered as Markdown, and the result is written through the
//!    `base` layout. Every page is also recorded in a [`taxonomy::PageIndex`].
//! 4. Taxonomy listing and term pages are written from the finished index.
//! 5. Static assets are mirrored into the output.
//!
//! Failures in the first three stages abort the build. After that, a failure
//! affects only the file it occurred on: it is logged, counted in the final
//! [`BuildReport`], and the build carries on.

#[macro_use]
pub mod error;
pub mod util;
pub mod fstree;
pub mod format;
pub mod config;
pub mod markdown;
pub mod templating;
pub mod page;
pub mod taxonomy;
pub mod assets;
pub mod archetype;
pub mod build;

pub use error::{Error, Result};
pub use config::{SiteConfig, SitePaths};
pub use templating::TemplateSet;
pub use build::{build, Build, BuildFailure, BuildOptions, BuildReport, Stage};
