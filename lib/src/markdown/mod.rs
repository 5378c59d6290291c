//! Front-matter extraction and Markdown rendering for content documents.

pub mod frontmatter;
mod render;
mod snippet;

pub use frontmatter::{extract, Dialect, Extracted, FrontMatter};
pub use render::{Html, Markdown, RuleSet, EXCERPT_LENGTH};
pub use snippet::Snippet;

/// File extensions recognized as Markdown content documents.
pub const EXTENSIONS: &[&str] = &["md", "markdown", "mdown"];

/// Returns `true` if a file with extension `ext` is a content document.
pub fn is_document(ext: Option<&str>) -> bool {
    ext.map_or(false, |ext| EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}
