//! Grouping pages by taxonomy term and rendering the pages that list them.

mod index;
mod renderer;

pub use index::*;
pub use renderer::*;
