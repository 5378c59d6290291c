use std::path::PathBuf;

xflags::xflags! {
    /// Builds a static site, or starts a new document in one.
    cmd quill {
        /// Site directory. Defaults to the current directory.
        optional -s, --source source: PathBuf
        /// Output directory. Defaults to `<source>/public`.
        optional -o, --output output: PathBuf
        /// Log progress at the `info` level.
        optional -v, --verbose

        /// Builds the site.
        default cmd build {
            /// Only render documents directly inside `content/`.
            optional --shallow
            /// Render documents marked as drafts.
            optional --drafts
        }

        /// Creates `content/<slug>.md` from the post archetype.
        cmd new {
            required title: String
        }
    }
}
