use std::fs;
use std::path::Path;

use crate::error::{Chainable, Result};
use crate::fstree::{Depth, Entry, FsTree, Hidden};

/// Counts of static files copied and failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub copied: usize,
    pub failed: usize,
}

/// Copies every regular file under `source` to the same relative path under
/// `destination`, dotfiles included, overwriting what's there. Each failure is logged and
/// counted without stopping the remaining copies. A missing `source` copies
/// nothing.
pub fn mirror<S: AsRef<Path>, D: AsRef<Path>>(source: S, destination: D) -> MirrorReport {
    let (source, destination) = (source.as_ref(), destination.as_ref());
    let mut report = MirrorReport::default();
    if !source.is_dir() {
        tracing::warn!(path = %source.display(), "no static directory; skipping assets");
        return report;
    }

    let tree = match FsTree::build_with(source, Depth::Recursive, Hidden::Include) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::error!("{e}");
            report.failed += 1;
            return report;
        }
    };

    tree.depth_first_search(tree.root_id(), |entry| {
        if entry.file_type.is_dir() {
            return true;
        }

        if entry.file_type.is_file() {
            match copy(entry, destination) {
                Ok(()) => report.copied += 1,
                Err(e) => {
                    tracing::error!("{e}");
                    report.failed += 1;
                }
            }
        }

        false
    });

    report
}

fn copy(entry: &Entry, destination: &Path) -> Result<()> {
    let target = destination.join(entry.relative_path());
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).chain_with(|| error! {
            "failed to create asset directory",
            "path" => parent.display(),
        })?;
    }

    fs::copy(&entry.path, &target).chain_with(|| error! {
        "failed to copy asset",
        "from" => entry.path.display(),
        "to" => target.display(),
    })?;

    tracing::debug!(path = %entry.relative_path().display(), "copied asset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{mirror, MirrorReport};

    #[test]
    fn copies_preserve_relative_paths_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("static");
        let output = dir.path().join("public");
        fs::create_dir_all(source.join("css/vendor")).unwrap();
        fs::write(source.join("robots.txt"), "User-agent: *").unwrap();
        fs::write(source.join("css/site.css"), "body {}").unwrap();
        fs::write(source.join("css/vendor/reset.css"), "* {}").unwrap();
        fs::create_dir_all(output.join("css")).unwrap();
        fs::write(output.join("css/site.css"), "stale").unwrap();

        let report = mirror(&source, &output);
        assert_eq!(report, MirrorReport { copied: 3, failed: 0 });
        assert_eq!(fs::read_to_string(output.join("css/site.css")).unwrap(), "body {}");
        assert_eq!(fs::read_to_string(output.join("css/vendor/reset.css")).unwrap(), "* {}");
        assert_eq!(fs::read_to_string(output.join("robots.txt")).unwrap(), "User-agent: *");

        assert_eq!(mirror(&source, &output), report);
    }

    #[test]
    fn failures_do_not_stop_sibling_copies() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("static");
        let output = dir.path().join("public");
        fs::create_dir_all(source.join("img")).unwrap();
        fs::write(source.join("img/a.png"), "a").unwrap();
        fs::write(source.join("z.txt"), "z").unwrap();

        // A file where the `img` directory needs to go.
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("img"), "in the way").unwrap();

        let report = mirror(&source, &output);
        assert_eq!(report, MirrorReport { copied: 1, failed: 1 });
        assert_eq!(fs::read_to_string(output.join("z.txt")).unwrap(), "z");
    }

    #[test]
    fn dotfiles_are_mirrored() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("static");
        let output = dir.path().join("public");
        fs::create_dir_all(source.join(".well-known")).unwrap();
        fs::write(source.join(".htaccess"), "Options -Indexes").unwrap();
        fs::write(source.join(".well-known/x.txt"), "x").unwrap();
        fs::write(source.join("a.css"), "a {}").unwrap();

        assert_eq!(mirror(&source, &output), MirrorReport { copied: 3, failed: 0 });
        assert_eq!(fs::read_to_string(output.join(".htaccess")).unwrap(), "Options -Indexes");
        assert_eq!(fs::read_to_string(output.join(".well-known/x.txt")).unwrap(), "x");
    }

    #[test]
    fn missing_source_copies_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(mirror(dir.path().join("nope"), dir.path()), MirrorReport::default());
    }
}
