use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

pub trait PathExt: AsRef<Path> {
    /// The path with its final extension removed, keeping any directories.
    fn without_extension(&self) -> Cow<'_, Path>;

    /// The path's normal components joined with `/`, as used in URLs and
    /// logical template names regardless of platform.
    fn to_slash_string(&self) -> String;

    /// Where a content document at this relative path is written: same
    /// directories, `.html` extension.
    fn html_destination(&self) -> PathBuf;
}

impl PathExt for Path {
    fn without_extension(&self) -> Cow<'_, Path> {
        match self.extension() {
            Some(_) => self.with_extension("").into(),
            None => self.into(),
        }
    }

    fn to_slash_string(&self) -> String {
        self.components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    fn html_destination(&self) -> PathBuf {
        self.components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect::<PathBuf>()
            .with_extension("html")
    }
}
