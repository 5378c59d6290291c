use std::sync::Arc;
use std::path::Path;
use std::collections::VecDeque;
use std::{fs, fmt};

use rustc_hash::FxHashMap;

use crate::error::{Chainable, Result};

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) usize);

/// A snapshot of a directory tree, discovered in parallel and sorted by file
/// name within each directory.
#[derive(Debug)]
pub struct FsTree {
    entries: Vec<Entry>,
    map: FxHashMap<Arc<Path>, EntryId>,
}

#[derive(Debug)]
pub struct Entry {
    pub id: EntryId,
    pub path: Arc<Path>,
    pub file_name: String,
    pub file_type: fs::FileType,
    pub parent: Option<EntryId>,
    pub children: Vec<EntryId>,
    pub depth: usize,
}

/// How deep discovery descends below the root.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Depth {
    /// Only the root's immediate children.
    Shallow,
    /// Every descendant.
    Recursive,
}

/// Whether dotfiles and dot-directories are part of the tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Hidden {
    Skip,
    Include,
}

#[derive(Default, Debug)]
struct FsMetadata(Option<fs::FileType>);

impl FsTree {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            entries: vec![],
        }
    }

    /// Walks every non-hidden descendant of `root`.
    pub fn build<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::build_with(root, Depth::Recursive, Hidden::Skip)
    }

    /// Walks `root`. Fails if `root` itself can't be read; unreadable
    /// descendants are left out of the tree.
    pub fn build_with<P: AsRef<Path>>(root: P, depth: Depth, hidden: Hidden) -> Result<Self> {
        use jwalk::WalkDirGeneric;

        let root = root.as_ref();
        fs::read_dir(root).chain_with(|| error! {
            "failed to read directory",
            "path" => root.display(),
        })?;

        let mut walker = WalkDirGeneric::<FsMetadata>::new(root)
            .sort(true)
            .skip_hidden(hidden == Hidden::Skip)
            .follow_links(true)
            .process_read_dir(|_, _, _, entries| {
                entries.iter_mut()
                    .filter_map(|e| e.as_mut().ok())
                    .for_each(|e| e.client_state = FsMetadata(e.metadata().ok().map(|m| m.file_type())))
            });

        if depth == Depth::Shallow {
            walker = walker.max_depth(1);
        }

        let mut tree = FsTree::new();
        for entry in walker.into_iter() {
            match entry {
                Ok(entry) if entry.client_state.0.is_some() || entry.depth == 0 => {
                    tree.insert(entry);
                }
                Ok(entry) => tracing::debug!(path = %entry.path().display(), "skipping unreadable entry"),
                Err(e) => tracing::warn!("skipping entry: {e}"),
            }
        }

        if tree.len() == 0 {
            return err! {
                "file system tree discovery yielded zero entries",
                "search root" => root.display(),
            }
        }

        Ok(tree)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn root_id(&self) -> EntryId {
        EntryId(0)
    }

    /// All files below the root, shallowest first, in name order per
    /// directory.
    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.iter_breadth_first(self.root_id())
            .entries()
            .filter(|e| e.file_type.is_file())
    }

    pub fn iter_breadth_first(&self, root: EntryId) -> Bfs<'_> {
        Bfs {
            tree: self,
            root: Some(root),
            stack: VecDeque::new(),
            progress: 0
        }
    }

    /// Visits entries depth first from `root`. Children of an entry are only
    /// visited when `progress` returns `true` for it.
    pub fn depth_first_search<F>(&self, root: EntryId, mut progress: F)
        where F: FnMut(&Entry) -> bool
    {
        fn _dfs<F: FnMut(&Entry) -> bool>(tree: &FsTree, root: EntryId, progress: &mut F) {
            let entry = &tree[root];
            if progress(entry) {
                for &child in &entry.children {
                    _dfs(tree, child, progress)
                }
            }
        }

        _dfs(self, root, &mut progress)
    }

    fn insert(&mut self, entry: jwalk::DirEntry<FsMetadata>) -> EntryId {
        let file_type = entry.client_state.0.unwrap_or(entry.file_type);
        let entry = Entry {
            id: EntryId(self.entries.len()),
            path: Arc::from(entry.path().into_boxed_path()),
            file_type,
            file_name: entry.file_name.to_string_lossy().into_owned(),
            parent: self.map.get(&entry.parent_path).cloned(),
            children: vec![],
            depth: entry.depth,
        };

        self.map.insert(entry.path.clone(), entry.id);
        if let Some(parent) = entry.parent {
            self.entries[parent.0].children.push(entry.id);
        }

        let id = entry.id;
        self.entries.push(entry);
        id
    }
}

impl Entry {
    /// The complete extension, if any.
    pub fn file_ext(&self) -> Option<&str> {
        self.file_name.rsplit_once('.').map(|(_, right)| right)
    }

    /// Path relative to the root of the tree containing `self`.
    pub fn relative_path(&self) -> &Path {
        let mut components = self.path.components();
        for _ in 0..(self.path.components().count() - self.depth) {
            components.next();
        }

        components.as_path()
    }
}

// Only directories that have children are kept on `stack`, which bounds its
// length by the number of directories rather than entries.
pub struct Bfs<'a> {
    tree: &'a FsTree,
    root: Option<EntryId>,
    stack: VecDeque<EntryId>,
    progress: usize,
}

impl Iterator for Bfs<'_> {
    type Item = EntryId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(root) = self.root.take() {
                self.stack.push_front(root);
                return Some(root);
            }

            let &parent = self.stack.front()?;
            let children = &self.tree[parent].children;
            if self.progress < children.len() {
                let node = children[self.progress];
                if !self.tree[node].children.is_empty() {
                    self.stack.push_back(node);
                }

                self.progress += 1;
                return Some(node)
            }

            self.stack.pop_front();
            self.progress = 0;
        }
    }
}

impl<'a> Bfs<'a> {
    #[inline]
    pub fn entries(self) -> impl Iterator<Item = &'a Entry> {
        let tree = self.tree;
        self.into_iter().map(move |id| &tree[id])
    }
}

impl jwalk::ClientState for FsMetadata {
    type ReadDirState = ();
    type DirEntryState = Self;
}

impl std::ops::Index<EntryId> for FsTree {
    type Output = Entry;

    fn index(&self, index: EntryId) -> &Self::Output {
        &self.entries[index.0]
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::{Depth, FsTree, Hidden};

    fn touch(root: &Path, path: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn files_are_breadth_first_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.md");
        touch(dir.path(), "a.md");
        touch(dir.path(), "posts/z.md");
        touch(dir.path(), "posts/deep/y.md");
        touch(dir.path(), ".hidden.md");

        let tree = FsTree::build(dir.path()).unwrap();
        let files: Vec<_> = tree.files()
            .map(|e| e.relative_path().to_path_buf())
            .collect();

        assert_eq!(files, vec![
            Path::new("a.md"),
            Path::new("b.md"),
            Path::new("posts/z.md"),
            Path::new("posts/deep/y.md"),
        ]);

        let exts: Vec<_> = tree.files().map(|e| e.file_ext()).collect();
        assert_eq!(exts, [Some("md"); 4]);
    }

    #[test]
    fn hidden_entries_are_kept_on_request() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".htaccess");
        touch(dir.path(), ".well-known/x.txt");
        touch(dir.path(), "a.css");

        let tree = FsTree::build_with(dir.path(), Depth::Recursive, Hidden::Include).unwrap();
        let files: Vec<_> = tree.files()
            .map(|e| e.relative_path().to_path_buf())
            .collect();

        assert_eq!(files, vec![
            Path::new(".htaccess"),
            Path::new("a.css"),
            Path::new(".well-known/x.txt"),
        ]);
    }

    #[test]
    fn shallow_walks_stop_at_the_first_level() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.md");
        touch(dir.path(), "posts/z.md");

        let tree = FsTree::build_with(dir.path(), Depth::Shallow, Hidden::Skip).unwrap();
        let names: Vec<_> = tree.files().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.md"]);
    }

    #[test]
    fn missing_roots_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FsTree::build(dir.path().join("nope")).is_err());
    }
}
