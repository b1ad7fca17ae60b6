//! Selection state kept in step with the checkable tree.

use std::path::{Path, PathBuf};

use crate::app::paths::PathResolver;
use crate::domain::tree::{CheckTree, NodeId, NodeKind};

/// Ordered, duplicate-free lists of selected directories and files.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionState {
    dirs: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }

    pub fn contains_dir(&self, path: &Path) -> bool {
        self.dirs.iter().any(|dir| dir == path)
    }

    pub fn contains_file(&self, path: &Path) -> bool {
        self.files.iter().any(|file| file == path)
    }

    /// Returns `true` when the directory was not yet selected.
    pub fn add_dir(&mut self, path: PathBuf) -> bool {
        insert_unique(&mut self.dirs, path)
    }

    pub fn remove_dir(&mut self, path: &Path) -> bool {
        remove_path(&mut self.dirs, path)
    }

    /// Returns `true` when the file was not yet selected.
    pub fn add_file(&mut self, path: PathBuf) -> bool {
        insert_unique(&mut self.files, path)
    }

    pub fn remove_file(&mut self, path: &Path) -> bool {
        remove_path(&mut self.files, path)
    }

    /// Directories followed by files, the order reconstruction consumes.
    pub fn combined(&self) -> Vec<PathBuf> {
        self.dirs.iter().chain(self.files.iter()).cloned().collect()
    }

    pub fn reset(&mut self) {
        self.dirs.clear();
        self.files.clear();
    }
}

fn insert_unique(list: &mut Vec<PathBuf>, path: PathBuf) -> bool {
    if list.contains(&path) {
        return false;
    }
    list.push(path);
    true
}

fn remove_path(list: &mut Vec<PathBuf>, path: &Path) -> bool {
    let original_len = list.len();
    list.retain(|existing| existing != path);
    list.len() != original_len
}

/// Applies check/uncheck events from the picker to a [`SelectionState`].
///
/// Directory toggles cascade to every descendant; file toggles only touch
/// the file itself. Node kind comes from the tree, never from the disk.
pub struct SelectionTracker<'a> {
    resolver: &'a PathResolver,
}

impl<'a> SelectionTracker<'a> {
    pub fn new(resolver: &'a PathResolver) -> Self {
        Self { resolver }
    }

    /// React to a user-driven change of `node`'s checked flag.
    pub fn on_toggle(&self, tree: &mut CheckTree, node: NodeId, state: &mut SelectionState) {
        let checked = tree.is_checked(node);
        let path = self.resolver.full_path(tree, node);
        match tree.kind(node) {
            NodeKind::File => {
                if checked {
                    state.add_file(path);
                } else {
                    state.remove_file(&path);
                }
            }
            NodeKind::Directory => self.cascade(tree, node, path, checked, state),
        }
    }

    /// Flip `node`'s checked flag and apply the change.
    pub fn toggle(&self, tree: &mut CheckTree, node: NodeId, state: &mut SelectionState) {
        let checked = !tree.is_checked(node);
        tree.set_checked(node, checked);
        self.on_toggle(tree, node, state);
    }

    fn cascade(
        &self,
        tree: &mut CheckTree,
        node: NodeId,
        path: PathBuf,
        checked: bool,
        state: &mut SelectionState,
    ) {
        apply(state, NodeKind::Directory, path, checked);
        let descendants = tree.descendants(node);
        for descendant in &descendants {
            tree.set_checked(*descendant, checked);
            let path = self.resolver.full_path(tree, *descendant);
            apply(state, tree.kind(*descendant), path, checked);
        }
        tracing::debug!(
            node = node.index(),
            checked,
            descendants = descendants.len(),
            "cascaded directory toggle"
        );
    }
}

fn apply(state: &mut SelectionState, kind: NodeKind, path: PathBuf, checked: bool) {
    match (kind, checked) {
        (NodeKind::Directory, true) => {
            state.add_dir(path);
        }
        (NodeKind::Directory, false) => {
            state.remove_dir(&path);
        }
        (NodeKind::File, true) => {
            state.add_file(path);
        }
        (NodeKind::File, false) => {
            state.remove_file(&path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        tree: CheckTree,
        resolver: PathResolver,
        state: SelectionState,
        root: NodeId,
        zone: NodeId,
        inner: NodeId,
        top_file: NodeId,
    }

    /// survey/{zone/{inner/{c.csv}, b.tsv}, a.csv}, fully selected.
    fn fixture() -> Fixture {
        let resolver = PathResolver::new("/data");
        let mut tree = CheckTree::new();
        let root = tree.add_root("survey", NodeKind::Directory, true);
        let zone = tree.add_child(root, "zone", NodeKind::Directory, true);
        let inner = tree.add_child(zone, "inner", NodeKind::Directory, true);
        tree.add_child(inner, "c.csv", NodeKind::File, true);
        tree.add_child(zone, "b.tsv", NodeKind::File, true);
        let top_file = tree.add_child(root, "a.csv", NodeKind::File, true);

        let mut state = SelectionState::new();
        for id in std::iter::once(root).chain(tree.descendants(root)) {
            let path = resolver.full_path(&tree, id);
            apply(&mut state, tree.kind(id), path, true);
        }

        Fixture {
            tree,
            resolver,
            state,
            root,
            zone,
            inner,
            top_file,
        }
    }

    fn assert_mirrors_tree(fx: &Fixture) {
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for id in std::iter::once(fx.root).chain(fx.tree.descendants(fx.root)) {
            if !fx.tree.is_checked(id) {
                continue;
            }
            let path = fx.resolver.full_path(&fx.tree, id);
            match fx.tree.kind(id) {
                NodeKind::Directory => dirs.push(path),
                NodeKind::File => files.push(path),
            }
        }
        let mut actual_dirs = fx.state.dirs().to_vec();
        let mut actual_files = fx.state.files().to_vec();
        dirs.sort();
        files.sort();
        actual_dirs.sort();
        actual_files.sort();
        assert_eq!(actual_dirs, dirs);
        assert_eq!(actual_files, files);
    }

    #[test]
    fn state_rejects_duplicates_and_keeps_order() {
        let mut state = SelectionState::new();
        assert!(state.add_dir("/a".into()));
        assert!(!state.add_dir("/a".into()));
        assert!(state.add_file("/a/x.csv".into()));
        assert!(state.add_file("/a/y.csv".into()));
        assert!(state.remove_file(Path::new("/a/x.csv")));
        assert!(!state.remove_file(Path::new("/a/x.csv")));
        assert_eq!(
            state.combined(),
            vec![PathBuf::from("/a"), PathBuf::from("/a/y.csv")]
        );
        state.reset();
        assert!(state.is_empty());
    }

    #[test]
    fn file_toggle_does_not_cascade() {
        let mut fx = fixture();
        let tracker = SelectionTracker::new(&fx.resolver);
        tracker.toggle(&mut fx.tree, fx.top_file, &mut fx.state);

        assert!(!fx.state.contains_file(Path::new("/data/survey/a.csv")));
        assert!(fx.state.contains_dir(Path::new("/data/survey")));
        assert_eq!(fx.state.files().len(), 2);
        assert_mirrors_tree(&fx);

        tracker.toggle(&mut fx.tree, fx.top_file, &mut fx.state);
        assert!(fx.state.contains_file(Path::new("/data/survey/a.csv")));
        assert_mirrors_tree(&fx);
    }

    #[test]
    fn unchecking_directory_removes_whole_subtree() {
        let mut fx = fixture();
        let tracker = SelectionTracker::new(&fx.resolver);
        tracker.toggle(&mut fx.tree, fx.zone, &mut fx.state);

        assert!(!fx.tree.is_checked(fx.inner));
        assert!(!fx.state.contains_dir(Path::new("/data/survey/zone")));
        assert!(!fx.state.contains_dir(Path::new("/data/survey/zone/inner")));
        assert!(!fx.state.contains_file(Path::new("/data/survey/zone/inner/c.csv")));
        assert!(!fx.state.contains_file(Path::new("/data/survey/zone/b.tsv")));
        assert_eq!(fx.state.dirs(), &[PathBuf::from("/data/survey")]);
        assert_eq!(fx.state.files(), &[PathBuf::from("/data/survey/a.csv")]);
        assert_mirrors_tree(&fx);
    }

    #[test]
    fn rechecking_directory_restores_each_entry_once() {
        let mut fx = fixture();
        let tracker = SelectionTracker::new(&fx.resolver);
        tracker.toggle(&mut fx.tree, fx.zone, &mut fx.state);
        tracker.toggle(&mut fx.tree, fx.zone, &mut fx.state);

        assert_eq!(fx.state.dirs().len(), 3);
        assert_eq!(fx.state.files().len(), 3);
        assert_mirrors_tree(&fx);
    }

    #[test]
    fn repeated_check_notification_is_idempotent() {
        let mut fx = fixture();
        let tracker = SelectionTracker::new(&fx.resolver);
        tracker.toggle(&mut fx.tree, fx.root, &mut fx.state);
        tracker.toggle(&mut fx.tree, fx.root, &mut fx.state);
        let after_first = fx.state.clone();

        fx.tree.set_checked(fx.root, true);
        tracker.on_toggle(&mut fx.tree, fx.root, &mut fx.state);
        assert_eq!(fx.state, after_first);
    }

    #[test]
    fn checking_directory_overrides_unchecked_descendants() {
        let mut fx = fixture();
        let tracker = SelectionTracker::new(&fx.resolver);
        tracker.toggle(&mut fx.tree, fx.top_file, &mut fx.state);
        tracker.toggle(&mut fx.tree, fx.inner, &mut fx.state);
        tracker.toggle(&mut fx.tree, fx.root, &mut fx.state);
        assert!(fx.state.is_empty());

        tracker.toggle(&mut fx.tree, fx.root, &mut fx.state);
        assert_eq!(fx.state.dirs().len(), 3);
        assert_eq!(fx.state.files().len(), 3);
        assert_mirrors_tree(&fx);
    }
}
