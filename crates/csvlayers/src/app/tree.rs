//! Recursive population of the checkable picker tree.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::paths::PathResolver;
use crate::app::scan::{DirectoryScanner, EntryFilter, ScanError};
use crate::app::selection::SelectionState;
use crate::domain::tree::{CheckTree, NodeId, NodeKind};

/// Walks a directory depth-first and mirrors it as checked nodes.
///
/// Every node starts checked: each directory visited lands in the selected
/// directories and every CSV/TSV file in the selected files. Other files are
/// left out of the tree entirely.
pub struct TreeBuilder<'a> {
    scanner: &'a DirectoryScanner,
    resolver: &'a PathResolver,
    filter: &'a EntryFilter,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(
        scanner: &'a DirectoryScanner,
        resolver: &'a PathResolver,
        filter: &'a EntryFilter,
    ) -> Self {
        Self {
            scanner,
            resolver,
            filter,
        }
    }

    /// Fill `node` with its subtree. Fails only when `node` itself cannot be
    /// listed; unreadable subdirectories stay in the tree without children.
    ///
    /// Symlinked directories are followed only when they point outside the
    /// root and at a directory not yet in the tree.
    pub fn populate(
        &self,
        tree: &mut CheckTree,
        node: NodeId,
        selection: &mut SelectionState,
    ) -> Result<(), ScanError> {
        let root = self.resolver.full_path(tree, node);
        let mut walk = Walk {
            root: fs::canonicalize(&root).ok(),
            visited: HashSet::new(),
        };
        self.populate_dir(tree, node, selection, &mut walk)
    }

    fn populate_dir(
        &self,
        tree: &mut CheckTree,
        node: NodeId,
        selection: &mut SelectionState,
        walk: &mut Walk,
    ) -> Result<(), ScanError> {
        let resolved = self.resolver.resolve(tree, node);
        selection.add_dir(resolved.full.clone());
        if let Ok(canonical) = fs::canonicalize(&resolved.full) {
            walk.visited.insert(canonical);
        }

        let listing = self.scanner.list_immediate_children(&resolved.full)?;

        for directory in &listing.directories {
            if self.skipped(&resolved.relative, directory) || !walk.follows(directory) {
                continue;
            }
            let child = tree.add_child(node, basename(directory), NodeKind::Directory, true);
            if let Err(err) = self.populate_dir(tree, child, selection, walk) {
                tracing::warn!(path = %err.path().display(), error = %err, "skipping unreadable directory");
            }
        }

        for file in &listing.files {
            if !self.filter.is_tabular(file) || self.skipped(&resolved.relative, file) {
                continue;
            }
            let child = tree.add_child(node, basename(file), NodeKind::File, true);
            let full = self.resolver.full_path(tree, child);
            selection.add_file(full);
        }

        Ok(())
    }

    fn skipped(&self, parent_relative: &Path, entry: &Path) -> bool {
        let relative = parent_relative.join(basename(entry));
        self.filter.is_ignored(&relative)
    }
}

/// Canonical root and directories already mirrored during one populate call.
struct Walk {
    root: Option<PathBuf>,
    visited: HashSet<PathBuf>,
}

impl Walk {
    fn follows(&self, directory: &Path) -> bool {
        let is_link = fs::symlink_metadata(directory)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);
        if !is_link {
            return true;
        }
        let Ok(target) = fs::canonicalize(directory) else {
            return false;
        };
        let inside_root = self
            .root
            .as_ref()
            .is_some_and(|root| target.starts_with(root));
        if inside_root || self.visited.contains(&target) {
            tracing::debug!(
                path = %directory.display(),
                target = %target.display(),
                "not following directory link"
            );
            return false;
        }
        true
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
