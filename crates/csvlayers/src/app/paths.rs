//! Path derivation for picker nodes.
//!
//! Nodes never carry their absolute path. The full path is the remembered
//! "remaining" prefix (the directory holding the chosen root) joined with
//! the label chain from the root down to the node.

use std::path::{Component, Path, PathBuf};

use crate::domain::tree::{CheckTree, NodeId};

/// Full and root-relative path of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub full: PathBuf,
    pub relative: PathBuf,
}

/// Derives filesystem paths from tree structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathResolver {
    remaining: PathBuf,
}

impl PathResolver {
    pub fn new(remaining: impl Into<PathBuf>) -> Self {
        Self {
            remaining: remaining.into(),
        }
    }

    /// Split a chosen root directory into the resolver for its tree and the
    /// label of its top-level node.
    pub fn for_root(root: &Path) -> (Self, String) {
        let root = normalize(root);
        match root.file_name() {
            Some(name) => {
                let remaining = root.parent().map(Path::to_path_buf).unwrap_or_default();
                (Self::new(remaining), name.to_string_lossy().to_string())
            }
            // Filesystem roots have no basename; the whole path becomes the label.
            None => (Self::default(), root.display().to_string()),
        }
    }

    pub fn remaining(&self) -> &Path {
        &self.remaining
    }

    pub fn resolve(&self, tree: &CheckTree, node: NodeId) -> ResolvedPath {
        let relative: PathBuf = tree.label_chain(node).into_iter().collect();
        let relative = normalize(&relative);
        let full = normalize(&self.remaining.join(&relative));
        ResolvedPath { full, relative }
    }

    pub fn full_path(&self, tree: &CheckTree, node: NodeId) -> PathBuf {
        self.resolve(tree, node).full
    }
}

/// Lexically collapse `.` segments, `..` segments, and redundant separators.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut normals = 0usize;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if normals > 0 {
                    out.pop();
                    normals -= 1;
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(part) => {
                out.push(part);
                normals += 1;
            }
            Component::RootDir | Component::Prefix(_) => out.push(component.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() && !path.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
