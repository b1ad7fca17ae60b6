//! Checkable hierarchy backing the file picker.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. A node only
//! knows its own label; filesystem paths are always derived by walking the
//! parent chain (see [`crate::app::paths::PathResolver`]).

/// Handle to a node inside a [`CheckTree`]. Handles are invalidated by
/// [`CheckTree::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Visual and semantic class of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
}

impl NodeKind {
    pub fn is_dir(self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    label: String,
    kind: NodeKind,
    checked: bool,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl TreeNode {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Arena of checkable nodes with insertion-ordered children.
#[derive(Debug, Default, Clone)]
pub struct CheckTree {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
}

impl CheckTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every node. Previously issued ids must not be reused.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Append a top-level node.
    pub fn add_root(&mut self, label: impl Into<String>, kind: NodeKind, checked: bool) -> NodeId {
        let id = self.push(label.into(), kind, checked, None);
        self.roots.push(id);
        id
    }

    /// Append a child under `parent`, after any existing children.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        label: impl Into<String>,
        kind: NodeKind,
        checked: bool,
    ) -> NodeId {
        let id = self.push(label.into(), kind, checked, Some(parent));
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push(
        &mut self,
        label: String,
        kind: NodeKind,
        checked: bool,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            label,
            kind,
            checked,
            children: Vec::new(),
            parent,
        });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.nodes[id.0].label
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    pub fn is_checked(&self, id: NodeId) -> bool {
        self.nodes[id.0].checked
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        self.nodes[id.0].checked = checked;
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Labels from the root down to `id`, inclusive.
    pub fn label_chain(&self, id: NodeId) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current.0];
            chain.push(node.label.as_str());
            cursor = node.parent;
        }
        chain.reverse();
        chain
    }

    /// Number of ancestors above `id`.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.nodes[id.0].parent;
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.nodes[parent.0].parent;
        }
        depth
    }

    /// Every node below `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id.0].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    /// Locate a node by its label chain starting at a root label.
    pub fn find_by_labels<S: AsRef<str>>(&self, labels: &[S]) -> Option<NodeId> {
        let (first, rest) = labels.split_first()?;
        let mut current = self
            .roots
            .iter()
            .copied()
            .find(|id| self.label(*id) == first.as_ref())?;
        for label in rest {
            current = self
                .children(current)
                .iter()
                .copied()
                .find(|id| self.label(*id) == label.as_ref())?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (CheckTree, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = CheckTree::new();
        let root = tree.add_root("data", NodeKind::Directory, true);
        let sub = tree.add_child(root, "sub", NodeKind::Directory, true);
        let nested = tree.add_child(sub, "b.tsv", NodeKind::File, true);
        let top_file = tree.add_child(root, "a.csv", NodeKind::File, false);
        (tree, root, sub, nested, top_file)
    }

    #[test]
    fn children_keep_insertion_order() {
        let (tree, root, sub, _, top_file) = sample();
        assert_eq!(tree.children(root), &[sub, top_file]);
        assert_eq!(tree.roots(), &[root]);
        assert!(!tree.is_checked(top_file));
    }

    #[test]
    fn label_chain_walks_to_root() {
        let (tree, _, _, nested, _) = sample();
        assert_eq!(tree.label_chain(nested), vec!["data", "sub", "b.tsv"]);
        assert_eq!(tree.depth(nested), 2);
    }

    #[test]
    fn descendants_are_preorder() {
        let (tree, root, sub, nested, top_file) = sample();
        assert_eq!(tree.descendants(root), vec![sub, nested, top_file]);
        assert!(tree.descendants(nested).is_empty());
    }

    #[test]
    fn find_by_labels_resolves_nested_nodes() {
        let (tree, _, _, nested, _) = sample();
        assert_eq!(tree.find_by_labels(&["data", "sub", "b.tsv"]), Some(nested));
        assert_eq!(tree.find_by_labels(&["data", "missing"]), None);
    }

    #[test]
    fn clear_drops_everything() {
        let (mut tree, ..) = sample();
        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
    }
}
