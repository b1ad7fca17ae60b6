//! Rebuilding a flat selection as nested groups and layers.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::app::selection::SelectionState;
use crate::domain::errors::{LayerIssue, WorkflowError};
use crate::domain::model::{
    CoordinateFields, Delimiter, GroupNode, HierarchyOutput, LayerTreeNode, LeafNode,
};
use crate::domain::ports::{LayerValidator, Notifier};

/// Turns the selected directories and files into a [`HierarchyOutput`].
///
/// Groups are keyed by their full directory path, so a directory is never
/// represented twice no matter how many selected entries pass through it.
pub struct HierarchyReconstructor<'a, V: ?Sized, N: ?Sized> {
    validator: &'a V,
    notifier: &'a mut N,
}

impl<'a, V, N> HierarchyReconstructor<'a, V, N>
where
    V: LayerValidator + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(validator: &'a V, notifier: &'a mut N) -> Self {
        Self {
            validator,
            notifier,
        }
    }

    pub fn build(
        &mut self,
        selection: &SelectionState,
        fields: &CoordinateFields,
    ) -> Result<HierarchyOutput, WorkflowError> {
        let top_level = top_level_path(selection)?;
        let mut groups = GroupArena::new(&top_level);

        for dir in selection.dirs() {
            groups.get_or_create(dir)?;
        }

        let mut skipped = Vec::new();
        let sole_file = selection.files().len() == 1;
        for file in selection.files() {
            let leaf = match self.load_leaf(file, fields) {
                Ok(leaf) => leaf,
                Err(issue) => {
                    self.notifier.warn(&format!(
                        "Can't load file {}, please check its coordinates ({issue})",
                        file.display()
                    ));
                    if sole_file {
                        return Err(WorkflowError::InvalidLayer {
                            path: file.clone(),
                            issue,
                        });
                    }
                    tracing::warn!(path = %file.display(), %issue, "skipping invalid layer");
                    skipped.push(file.clone());
                    continue;
                }
            };

            let parent = file.parent().unwrap_or(top_level.as_path());
            let group = groups.get_or_create(parent)?;
            groups.attach(group, leaf);
        }

        let root = groups.into_root();
        tracing::info!(
            group = %root.name,
            layers = root.layer_count(),
            skipped = skipped.len(),
            "rebuilt layer hierarchy"
        );
        Ok(HierarchyOutput { root, skipped })
    }

    fn load_leaf(&self, file: &Path, fields: &CoordinateFields) -> Result<LeafNode, LayerIssue> {
        let delimiter = Delimiter::from_path(file).ok_or(LayerIssue::UnsupportedExtension)?;
        let leaf = LeafNode::new(file.to_path_buf(), delimiter, fields.clone());
        self.validator.validate(&leaf)?;
        Ok(leaf)
    }
}

/// Deepest directory containing every selected path. A lone file resolves to
/// its parent directory.
pub fn top_level_path(selection: &SelectionState) -> Result<PathBuf, WorkflowError> {
    let combined = selection.combined();
    let common = common_ancestor(&combined).ok_or(WorkflowError::NoCommonAncestor)?;
    if selection.contains_file(&common) {
        return common
            .parent()
            .map(Path::to_path_buf)
            .ok_or(WorkflowError::NoCommonAncestor);
    }
    Ok(common)
}

/// Longest shared component prefix of `paths`.
pub fn common_ancestor(paths: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = paths.split_first()?;
    let mut prefix: Vec<Component<'_>> = first.components().collect();
    for path in rest {
        let shared = prefix
            .iter()
            .zip(path.components())
            .take_while(|(a, b)| **a == *b)
            .count();
        prefix.truncate(shared);
    }
    if prefix.is_empty() {
        return None;
    }
    Some(prefix.iter().collect())
}

struct PendingGroup {
    name: String,
    children: Vec<PendingChild>,
}

enum PendingChild {
    Group(usize),
    Layer(LeafNode),
}

/// Groups under construction, addressed by index and looked up by path.
struct GroupArena {
    top_level: PathBuf,
    groups: Vec<PendingGroup>,
    by_path: HashMap<PathBuf, usize>,
}

impl GroupArena {
    fn new(top_level: &Path) -> Self {
        let name = top_level
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| top_level.display().to_string());
        Self {
            top_level: top_level.to_path_buf(),
            groups: vec![PendingGroup {
                name,
                children: Vec::new(),
            }],
            by_path: HashMap::new(),
        }
    }

    /// Index of the group for `dir`, creating any missing groups between the
    /// top level and `dir`.
    fn get_or_create(&mut self, dir: &Path) -> Result<usize, WorkflowError> {
        if let Some(index) = self.by_path.get(dir) {
            return Ok(*index);
        }
        let relative = dir
            .strip_prefix(&self.top_level)
            .map_err(|_| WorkflowError::NoCommonAncestor)?;

        let mut current = 0;
        let mut current_path = self.top_level.clone();
        for component in relative.components() {
            let Component::Normal(name) = component else {
                continue;
            };
            current_path.push(name);
            current = match self.by_path.get(&current_path) {
                Some(index) => *index,
                None => {
                    let index = self.groups.len();
                    self.groups.push(PendingGroup {
                        name: name.to_string_lossy().to_string(),
                        children: Vec::new(),
                    });
                    self.groups[current].children.push(PendingChild::Group(index));
                    self.by_path.insert(current_path.clone(), index);
                    index
                }
            };
        }
        Ok(current)
    }

    fn attach(&mut self, group: usize, leaf: LeafNode) {
        self.groups[group].children.push(PendingChild::Layer(leaf));
    }

    fn into_root(self) -> GroupNode {
        let mut slots: Vec<Option<PendingGroup>> = self.groups.into_iter().map(Some).collect();
        take_group(&mut slots, 0)
    }
}

fn take_group(slots: &mut [Option<PendingGroup>], index: usize) -> GroupNode {
    let Some(pending) = slots.get_mut(index).and_then(Option::take) else {
        return GroupNode::new(String::new());
    };
    let mut group = GroupNode::new(pending.name);
    for child in pending.children {
        match child {
            PendingChild::Group(child_index) => {
                group
                    .children
                    .push(LayerTreeNode::Group(take_group(slots, child_index)));
            }
            PendingChild::Layer(leaf) => group.children.push(LayerTreeNode::Layer(leaf)),
        }
    }
    group
}
