//! One pick-and-confirm run: choose a root, adjust the checks, confirm.

use std::path::{Component, Path, PathBuf};

use anyhow::Result;

use crate::app::fields::FieldChoices;
use crate::app::paths::{PathResolver, normalize};
use crate::app::reconstruct::HierarchyReconstructor;
use crate::app::scan::{DirectoryScanner, EntryFilter};
use crate::app::selection::{SelectionState, SelectionTracker};
use crate::app::tree::TreeBuilder;
use crate::domain::errors::WorkflowError;
use crate::domain::model::Delimiter;
use crate::domain::ports::{LayerTreeSink, LayerValidator, Notifier};
use crate::domain::tree::{CheckTree, NodeId, NodeKind};
use crate::infra::config::Config;
use crate::infra::header::read_header;

pub const NO_TABULAR_FILES: &str = "No CSV or TSV file under this directory!";
pub const MISSING_COORDINATES: &str =
    "Please make sure there's CSV files with valid coordinates beneath this path";

/// Outcome of a successful confirm, after the group went to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmReport {
    pub group: String,
    pub groups: usize,
    pub layers: usize,
    pub skipped: Vec<PathBuf>,
}

/// Owns the picker tree, the selection lists and the field vocabulary of a
/// single run. Every abort path and every completed confirm leaves it empty.
#[derive(Debug)]
pub struct ImportWorkflow {
    scanner: DirectoryScanner,
    filter: EntryFilter,
    x_prefs: Vec<String>,
    y_prefs: Vec<String>,
    root: Option<PathBuf>,
    resolver: Option<PathResolver>,
    tree: CheckTree,
    selection: SelectionState,
    fields: FieldChoices,
}

impl Default for ImportWorkflow {
    fn default() -> Self {
        Self::new(DirectoryScanner::new(), EntryFilter::default())
    }
}

impl ImportWorkflow {
    pub fn new(scanner: DirectoryScanner, filter: EntryFilter) -> Self {
        Self {
            scanner,
            filter,
            x_prefs: Vec::new(),
            y_prefs: Vec::new(),
            root: None,
            resolver: None,
            tree: CheckTree::new(),
            selection: SelectionState::new(),
            fields: FieldChoices::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let workflow = Self::new(
            DirectoryScanner::from_config(config),
            EntryFilter::from_config(config)?,
        )
        .with_field_preferences(
            config.fields.x_preferences(),
            config.fields.y_preferences(),
        );
        Ok(workflow)
    }

    pub fn with_field_preferences<S: AsRef<str>>(mut self, x: Vec<S>, y: Vec<S>) -> Self {
        self.x_prefs = x.iter().map(|name| name.as_ref().to_owned()).collect();
        self.y_prefs = y.iter().map(|name| name.as_ref().to_owned()).collect();
        self
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn tree(&self) -> &CheckTree {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn fields(&self) -> &FieldChoices {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FieldChoices {
        &mut self.fields
    }

    /// Start over from `path`: rebuild the tree with every entry checked and
    /// read the field vocabulary from the first selected file.
    pub fn choose_root<N>(
        &mut self,
        path: &Path,
        notifier: &mut N,
    ) -> Result<&FieldChoices, WorkflowError>
    where
        N: Notifier + ?Sized,
    {
        self.reset();
        let root = std::path::absolute(path)
            .map(|absolute| normalize(&absolute))
            .map_err(|err| WorkflowError::io(path, err))?;

        let (resolver, label) = PathResolver::for_root(&root);
        let top = self.tree.add_root(label, NodeKind::Directory, true);
        let populated = TreeBuilder::new(&self.scanner, &resolver, &self.filter).populate(
            &mut self.tree,
            top,
            &mut self.selection,
        );
        if let Err(err) = populated {
            self.reset();
            let path = err.path().to_path_buf();
            return Err(WorkflowError::io(path, err.into_io()));
        }

        let Some(first) = self.selection.files().first().cloned() else {
            notifier.info(NO_TABULAR_FILES);
            self.reset();
            return Err(WorkflowError::EmptySelection(root));
        };

        let delimiter = Delimiter::from_path(&first).unwrap_or(Delimiter::Comma);
        let columns = match read_header(&first, delimiter) {
            Ok(columns) => columns,
            Err(err) => {
                self.reset();
                return Err(WorkflowError::io(first, err));
            }
        };

        tracing::info!(
            root = %root.display(),
            dirs = self.selection.dirs().len(),
            files = self.selection.files().len(),
            columns = columns.len(),
            "root chosen"
        );
        self.fields = FieldChoices::new(columns, &self.x_prefs, &self.y_prefs);
        self.resolver = Some(resolver);
        self.root = Some(root);
        Ok(&self.fields)
    }

    /// Flip a node's check as if the user clicked it.
    pub fn toggle(&mut self, node: NodeId) -> Result<(), WorkflowError> {
        let resolver = self.resolver.as_ref().ok_or(WorkflowError::NoRoot)?;
        if self.tree.get(node).is_none() {
            return Err(WorkflowError::UnknownNode(node));
        }
        SelectionTracker::new(resolver).toggle(&mut self.tree, node, &mut self.selection);
        Ok(())
    }

    /// Set a node's check, doing nothing when it already has that state.
    pub fn set_checked(&mut self, node: NodeId, checked: bool) -> Result<(), WorkflowError> {
        let resolver = self.resolver.as_ref().ok_or(WorkflowError::NoRoot)?;
        let current = self
            .tree
            .get(node)
            .ok_or(WorkflowError::UnknownNode(node))?
            .is_checked();
        if current == checked {
            return Ok(());
        }
        self.tree.set_checked(node, checked);
        SelectionTracker::new(resolver).on_toggle(&mut self.tree, node, &mut self.selection);
        Ok(())
    }

    /// Node at `relative`, a path below the chosen root. An empty path is
    /// the root node itself.
    pub fn find(&self, relative: &Path) -> Option<NodeId> {
        let top = *self.tree.roots().first()?;
        let mut labels = vec![self.tree.label(top).to_owned()];
        for component in relative.components() {
            match component {
                Component::Normal(name) => labels.push(name.to_string_lossy().to_string()),
                Component::CurDir => {}
                _ => return None,
            }
        }
        self.tree.find_by_labels(&labels)
    }

    pub fn path_of(&self, node: NodeId) -> Option<PathBuf> {
        let resolver = self.resolver.as_ref()?;
        self.tree
            .get(node)
            .map(|_| resolver.full_path(&self.tree, node))
    }

    /// Rebuild the checked entries as groups and layers and hand the result
    /// to `sink`.
    pub fn confirm<V, S, N>(
        &mut self,
        validator: &V,
        sink: &mut S,
        notifier: &mut N,
    ) -> Result<ConfirmReport, WorkflowError>
    where
        V: LayerValidator + ?Sized,
        S: LayerTreeSink + ?Sized,
        N: Notifier + ?Sized,
    {
        let fields = match self.fields.selected() {
            Some(fields) if !self.selection.files().is_empty() => fields,
            _ => {
                notifier.info(MISSING_COORDINATES);
                self.reset();
                return Err(WorkflowError::MissingFields);
            }
        };

        let built = HierarchyReconstructor::new(validator, notifier).build(&self.selection, &fields);
        let output = match built {
            Ok(output) => output,
            Err(err) => {
                self.reset();
                return Err(err);
            }
        };

        let report = ConfirmReport {
            group: output.root.name.clone(),
            groups: output.root.group_count(),
            layers: output.root.layer_count(),
            skipped: output.skipped,
        };
        sink.add_root_group(output.root);
        self.reset();
        Ok(report)
    }

    /// Drop the run without producing anything.
    pub fn cancel(&mut self) {
        tracing::debug!("workflow cancelled");
        self.reset();
    }

    fn reset(&mut self) {
        self.tree.clear();
        self.selection.reset();
        self.fields.clear();
        self.resolver = None;
        self.root = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use crate::domain::model::LayerTreeNode;
    use crate::infra::layer::DelimitedTextValidator;
    use crate::infra::notify::NoticeLog;
    use crate::infra::project::ProjectTree;

    fn workflow() -> ImportWorkflow {
        ImportWorkflow::default().with_field_preferences(vec!["lon"], vec!["lat"])
    }

    fn assert_cleared(workflow: &ImportWorkflow) {
        assert!(workflow.tree().is_empty());
        assert!(workflow.selection().is_empty());
        assert!(workflow.fields().is_empty());
        assert!(workflow.root().is_none());
    }

    fn survey() -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let root = temp.path().join("survey");
        fs::create_dir_all(root.join("sub"))?;
        fs::write(root.join("a.csv"), "id,lon,lat\n1,2.0,48.0\n")?;
        fs::write(root.join("sub/b.tsv"), "lon\tlat\n3.0\t49.0\n")?;
        Ok((temp, root))
    }

    #[test]
    fn choose_root_checks_everything_and_reads_header() -> Result<()> {
        let (_temp, root) = survey()?;
        let mut workflow = workflow();
        let mut notices = NoticeLog::new();

        let fields = workflow.choose_root(&root, &mut notices)?;
        assert_eq!(fields.columns(), ["lon", "lat"]);
        assert_eq!(fields.x(), Some("lon"));
        assert_eq!(fields.y(), Some("lat"));

        assert_eq!(workflow.selection().dirs(), [root.clone(), root.join("sub")]);
        assert_eq!(
            workflow.selection().files(),
            [root.join("sub/b.tsv"), root.join("a.csv")]
        );
        assert!(notices.is_empty());
        Ok(())
    }

    #[test]
    fn confirm_hands_hierarchy_to_sink_and_resets() -> Result<()> {
        let (_temp, root) = survey()?;
        let mut workflow = workflow();
        let mut notices = NoticeLog::new();
        let mut project = ProjectTree::new();

        workflow.choose_root(&root, &mut notices)?;
        let report =
            workflow.confirm(&DelimitedTextValidator::default(), &mut project, &mut notices)?;

        assert_eq!(report.group, "survey");
        assert_eq!(report.layers, 2);
        assert_eq!(report.groups, 1);
        assert!(report.skipped.is_empty());

        let group = &project.groups()[0];
        assert_eq!(group.name, "survey");
        let sub = group.group("sub").unwrap();
        assert!(matches!(&sub.children[0], LayerTreeNode::Layer(leaf) if leaf.name == "b"));
        assert_cleared(&workflow);
        Ok(())
    }

    #[test]
    fn toggles_by_relative_path_feed_confirm() -> Result<()> {
        let (_temp, root) = survey()?;
        let mut workflow = workflow();
        let mut notices = NoticeLog::new();
        let mut project = ProjectTree::new();

        workflow.choose_root(&root, &mut notices)?;
        let sub = workflow.find(Path::new("sub")).unwrap();
        workflow.toggle(sub)?;
        assert_eq!(workflow.selection().dirs(), [root.clone()]);
        assert_eq!(workflow.selection().files(), [root.join("a.csv")]);

        let a = workflow.find(Path::new("a.csv")).unwrap();
        workflow.set_checked(a, true)?;
        assert_eq!(workflow.selection().files().len(), 1);

        workflow.confirm(&DelimitedTextValidator::default(), &mut project, &mut notices)?;
        let group = &project.groups()[0];
        assert_eq!(group.group_count(), 0);
        assert_eq!(group.layer_count(), 1);
        Ok(())
    }

    #[test]
    fn root_without_tabular_files_aborts() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::create_dir_all(temp.path().join("docs/empty"))?;
        fs::write(temp.path().join("docs/readme.md"), "# docs")?;
        let mut workflow = workflow();
        let mut notices = NoticeLog::new();

        let err = workflow
            .choose_root(&temp.path().join("docs"), &mut notices)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::EmptySelection(_)));
        assert_eq!(notices.last().unwrap().message, NO_TABULAR_FILES);
        assert_cleared(&workflow);
        Ok(())
    }

    #[test]
    fn missing_root_propagates_io() {
        let temp = tempfile::tempdir().unwrap();
        let mut workflow = workflow();
        let err = workflow
            .choose_root(&temp.path().join("absent"), &mut NoticeLog::new())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Io { .. }));
        assert_cleared(&workflow);
    }

    #[test]
    fn confirm_with_nothing_selected_reports_missing_fields() -> Result<()> {
        let (_temp, root) = survey()?;
        let mut workflow = workflow();
        let mut notices = NoticeLog::new();
        let mut project = ProjectTree::new();

        workflow.choose_root(&root, &mut notices)?;
        let top = workflow.find(Path::new("")).unwrap();
        workflow.toggle(top)?;
        assert!(workflow.selection().is_empty());

        let err = workflow
            .confirm(&DelimitedTextValidator::default(), &mut project, &mut notices)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::MissingFields));
        assert_eq!(notices.last().unwrap().message, MISSING_COORDINATES);
        assert!(project.is_empty());
        assert_cleared(&workflow);
        Ok(())
    }

    #[test]
    fn sole_invalid_file_aborts_and_resets() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path().join("one");
        fs::create_dir_all(&root)?;
        fs::write(root.join("bad.csv"), "lon,lat\nnorth,south\n")?;
        let mut workflow = workflow();
        let mut notices = NoticeLog::new();
        let mut project = ProjectTree::new();

        workflow.choose_root(&root, &mut notices)?;
        let err = workflow
            .confirm(&DelimitedTextValidator::default(), &mut project, &mut notices)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidLayer { .. }));
        assert_eq!(notices.warnings().count(), 1);
        assert!(project.is_empty());
        assert_cleared(&workflow);
        Ok(())
    }

    #[test]
    fn invalid_file_among_many_is_skipped() -> Result<()> {
        let (_temp, root) = survey()?;
        fs::write(root.join("sub/broken.csv"), "lon,lat\nx,y\n")?;
        let mut workflow = workflow();
        let mut notices = NoticeLog::new();
        let mut project = ProjectTree::new();

        workflow.choose_root(&root, &mut notices)?;
        let report =
            workflow.confirm(&DelimitedTextValidator::default(), &mut project, &mut notices)?;
        assert_eq!(report.layers, 2);
        assert_eq!(report.skipped, vec![root.join("sub/broken.csv")]);
        assert_eq!(notices.warnings().count(), 1);
        Ok(())
    }

    #[test]
    fn toggling_before_a_root_is_rejected() {
        let mut workflow = workflow();
        let mut tree = CheckTree::new();
        let stray = tree.add_root("x", NodeKind::File, true);
        assert!(matches!(workflow.toggle(stray), Err(WorkflowError::NoRoot)));
    }

    #[test]
    fn node_from_an_earlier_tree_is_rejected() -> Result<()> {
        let (temp, root) = survey()?;
        let mut workflow = workflow();
        let mut notices = NoticeLog::new();

        workflow.choose_root(&root, &mut notices)?;
        let stale = workflow.find(Path::new("a.csv")).unwrap();

        let small = temp.path().join("small");
        fs::create_dir_all(&small)?;
        fs::write(small.join("only.csv"), "lon,lat\n1,2\n")?;
        workflow.choose_root(&small, &mut notices)?;
        assert_eq!(workflow.tree().len(), 2);

        assert!(matches!(
            workflow.toggle(stale),
            Err(WorkflowError::UnknownNode(id)) if id == stale
        ));
        assert!(matches!(
            workflow.set_checked(stale, false),
            Err(WorkflowError::UnknownNode(_))
        ));
        assert_eq!(workflow.selection().files(), [small.join("only.csv")]);
        Ok(())
    }

    #[test]
    fn cancel_discards_the_run() -> Result<()> {
        let (_temp, root) = survey()?;
        let mut workflow = workflow();
        workflow.choose_root(&root, &mut NoticeLog::new())?;
        workflow.cancel();
        assert_cleared(&workflow);
        Ok(())
    }
}
