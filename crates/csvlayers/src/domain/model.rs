//! Domain models for the layer hierarchy handed to the project tree.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Coordinate reference system every generated layer is declared in.
pub const LAYER_CRS: &str = "epsg:4326";

/// Column separator of a delimited text source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// Pick the delimiter from the file extension (`.csv` or `.tsv`, exact case).
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("csv") => Some(Delimiter::Comma),
            Some("tsv") => Some(Delimiter::Tab),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }

    /// Token used inside a layer URI.
    pub fn uri_token(self) -> &'static str {
        match self {
            Delimiter::Comma => ",",
            Delimiter::Tab => "\\t",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Delimiter::Comma => "comma",
            Delimiter::Tab => "tab",
        }
    }
}

/// X/Y column pair shared by every file of one confirm operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinateFields {
    pub x: String,
    pub y: String,
}

impl CoordinateFields {
    /// Build a pair, rejecting blank names.
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Option<Self> {
        let x = x.into().trim().to_owned();
        let y = y.into().trim().to_owned();
        if x.is_empty() || y.is_empty() {
            None
        } else {
            Some(Self { x, y })
        }
    }
}

/// Data source locator in the delimited-text provider format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LayerUri(String);

impl LayerUri {
    pub fn new(path: &Path, delimiter: Delimiter, fields: &CoordinateFields) -> Self {
        let location = path.display().to_string().replace('\\', "/");
        let location = location.trim_start_matches('/');
        Self(format!(
            "file:///{location}?delimiter={}&crs={LAYER_CRS}&xField={}&yField={}",
            delimiter.uri_token(),
            fields.x,
            fields.y
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tabular point layer attached under a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafNode {
    /// Display name, the file stem.
    pub name: String,
    pub source: PathBuf,
    pub delimiter: Delimiter,
    pub fields: CoordinateFields,
    pub uri: LayerUri,
}

impl LeafNode {
    pub fn new(source: PathBuf, delimiter: Delimiter, fields: CoordinateFields) -> Self {
        let name = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| source.display().to_string());
        let uri = LayerUri::new(&source, delimiter, &fields);
        Self {
            name,
            source,
            delimiter,
            fields,
            uri,
        }
    }

    /// File name including its extension.
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// Named container mirroring a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupNode {
    pub name: String,
    pub children: Vec<LayerTreeNode>,
}

impl GroupNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn group(&self, name: &str) -> Option<&GroupNode> {
        self.children.iter().find_map(|child| match child {
            LayerTreeNode::Group(group) if group.name == name => Some(group),
            _ => None,
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupNode> {
        self.children.iter().filter_map(|child| match child {
            LayerTreeNode::Group(group) => Some(group),
            LayerTreeNode::Layer(_) => None,
        })
    }

    pub fn layers(&self) -> impl Iterator<Item = &LeafNode> {
        self.children.iter().filter_map(|child| match child {
            LayerTreeNode::Layer(leaf) => Some(leaf),
            LayerTreeNode::Group(_) => None,
        })
    }

    /// Leaves anywhere below this group.
    pub fn layer_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                LayerTreeNode::Group(group) => group.layer_count(),
                LayerTreeNode::Layer(_) => 1,
            })
            .sum()
    }

    /// Groups anywhere below this group, not counting itself.
    pub fn group_count(&self) -> usize {
        self.groups().map(|group| 1 + group.group_count()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LayerTreeNode {
    Group(GroupNode),
    Layer(LeafNode),
}

/// Result of rebuilding a selection as groups and layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyOutput {
    pub root: GroupNode,
    /// Files dropped because they failed validation.
    pub skipped: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_follows_exact_extension() {
        assert_eq!(Delimiter::from_path(Path::new("a/b.csv")), Some(Delimiter::Comma));
        assert_eq!(Delimiter::from_path(Path::new("a/b.tsv")), Some(Delimiter::Tab));
        assert_eq!(Delimiter::from_path(Path::new("a/b.CSV")), None);
        assert_eq!(Delimiter::from_path(Path::new("a/b.txt")), None);
    }

    #[test]
    fn coordinate_fields_reject_blank_names() {
        assert!(CoordinateFields::new("lon", " ").is_none());
        assert!(CoordinateFields::new("", "lat").is_none());
        let fields = CoordinateFields::new(" lon ", "lat").unwrap();
        assert_eq!(fields.x, "lon");
    }

    #[test]
    fn layer_uri_encodes_delimiter_crs_and_fields() {
        let fields = CoordinateFields::new("lon", "lat").unwrap();
        let uri = LayerUri::new(Path::new("/data/points.tsv"), Delimiter::Tab, &fields);
        assert_eq!(
            uri.as_str(),
            "file:///data/points.tsv?delimiter=\\t&crs=epsg:4326&xField=lon&yField=lat"
        );
    }

    #[test]
    fn leaf_uses_file_stem_as_display_name() {
        let fields = CoordinateFields::new("x", "y").unwrap();
        let leaf = LeafNode::new("/data/wells.csv".into(), Delimiter::Comma, fields);
        assert_eq!(leaf.name, "wells");
        assert_eq!(leaf.file_name(), "wells.csv");
    }

    #[test]
    fn group_counts_nested_members() {
        let fields = CoordinateFields::new("x", "y").unwrap();
        let mut inner = GroupNode::new("inner");
        inner.children.push(LayerTreeNode::Layer(LeafNode::new(
            "/r/inner/a.csv".into(),
            Delimiter::Comma,
            fields.clone(),
        )));
        let mut root = GroupNode::new("r");
        root.children.push(LayerTreeNode::Group(inner));
        root.children.push(LayerTreeNode::Layer(LeafNode::new(
            "/r/b.csv".into(),
            Delimiter::Comma,
            fields,
        )));
        assert_eq!(root.layer_count(), 2);
        assert_eq!(root.group_count(), 1);
        assert!(root.group("inner").is_some());
    }
}
