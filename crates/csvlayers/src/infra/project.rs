//! In-memory project layer tree and its on-disk JSON form.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::domain::model::{GroupNode, LayerTreeNode, LAYER_CRS};
use crate::domain::ports::LayerTreeSink;

/// Project-level layer tree receiving one top-level group per confirm.
#[derive(Debug, Default, Clone)]
pub struct ProjectTree {
    groups: Vec<GroupNode>,
}

/// Serializable snapshot written by [`ProjectTree::write_json`].
#[derive(Debug, Serialize)]
pub struct ProjectDocument<'a> {
    pub generated_at: String,
    pub crs: &'static str,
    pub groups: &'a [GroupNode],
}

impl ProjectTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[GroupNode] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .context("failed to format timestamp")?;
        let document = ProjectDocument {
            generated_at,
            crs: LAYER_CRS,
            groups: &self.groups,
        };
        serde_json::to_string_pretty(&document).context("failed to serialize project tree")
    }

    /// Persist the tree as JSON, creating parent directories as needed.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        let data = self.to_json()?;
        fs::write(path, data)
            .with_context(|| format!("failed to write project tree to {}", path.display()))?;
        Ok(())
    }

    /// Indented outline, one line per group or layer.
    pub fn render_text(&self) -> String {
        let mut lines = Vec::new();
        for group in &self.groups {
            render_group(group, 0, &mut lines);
        }
        lines.join("\n")
    }
}

impl LayerTreeSink for ProjectTree {
    fn add_root_group(&mut self, group: GroupNode) {
        self.groups.push(group);
    }
}

fn render_group(group: &GroupNode, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!("{}{}/", "  ".repeat(depth), group.name));
    for child in &group.children {
        match child {
            LayerTreeNode::Group(inner) => render_group(inner, depth + 1, lines),
            LayerTreeNode::Layer(leaf) => lines.push(format!(
                "{}{} [{}] x={} y={}",
                "  ".repeat(depth + 1),
                leaf.file_name(),
                leaf.delimiter.name(),
                leaf.fields.x,
                leaf.fields.y
            )),
        }
    }
}
