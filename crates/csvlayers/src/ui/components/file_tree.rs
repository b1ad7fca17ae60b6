//! Checkable directory tree component and its navigation state.

use std::collections::HashSet;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::domain::tree::{CheckTree, NodeId};

/// Cursor and expansion state over a [`CheckTree`].
#[derive(Debug, Default, Clone)]
pub struct FileTreeState {
    visible: Vec<Row>,
    selected: usize,
    expanded: HashSet<NodeId>,
}

#[derive(Debug, Clone, Copy)]
struct Row {
    node: NodeId,
    depth: usize,
}

impl FileTreeState {
    /// Start fresh on a newly built tree with the top-level nodes expanded.
    pub fn reset(&mut self, tree: &CheckTree) {
        self.expanded = tree.roots().iter().copied().collect();
        self.selected = 0;
        self.refresh(tree);
    }

    /// Recompute the visible rows after the tree or expansion changed.
    pub fn refresh(&mut self, tree: &CheckTree) {
        self.visible.clear();
        for root in tree.roots() {
            self.push_visible(tree, *root, 0);
        }
        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }

    fn push_visible(&mut self, tree: &CheckTree, node: NodeId, depth: usize) {
        self.visible.push(Row { node, depth });
        if self.expanded.contains(&node) {
            for child in tree.children(node) {
                self.push_visible(tree, *child, depth + 1);
            }
        }
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.visible.get(self.selected).map(|row| row.node)
    }

    pub fn selected_index(&self) -> Option<usize> {
        if self.visible.is_empty() {
            None
        } else {
            Some(self.selected)
        }
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_expanded(&self, node: NodeId) -> bool {
        self.expanded.contains(&node)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// Expand the selected directory, or step into it when already open.
    pub fn expand_or_open(&mut self, tree: &CheckTree) {
        let Some(node) = self.selected_node() else {
            return;
        };
        if !tree.kind(node).is_dir() || tree.children(node).is_empty() {
            return;
        }
        if self.expanded.insert(node) {
            self.refresh(tree);
        } else {
            self.select_next();
        }
    }

    /// Collapse the selected directory or move the cursor to its parent.
    pub fn collapse_or_parent(&mut self, tree: &CheckTree) {
        let Some(node) = self.selected_node() else {
            return;
        };
        if self.expanded.remove(&node) {
            self.refresh(tree);
        } else if let Some(parent) = tree.parent(node)
            && let Some(pos) = self.visible.iter().position(|row| row.node == parent)
        {
            self.selected = pos;
        }
    }
}

/// Renders the tree with one checkbox per row.
#[derive(Debug, Default)]
pub struct FileTree;

impl FileTree {
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        tree: &CheckTree,
        state: &FileTreeState,
        has_focus: bool,
    ) {
        let border = if has_focus { Color::Cyan } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Files")
            .border_style(Style::default().fg(border));

        if state.visible_len() == 0 {
            let placeholder = Paragraph::new("Press b to choose a directory")
                .block(block)
                .style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                );
            frame.render_widget(placeholder, area);
            return;
        }

        let items: Vec<ListItem> = state
            .visible
            .iter()
            .map(|row| ListItem::new(row_line(tree, state, *row)))
            .collect();

        let mut list_state = ListState::default();
        list_state.select(state.selected_index());

        let highlight = Style::default()
            .fg(Color::Black)
            .bg(if has_focus { Color::Cyan } else { Color::Gray })
            .add_modifier(Modifier::BOLD);
        let list = List::new(items)
            .block(block)
            .highlight_style(highlight)
            .highlight_symbol("▸ ");
        frame.render_stateful_widget(list, area, &mut list_state);
    }
}

fn row_line(tree: &CheckTree, state: &FileTreeState, row: Row) -> Line<'static> {
    let node = tree.node(row.node);
    let (checkbox, check_style) = if node.is_checked() {
        ("[x] ", Style::default().fg(Color::Green))
    } else {
        ("[ ] ", Style::default().fg(Color::DarkGray))
    };

    let mut spans = vec![
        Span::raw("  ".repeat(row.depth)),
        Span::styled(checkbox, check_style),
    ];
    if node.kind().is_dir() {
        let symbol = if state.is_expanded(row.node) {
            "▾ "
        } else if node.children().is_empty() {
            "· "
        } else {
            "▸ "
        };
        spans.push(Span::styled(symbol, Style::default().fg(Color::Yellow)));
        spans.push(Span::styled(
            format!("{}/", node.label()),
            Style::default().fg(Color::Yellow),
        ));
    } else {
        spans.push(Span::raw(node.label().to_owned()));
    }
    Line::from(spans)
}
