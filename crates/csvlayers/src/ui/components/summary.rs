//! Selection summary component.

use std::path::Path;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::app::selection::SelectionState;

/// Counts of selected directories and files plus the selected file list.
#[derive(Debug, Default)]
pub struct Summary;

impl Summary {
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        root: Option<&Path>,
        selection: &SelectionState,
    ) {
        let block = Block::default()
            .title("Selection Summary")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let Some(root) = root else {
            let placeholder = Paragraph::new("No directory chosen")
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(placeholder, inner);
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(inner);

        let header = Paragraph::new(header_lines(root, selection)).wrap(Wrap { trim: true });
        frame.render_widget(header, layout[0]);

        if selection.files().is_empty() {
            let empty = Paragraph::new("No files selected").style(Style::default().fg(Color::Red));
            frame.render_widget(empty, layout[1]);
            return;
        }
        let base = root.parent().unwrap_or(root);
        let items: Vec<ListItem> = selection
            .files()
            .iter()
            .map(|file| {
                let label = file.strip_prefix(base).unwrap_or(file).display().to_string();
                ListItem::new(label)
            })
            .collect();
        frame.render_widget(List::new(items), layout[1]);
    }
}

fn header_lines(root: &Path, selection: &SelectionState) -> Vec<Line<'static>> {
    let count = |label: &'static str, value: usize| {
        Line::from(vec![
            Span::styled(label, Style::default().fg(Color::Gray)),
            Span::raw(": "),
            Span::styled(value.to_string(), Style::default().fg(Color::Cyan)),
        ])
    };
    vec![
        Line::from(vec![
            Span::styled("Root", Style::default().fg(Color::Gray)),
            Span::raw(": "),
            Span::raw(root.display().to_string()),
        ]),
        count("Directories", selection.dirs().len()),
        count("Files", selection.files().len()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn renders_placeholder_without_root() {
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.size();
                Summary.render(frame, area, None, &SelectionState::new());
            })
            .unwrap();
    }

    #[test]
    fn lists_files_relative_to_root_parent() {
        let root = PathBuf::from("/data/survey");
        let mut selection = SelectionState::new();
        selection.add_dir(root.clone());
        selection.add_file(root.join("a.csv"));

        let mut terminal = Terminal::new(TestBackend::new(50, 8)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.size();
                Summary.render(frame, area, Some(&root), &selection);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Files: 1"));
        assert!(text.contains("survey/a.csv"));
    }
}
