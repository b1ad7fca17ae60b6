//! X/Y coordinate field picker.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::fields::FieldChoices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn other(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

#[derive(Debug, Default)]
pub struct FieldSelector;

impl FieldSelector {
    /// `active` is the axis the arrow keys currently cycle, if focused.
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        choices: &FieldChoices,
        active: Option<Axis>,
    ) {
        let border = if active.is_some() {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .title("Coordinates")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        let lines = if choices.is_empty() {
            vec![Line::styled(
                "No header columns",
                Style::default().fg(Color::DarkGray),
            )]
        } else {
            vec![
                field_line("X field", choices.x(), active == Some(Axis::X)),
                field_line("Y field", choices.y(), active == Some(Axis::Y)),
                Line::styled(
                    format!("{} columns", choices.columns().len()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]
        };
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

fn field_line(label: &'static str, value: Option<&str>, active: bool) -> Line<'static> {
    let mut value_style = Style::default().fg(Color::Green);
    if active {
        value_style = value_style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Gray)),
        Span::raw(": ‹ "),
        Span::styled(value.unwrap_or("-").to_owned(), value_style),
        Span::raw(" ›"),
    ])
}
