//! Overlay prompt for typing a new root directory.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Input buffer behind the browse prompt.
#[derive(Debug, Default, Clone)]
pub struct PathPromptState {
    visible: bool,
    input: String,
}

impl PathPromptState {
    /// Show the prompt prefilled with `current`, usually the active root.
    pub fn open_with<S: Into<String>>(&mut self, current: S) {
        self.visible = true;
        self.input = current.into();
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Consume the typed path, leaving the buffer empty.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }
}

/// Draws the prompt centred near the bottom of `area`.
#[derive(Debug, Default)]
pub struct PathPrompt;

impl PathPrompt {
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, state: &PathPromptState) {
        if !state.is_open() {
            return;
        }

        let width = area.width.saturating_sub(10).min(80);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + area.height.saturating_sub(6),
            width,
            height: 5.min(area.height),
        };

        frame.render_widget(Clear, popup);
        let block = Block::default()
            .title("Choose directory")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        frame.render_widget(block.clone(), popup);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(block.inner(popup));

        let prompt = Paragraph::new(format!("> {}", state.input()))
            .style(Style::default().fg(Color::White));
        frame.render_widget(prompt, layout[0]);

        let hint = Paragraph::new("enter to scan · esc to keep the current tree")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, layout[1]);
    }
}
