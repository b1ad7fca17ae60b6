//! Application loop for the TUI.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::app::workflow::{ConfirmReport, ImportWorkflow};
use crate::domain::ports::NoticeLevel;
use crate::infra::layer::DelimitedTextValidator;
use crate::infra::notify::NoticeLog;
use crate::infra::project::ProjectTree;
use crate::ui::components::field_selector::{Axis, FieldSelector};
use crate::ui::components::file_tree::{FileTree, FileTreeState};
use crate::ui::components::path_prompt::{PathPrompt, PathPromptState};
use crate::ui::components::summary::Summary;

const TICK_RATE: Duration = Duration::from_millis(120);

/// How the dialog ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Confirmed(ConfirmReport),
    Cancelled,
}

/// Interactive picker: choose a root, adjust checks and fields, confirm.
pub struct UiApp {
    workflow: ImportWorkflow,
    validator: DelimitedTextValidator,
    project: ProjectTree,
    notices: NoticeLog,
    tree: FileTreeState,
    prompt: PathPromptState,
    status: Option<StatusMessage>,
    focus: FocusTarget,
    outcome: Option<Outcome>,
}

impl UiApp {
    pub fn new(workflow: ImportWorkflow, validator: DelimitedTextValidator) -> Self {
        Self {
            workflow,
            validator,
            project: ProjectTree::new(),
            notices: NoticeLog::new(),
            tree: FileTreeState::default(),
            prompt: PathPromptState::default(),
            status: None,
            focus: FocusTarget::Tree,
            outcome: None,
        }
    }

    pub fn workflow(&self) -> &ImportWorkflow {
        &self.workflow
    }

    /// Groups accepted by confirm so far.
    pub fn project(&self) -> &ProjectTree {
        &self.project
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Scan `root` and show its tree. Failures end up on the status line.
    pub fn open(&mut self, root: &Path) {
        let result = self.workflow.choose_root(root, &mut self.notices);
        match result {
            Ok(fields) => {
                let columns = fields.columns().len();
                self.set_status(
                    StatusLevel::Info,
                    format!("Scanned {} · {columns} header columns", root.display()),
                );
            }
            Err(err) => self.set_status(StatusLevel::Error, err.to_string()),
        }
        self.flush_notices();
        self.tree.reset(self.workflow.tree());
        self.focus = FocusTarget::Tree;
    }

    /// Launch the terminal UI and run until the user confirms or cancels.
    pub fn run(&mut self) -> Result<Outcome> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        terminal.hide_cursor().ok();

        let event_loop_result = self.event_loop(&mut terminal);

        disable_raw_mode().ok();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        event_loop_result?;
        Ok(self.outcome.clone().unwrap_or(Outcome::Cancelled))
    }

    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;
            self.tick();

            if self.outcome.is_some() {
                break;
            }

            if event::poll(TICK_RATE)?
                && let Event::Key(key) = event::read()?
            {
                self.handle_key_event(key);
            }
        }
        Ok(())
    }

    pub fn render(&self, frame: &mut Frame<'_>) {
        let size = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(2)])
            .split(size);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(42)])
            .split(layout[0]);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(5),
                Constraint::Length(4),
            ])
            .split(main_chunks[1]);

        FileTree.render(
            frame,
            main_chunks[0],
            self.workflow.tree(),
            &self.tree,
            self.focus == FocusTarget::Tree,
        );

        let active_axis = match self.focus {
            FocusTarget::Fields(axis) => Some(axis),
            FocusTarget::Tree => None,
        };
        FieldSelector.render(
            frame,
            right_chunks[0],
            self.workflow.fields(),
            active_axis,
        );
        Summary.render(
            frame,
            right_chunks[1],
            self.workflow.root(),
            self.workflow.selection(),
        );

        let key = |text: &'static str| Span::styled(text, Style::default().fg(Color::Cyan));
        let hints = Paragraph::new(Line::from(vec![
            key("space"),
            Span::raw(" check · "),
            key("h/l"),
            Span::raw(" fold · "),
            key("tab"),
            Span::raw(" fields · "),
            key("b"),
            Span::raw(" browse · "),
            key("↵"),
            Span::raw(" confirm · "),
            key("esc"),
            Span::raw(" cancel"),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray));
        frame.render_widget(hints, right_chunks[2]);

        self.render_status(frame, layout[1]);
        PathPrompt.render(frame, size, &self.prompt);
    }

    fn render_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let line = match &self.status {
            Some(status) => {
                let style = match status.level {
                    StatusLevel::Info => Style::default().fg(Color::Gray),
                    StatusLevel::Success => Style::default().fg(Color::Green),
                    StatusLevel::Warning => Style::default().fg(Color::Yellow),
                    StatusLevel::Error => Style::default().fg(Color::Red),
                };
                Line::styled(status.text.clone(), style)
            }
            None => Line::styled(
                "Ready · press b to choose a directory",
                Style::default().fg(Color::DarkGray),
            ),
        };
        frame.render_widget(Paragraph::new(line), inner);
    }

    fn tick(&mut self) {
        if let Some(status) = &self.status
            && status.is_expired()
        {
            self.status = None;
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if self.prompt.is_open() {
            self.handle_prompt_key(key);
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.cancel();
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.cancel(),
            KeyCode::Enter => self.confirm(),
            KeyCode::Char('b') => {
                let current = self
                    .workflow
                    .root()
                    .map(|root| root.display().to_string())
                    .unwrap_or_default();
                self.prompt.open_with(current);
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    FocusTarget::Tree => FocusTarget::Fields(Axis::X),
                    FocusTarget::Fields(Axis::X) => FocusTarget::Fields(Axis::Y),
                    FocusTarget::Fields(Axis::Y) => FocusTarget::Tree,
                };
            }
            _ => match self.focus {
                FocusTarget::Tree => self.handle_tree_key(key),
                FocusTarget::Fields(axis) => self.handle_fields_key(key, axis),
            },
        }
    }

    fn handle_tree_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.tree.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.tree.select_previous(),
            KeyCode::Char('h') | KeyCode::Left => {
                self.tree.collapse_or_parent(self.workflow.tree());
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.tree.expand_or_open(self.workflow.tree());
            }
            KeyCode::Char(' ') => self.toggle_current(),
            _ => {}
        }
    }

    fn handle_fields_key(&mut self, key: KeyEvent, axis: Axis) {
        let step = match key.code {
            KeyCode::Char('h') | KeyCode::Left => -1,
            KeyCode::Char('l') | KeyCode::Right => 1,
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Char('k') | KeyCode::Up => {
                self.focus = FocusTarget::Fields(axis.other());
                return;
            }
            _ => return,
        };
        let fields = self.workflow.fields_mut();
        match axis {
            Axis::X => fields.cycle_x(step),
            Axis::Y => fields.cycle_y(step),
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.prompt.close(),
            KeyCode::Enter => {
                let input = self.prompt.take_input();
                self.prompt.close();
                let input = input.trim();
                if !input.is_empty() {
                    self.open(&PathBuf::from(input));
                }
            }
            KeyCode::Backspace => self.prompt.pop_char(),
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.prompt.push_char(ch);
            }
            _ => {}
        }
    }

    fn toggle_current(&mut self) {
        let Some(node) = self.tree.selected_node() else {
            return;
        };
        if let Err(err) = self.workflow.toggle(node) {
            self.set_status(StatusLevel::Error, err.to_string());
        }
    }

    fn confirm(&mut self) {
        let result = self
            .workflow
            .confirm(&self.validator, &mut self.project, &mut self.notices);
        let notified = self.flush_notices();
        match result {
            Ok(report) => {
                let added = format!("Added {} with {} layers", report.group, report.layers);
                if report.skipped.is_empty() {
                    self.set_status(StatusLevel::Success, added);
                } else {
                    let skipped = skipped_summary(&report.skipped);
                    self.set_status(StatusLevel::Warning, format!("{added} · {skipped}"));
                }
                self.outcome = Some(Outcome::Confirmed(report));
            }
            Err(err) => {
                // The workflow is already reset; stay open so another root can be chosen.
                if !notified {
                    self.set_status(StatusLevel::Error, err.to_string());
                }
            }
        }
        self.tree.reset(self.workflow.tree());
    }

    fn cancel(&mut self) {
        self.workflow.cancel();
        self.tree.reset(self.workflow.tree());
        self.outcome = Some(Outcome::Cancelled);
    }

    /// Surface the newest notice on the status line, with the number of
    /// warnings when there was more than one.
    fn flush_notices(&mut self) -> bool {
        let mut notices = self.notices.drain();
        let warnings = notices
            .iter()
            .filter(|notice| notice.level == NoticeLevel::Warning)
            .count();
        let Some(notice) = notices.pop() else {
            return false;
        };
        let level = match notice.level {
            NoticeLevel::Info => StatusLevel::Info,
            NoticeLevel::Warning => StatusLevel::Warning,
        };
        let text = match warnings {
            0 | 1 => notice.message,
            count => format!("{} ({count} warnings)", notice.message),
        };
        self.set_status(level, text);
        true
    }

    fn set_status<S: Into<String>>(&mut self, level: StatusLevel, message: S) {
        self.status = Some(StatusMessage::new(level, message.into()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusTarget {
    Tree,
    Fields(Axis),
}

#[derive(Debug)]
struct StatusMessage {
    level: StatusLevel,
    text: String,
    expires_at: Instant,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: String) -> Self {
        Self {
            level,
            text,
            expires_at: Instant::now() + Duration::from_secs(6),
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

const SKIPPED_NAMES_SHOWN: usize = 3;

/// "2 files skipped: a.csv, b.csv", listing at most a few names.
fn skipped_summary(skipped: &[PathBuf]) -> String {
    let noun = if skipped.len() == 1 { "file" } else { "files" };
    let mut names: Vec<String> = skipped
        .iter()
        .take(SKIPPED_NAMES_SHOWN)
        .map(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string())
        })
        .collect();
    if skipped.len() > SKIPPED_NAMES_SHOWN {
        names.push("…".to_owned());
    }
    format!("{} {noun} skipped: {}", skipped.len(), names.join(", "))
}
