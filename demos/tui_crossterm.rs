//! Terminal UI example using crossterm and ratatui.
//!
//! This example demonstrates how to embed vim_modal in a terminal application.
//! Run with: cargo run --example tui_crossterm

use std::borrow::Cow;
use std::io;

use crossterm::{
    event::{self, Event, KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use ropey::Rope;
use unicode_segmentation::UnicodeSegmentation;
use vim_modal::{
    Direction, Engine, Host, IncrementalSearch, KeyCode, KeyInput, ModeKind, Modifiers, Operation, Operations,
    Position, SearchStep, Selection, ShiftDirection, StatusSink, TextOps, VimError,
};

const WELCOME: &str = "Welcome to vim_modal!\n\nPress 'i' to enter insert mode.\nPress 'Esc' to return to normal mode.\nType :q<Enter> to quit.\n\nTry vim commands like:\n- hjkl, w, b, e, { and } for movement\n- dd to delete a line, . to repeat it\n- \"ayy to yank a line into register a\n- p to paste\n- v, V and <C-v> for visual mode\n- / to search\n";

/// The `/` prompt shown on the status line.
#[derive(Default)]
struct SearchPrompt {
    direction: Option<Direction>,
    typed: String,
}

impl SearchPrompt {
    fn display(&self) -> Option<String> {
        let prefix = match self.direction? {
            Direction::Forward => '/',
            Direction::Backward => '?',
        };
        Some(format!("{prefix}{}", self.typed))
    }
}

impl IncrementalSearch for SearchPrompt {
    fn begin(&mut self, direction: Direction) {
        self.direction = Some(direction);
        self.typed.clear();
    }

    fn process(&mut self, key: KeyInput) -> SearchStep {
        match key.code() {
            KeyCode::Enter => {
                self.direction = None;
                SearchStep::Complete(std::mem::take(&mut self.typed))
            }
            KeyCode::Esc => {
                self.direction = None;
                SearchStep::Cancelled
            }
            KeyCode::Backspace => {
                if self.typed.pop().is_none() {
                    self.direction = None;
                    return SearchStep::Cancelled;
                }
                SearchStep::NeedMore
            }
            _ => {
                if let Some(c) = key.plain_char() {
                    self.typed.push(c);
                }
                SearchStep::NeedMore
            }
        }
    }
}

/// Text buffer implementation using ropey
struct RopeHost {
    rope: Rope,
    cursor: Position,
    selection: Option<Selection>,
    selection_changed: bool,
    search: SearchPrompt,
    message: Option<String>,
    should_quit: bool,
}

impl RopeHost {
    fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Position::ZERO,
            selection: None,
            selection_changed: false,
            search: SearchPrompt::default(),
            message: None,
            should_quit: false,
        }
    }

    fn position_to_char_idx(&self, pos: Position) -> usize {
        if pos.line as usize >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        let line_start = self.rope.line_to_char(pos.line as usize);
        let chars: usize = self
            .line_text(pos.line)
            .graphemes(true)
            .take(pos.col as usize)
            .map(|g| g.chars().count())
            .sum();
        line_start + chars
    }

    fn char_idx_to_position(&self, idx: usize) -> Position {
        let line = self.rope.char_to_line(idx);
        let line_start = self.rope.line_to_char(line);
        let col = self.rope.slice(line_start..idx).to_string().graphemes(true).count();
        Position::new(line as u32, col as u32)
    }

    fn remove(&mut self, start: Position, end: Position) {
        let (a, b) = (self.position_to_char_idx(start), self.position_to_char_idx(end));
        if a < b {
            self.rope.remove(a..b);
        }
    }

    fn shift_line(&mut self, line: u32, direction: ShiftDirection) {
        let start = self.rope.line_to_char(line as usize);
        let text = self.line_text(line).into_owned();
        match direction {
            ShiftDirection::Right if !text.is_empty() => self.rope.insert(start, "    "),
            ShiftDirection::Right => {}
            ShiftDirection::Left => {
                let indent = text.chars().take(4).take_while(|c| *c == ' ').count();
                self.rope.remove(start..start + indent);
            }
        }
    }

    fn execute_command_line(&mut self, line: &str) {
        match line.trim() {
            "q" | "q!" | "wq" | "x" => self.should_quit = true,
            other => self.message = Some(format!("Not an editor command: {other}")),
        }
    }

    fn status(&self, engine: &Engine) -> String {
        if let Some(prompt) = self.search.display() {
            return prompt;
        }
        let snapshot = engine.snapshot();
        if let Some(line) = snapshot.command_line {
            return format!(":{line}");
        }
        if let Some(message) = &self.message {
            return message.clone();
        }
        let mode = match snapshot.mode {
            ModeKind::Normal => "",
            ModeKind::Insert => "-- INSERT --",
            ModeKind::Replace => "-- REPLACE --",
            ModeKind::Visual(vim_modal::VisualKind::Character) => "-- VISUAL --",
            ModeKind::Visual(vim_modal::VisualKind::Line) => "-- VISUAL LINE --",
            ModeKind::Visual(vim_modal::VisualKind::Block) => "-- VISUAL BLOCK --",
            ModeKind::Command => "",
        };
        format!("{mode:<20}{}", snapshot.pending_keys)
    }
}

impl TextOps for RopeHost {
    fn line_count(&self) -> u32 {
        let lines = self.rope.len_lines() as u32;
        let chars = self.rope.len_chars();
        if lines > 1 && self.rope.char(chars - 1) == '\n' {
            lines - 1
        } else {
            lines
        }
    }

    fn line_text(&self, line: u32) -> Cow<'_, str> {
        if line as usize >= self.rope.len_lines() {
            return Cow::Borrowed("");
        }
        let slice = self.rope.line(line as usize);
        let text = slice.to_string();
        Cow::Owned(text.trim_end_matches(['\n', '\r']).to_string())
    }

    fn search_forward(&self, from: Position, needle: &str, wrap: bool) -> Option<Position> {
        let text = self.rope.to_string();
        let at = self.position_to_char_idx(from);
        let (at_byte, next_byte) = (
            self.rope.char_to_byte(at),
            self.rope.char_to_byte((at + 1).min(self.rope.len_chars())),
        );
        let found = text[next_byte..]
            .find(needle)
            .map(|i| next_byte + i)
            .or_else(|| if wrap { text[..at_byte].find(needle) } else { None })?;
        Some(self.char_idx_to_position(self.rope.byte_to_char(found)))
    }

    fn search_backward(&self, from: Position, needle: &str, wrap: bool) -> Option<Position> {
        let text = self.rope.to_string();
        let at = self.position_to_char_idx(from);
        let (at_byte, next_byte) = (
            self.rope.char_to_byte(at),
            self.rope.char_to_byte((at + 1).min(self.rope.len_chars())),
        );
        let found = text[..at_byte].rfind(needle).or_else(|| {
            if wrap {
                text[next_byte..].rfind(needle).map(|i| next_byte + i)
            } else {
                None
            }
        })?;
        Some(self.char_idx_to_position(self.rope.byte_to_char(found)))
    }
}

impl Operations for RopeHost {
    fn cursor(&self) -> Position {
        self.cursor
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn apply(&mut self, op: Operation) {
        match op {
            Operation::SetCursor(pos) => self.cursor = pos,
            Operation::SetSelection(selection) => {
                self.selection_changed |= self.selection != selection;
                self.selection = selection;
            }
            Operation::Delete { range } => self.remove(range.start, range.end),
            Operation::InsertText { at, text } => {
                let idx = self.position_to_char_idx(at);
                self.rope.insert(idx, &text);
            }
            Operation::Replace { range, text } => {
                self.remove(range.start, range.end);
                let idx = self.position_to_char_idx(range.start);
                self.rope.insert(idx, &text);
            }
            Operation::ShiftLines {
                first_line,
                count,
                direction,
            } => {
                let end = (first_line + count).min(self.line_count());
                for line in first_line..end {
                    self.shift_line(line, direction);
                }
            }
            Operation::ExecuteCommandLine(line) => self.execute_command_line(&line),
            Operation::Undo { .. } | Operation::Redo { .. } => {
                self.message = Some("Undo is not available in this demo".to_string());
            }
            Operation::Scroll { .. } | Operation::GoToTab(_) => {}
        }
    }
}

impl StatusSink for RopeHost {
    fn on_error(&mut self, error: &VimError) {
        self.message = Some(error.to_string());
    }
}

impl Host for RopeHost {
    fn incremental_search(&mut self) -> Option<&mut dyn IncrementalSearch> {
        Some(&mut self.search)
    }
}

struct App {
    engine: Engine,
    host: RopeHost,
}

impl App {
    fn new() -> Self {
        Self {
            engine: Engine::new(),
            host: RopeHost::new(WELCOME),
        }
    }

    fn handle_crossterm_event(&mut self, event: CKeyEvent) {
        let Some(key) = convert_crossterm_event(event) else {
            return;
        };
        self.host.message = None;
        self.engine.process(&mut self.host, key);
        if std::mem::take(&mut self.host.selection_changed) {
            self.engine.on_selection_changed(&mut self.host);
        }
        self.engine.run_deferred(&mut self.host);
    }
}

fn convert_crossterm_event(event: CKeyEvent) -> Option<KeyInput> {
    let mut mods = Modifiers::empty();
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        mods |= Modifiers::CTRL;
    }
    if event.modifiers.contains(KeyModifiers::ALT) {
        mods |= Modifiers::ALT;
    }
    let code = match event.code {
        // Shift is already folded into the character.
        CKeyCode::Char(c) => KeyCode::Char(c),
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Tab => KeyCode::Tab,
        CKeyCode::Delete => KeyCode::Delete,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Home => KeyCode::Home,
        CKeyCode::End => KeyCode::End,
        CKeyCode::PageUp => KeyCode::PageUp,
        CKeyCode::PageDown => KeyCode::PageDown,
        CKeyCode::Insert => KeyCode::Insert,
        _ => return None,
    };
    Some(KeyInput::from_key(code, mods))
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .margin(1)
        .constraints([Constraint::Min(3), Constraint::Length(3)].as_ref())
        .split(f.size());

    let host = &app.host;
    let mut lines = vec![];
    for i in 0..host.line_count() {
        let line_text = host.line_text(i).into_owned();

        // Highlight selected lines
        if let Some(sel) = host.selection
            && i >= sel.start.line.min(sel.end.line)
            && i <= sel.start.line.max(sel.end.line)
        {
            lines.push(Line::from(Span::styled(line_text, Style::default().bg(Color::Blue))));
            continue;
        }

        lines.push(Line::from(line_text));
    }

    let text = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("vim_modal demo"));
    f.render_widget(text, chunks[0]);

    let status = Paragraph::new(host.status(&app.engine))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[1]);

    f.set_cursor(
        chunks[0].x + 1 + host.cursor.col as u16,
        chunks[0].y + 1 + host.cursor.line as u16,
    );
}

fn main() -> Result<(), io::Error> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();

    loop {
        terminal.draw(|f| ui(f, &app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if key.code == CKeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }

            app.handle_crossterm_event(key);

            if app.host.should_quit {
                break;
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
