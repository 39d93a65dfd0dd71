#![allow(dead_code)]

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use ropey::Rope;
use unicode_segmentation::UnicodeSegmentation;
use vim_modal::{
    Clipboard, Direction, DisplayWindowBroker, Engine, Host, IncrementalSearch, KeyCode, KeyInput, Operation,
    Operations, Position, ProcessResult, Selection, SearchStep, ShiftDirection, StatusSink, TextOps, VimError,
};

const SHIFT_WIDTH: usize = 4;

/// The `/` prompt: collects typed characters until Enter or Escape.
#[derive(Debug, Default)]
pub struct MockSearch {
    pub direction: Option<Direction>,
    pub typed: String,
}

impl IncrementalSearch for MockSearch {
    fn begin(&mut self, direction: Direction) {
        self.direction = Some(direction);
        self.typed.clear();
    }

    fn process(&mut self, key: KeyInput) -> SearchStep {
        match key.code() {
            KeyCode::Enter => SearchStep::Complete(std::mem::take(&mut self.typed)),
            KeyCode::Esc => SearchStep::Cancelled,
            KeyCode::Backspace => {
                self.typed.pop();
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

#[derive(Debug, Default)]
pub struct MockCompletion {
    pub active: bool,
    pub dismissed: usize,
}

impl DisplayWindowBroker for MockCompletion {
    fn is_completion_active(&self) -> bool {
        self.active
    }

    fn dismiss_completion(&mut self) {
        self.active = false;
        self.dismissed += 1;
    }
}

/// A rope-backed host that applies every operation the engine emits and
/// records it.
pub struct MockHost {
    rope: Rope,
    cursor: Position,
    selection: Option<Selection>,
    selection_changed: bool,
    pub ops: Vec<Operation>,
    pub errors: Vec<String>,
    pub beeps: usize,
    pub search: MockSearch,
    pub search_enabled: bool,
    pub completion: MockCompletion,
}

impl MockHost {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Position::ZERO,
            selection: None,
            selection_changed: false,
            ops: Vec::new(),
            errors: Vec::new(),
            beeps: 0,
            search: MockSearch::default(),
            search_enabled: true,
            completion: MockCompletion::default(),
        }
    }

    pub fn at(text: &str, line: u32, col: u32) -> Self {
        let mut host = Self::new(text);
        host.cursor = Position::new(line, col);
        host
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn set_cursor(&mut self, line: u32, col: u32) {
        self.cursor = Position::new(line, col);
    }

    /// A selection made by the user, not the engine.
    pub fn select(&mut self, selection: Option<Selection>) {
        self.selection = selection;
        self.selection_changed = true;
    }

    pub fn take_selection_changed(&mut self) -> bool {
        std::mem::take(&mut self.selection_changed)
    }

    pub fn executed_command_lines(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Operation::ExecuteCommandLine(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    fn char_index(&self, pos: Position) -> usize {
        if pos.line as usize >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        let start = self.rope.line_to_char(pos.line as usize);
        let text = self.line_text(pos.line);
        let chars: usize = text
            .graphemes(true)
            .take(pos.col as usize)
            .map(|g| g.chars().count())
            .sum();
        start + chars
    }

    fn position_of_byte(&self, byte: usize) -> Position {
        let char_idx = self.rope.byte_to_char(byte);
        let line = self.rope.char_to_line(char_idx);
        let prefix = self
            .rope
            .slice(self.rope.line_to_char(line)..char_idx)
            .to_string();
        Position::new(line as u32, prefix.graphemes(true).count() as u32)
    }

    fn match_bytes(&self, needle: &str) -> (String, Vec<usize>) {
        let text = self.rope.to_string();
        let hits = if needle.is_empty() {
            Vec::new()
        } else {
            text.match_indices(needle).map(|(i, _)| i).collect()
        };
        (text, hits)
    }

    fn remove(&mut self, start: Position, end: Position) {
        let (a, b) = (self.char_index(start), self.char_index(end));
        if a < b {
            self.rope.remove(a..b);
        }
    }

    fn shift_line(&mut self, line: u32, direction: ShiftDirection) {
        let text = self.line_text(line).into_owned();
        let start = self.rope.line_to_char(line as usize);
        match direction {
            ShiftDirection::Right if !text.is_empty() => {
                self.rope.insert(start, &" ".repeat(SHIFT_WIDTH));
            }
            ShiftDirection::Right => {}
            ShiftDirection::Left => {
                let remove = if text.starts_with('\t') {
                    1
                } else {
                    text.chars().take(SHIFT_WIDTH).take_while(|c| *c == ' ').count()
                };
                self.rope.remove(start..start + remove);
            }
        }
    }
}

impl TextOps for MockHost {
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
        let mut text = self.rope.line(line as usize).to_string();
        if text.ends_with('\n') {
            text.pop();
            if text.ends_with('\r') {
                text.pop();
            }
        }
        Cow::Owned(text)
    }

    fn search_forward(&self, from: Position, needle: &str, wrap: bool) -> Option<Position> {
        let (_, hits) = self.match_bytes(needle);
        let from = self.rope.char_to_byte(self.char_index(from));
        hits.iter()
            .find(|&&i| i > from)
            .or_else(|| if wrap { hits.iter().find(|&&i| i < from) } else { None })
            .map(|&i| self.position_of_byte(i))
    }

    fn search_backward(&self, from: Position, needle: &str, wrap: bool) -> Option<Position> {
        let (_, hits) = self.match_bytes(needle);
        let from = self.rope.char_to_byte(self.char_index(from));
        hits.iter()
            .rev()
            .find(|&&i| i < from)
            .or_else(|| if wrap { hits.iter().rev().find(|&&i| i > from) } else { None })
            .map(|&i| self.position_of_byte(i))
    }
}

impl Operations for MockHost {
    fn cursor(&self) -> Position {
        self.cursor
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn apply(&mut self, op: Operation) {
        match &op {
            Operation::SetCursor(pos) => self.cursor = *pos,
            Operation::SetSelection(selection) => {
                if self.selection != *selection {
                    self.selection = *selection;
                    self.selection_changed = true;
                }
            }
            Operation::Delete { range } => self.remove(range.start, range.end),
            Operation::InsertText { at, text } => {
                let at = self.char_index(*at);
                self.rope.insert(at, text);
            }
            Operation::Replace { range, text } => {
                self.remove(range.start, range.end);
                let at = self.char_index(range.start);
                self.rope.insert(at, text);
            }
            Operation::ShiftLines {
                first_line,
                count,
                direction,
            } => {
                let end = (first_line + count).min(self.line_count());
                for line in *first_line..end {
                    self.shift_line(line, *direction);
                }
            }
            Operation::Scroll { .. }
            | Operation::Undo { .. }
            | Operation::Redo { .. }
            | Operation::GoToTab(_)
            | Operation::ExecuteCommandLine(_) => {}
        }
        self.ops.push(op);
    }
}

impl StatusSink for MockHost {
    fn on_error(&mut self, error: &VimError) {
        self.errors.push(error.to_string());
    }

    fn beep(&mut self) {
        self.beeps += 1;
    }
}

impl Host for MockHost {
    fn incremental_search(&mut self) -> Option<&mut dyn IncrementalSearch> {
        if self.search_enabled {
            Some(&mut self.search)
        } else {
            None
        }
    }

    fn display_windows(&mut self) -> Option<&mut dyn DisplayWindowBroker> {
        Some(&mut self.completion)
    }
}

/// A clipboard whose content the test can inspect after handing it to
/// the engine.
#[derive(Debug, Default, Clone)]
pub struct MockClipboard {
    content: Rc<RefCell<Option<String>>>,
}

impl MockClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> Option<String> {
        self.content.borrow().clone()
    }
}

impl Clipboard for MockClipboard {
    fn get(&mut self) -> Option<String> {
        self.content.borrow().clone()
    }

    fn set(&mut self, text: String) {
        *self.content.borrow_mut() = Some(text);
    }
}

/// Drive the engine the way a host event loop would: process each key,
/// report selection changes, then run deferred work.
pub fn feed(engine: &mut Engine, host: &mut MockHost, notation: &str) -> ProcessResult {
    let keys = KeyInput::parse(notation).expect("valid key notation");
    let mut last = ProcessResult::Processed;
    for key in keys {
        last = engine.process(host, key);
        if host.take_selection_changed() {
            engine.on_selection_changed(host);
        }
        engine.run_deferred(host);
    }
    last
}

/// Run `notation` on `text` from `(line, col)` and return the host.
pub fn run(text: &str, line: u32, col: u32, notation: &str) -> (Engine, MockHost) {
    let mut engine = Engine::new();
    let mut host = MockHost::at(text, line, col);
    feed(&mut engine, &mut host, notation);
    (engine, host)
}
