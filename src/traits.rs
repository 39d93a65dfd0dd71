use std::borrow::Cow;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::VimError;
use crate::key::KeyInput;
use crate::types::{Direction, Operation, Position, Range, Selection};

/// Read access to the host's current text snapshot.
///
/// Lines are counted the way Vim counts them: a trailing line break does not
/// start an extra line, and an empty buffer has one empty line.
pub trait TextOps {
    // Basic queries
    fn line_count(&self) -> u32;
    /// The text of `line` without its line break; empty past the last line.
    fn line_text(&self, line: u32) -> Cow<'_, str>;

    // Search forward/back from (line,col) including wrap; returns position at start of match.
    // The match at `from` itself is never returned.
    fn search_forward(&self, from: Position, needle: &str, wrap: bool) -> Option<Position>;
    fn search_backward(&self, from: Position, needle: &str, wrap: bool) -> Option<Position>;

    /// Line length in grapheme columns.
    fn line_len(&self, line: u32) -> u32 {
        self.line_text(line).graphemes(true).count() as u32
    }

    fn last_line(&self) -> u32 {
        self.line_count().saturating_sub(1)
    }

    fn line_start(&self, line: u32) -> Position {
        Position { line, col: 0 }
    }

    /// Last character of the line (before the line break, if any).
    fn line_end(&self, line: u32) -> Position {
        Position {
            line,
            col: self.line_len(line).saturating_sub(1),
        }
    }

    fn clamp(&self, pos: Position) -> Position {
        let last_line = self.last_line();
        let line = pos.line.min(last_line);
        let col = pos.col.min(self.line_len(line));
        Position { line, col }
    }

    /// Column of the first non-blank character, or the line length for a
    /// blank line.
    fn first_non_blank(&self, line: u32) -> u32 {
        let text = self.line_text(line);
        let mut col = 0;
        for g in text.graphemes(true) {
            if !g.chars().all(char::is_whitespace) {
                return col;
            }
            col += 1;
        }
        col
    }

    fn grapheme_at(&self, pos: Position) -> Option<String> {
        self.line_text(pos.line)
            .graphemes(true)
            .nth(pos.col as usize)
            .map(str::to_owned)
    }

    // Extract text from a range for yanking
    fn slice_to_string(&self, range: Range) -> String {
        let mut out = String::new();
        let start = range.start;
        let end = range.end;
        let mut line = start.line;
        while line <= end.line && line < self.line_count() {
            let text = self.line_text(line);
            let from = if line == start.line { start.col } else { 0 };
            let graphemes = text.graphemes(true).skip(from as usize);
            if line == end.line {
                let take = end.col.saturating_sub(from) as usize;
                out.extend(graphemes.take(take));
            } else {
                out.extend(graphemes);
                out.push('\n');
            }
            line += 1;
        }
        out
    }
}

/// The host's mutation facade.
///
/// The engine requests every text change, caret move and selection update
/// through [`Operations::apply`]; the snapshot read through [`TextOps`] must
/// reflect an operation once `apply` returns.
pub trait Operations {
    fn cursor(&self) -> Position;

    /// The host's current selection, if any.
    fn selection(&self) -> Option<Selection> {
        None
    }

    fn apply(&mut self, op: Operation);
}

/// Status line sink for failed commands.
pub trait StatusSink {
    fn on_error(&mut self, error: &VimError);

    fn beep(&mut self) {}
}

/// Outcome of feeding one key to an incremental search prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStep {
    NeedMore,
    Complete(String),
    Cancelled,
}

/// The host's `/` and `?` prompt.
pub trait IncrementalSearch {
    fn begin(&mut self, direction: Direction);
    fn process(&mut self, key: KeyInput) -> SearchStep;
}

/// Completion popups, smart tags and similar transient windows.
pub trait DisplayWindowBroker {
    fn is_completion_active(&self) -> bool;
    fn dismiss_completion(&mut self);
}

pub trait Clipboard {
    fn get(&mut self) -> Option<String>;
    fn set(&mut self, text: String);
}

/// Everything the engine needs from the editor it is embedded in.
pub trait Host: TextOps + Operations + StatusSink {
    fn incremental_search(&mut self) -> Option<&mut dyn IncrementalSearch> {
        None
    }

    fn display_windows(&mut self) -> Option<&mut dyn DisplayWindowBroker> {
        None
    }

    fn completion_active(&mut self) -> bool {
        self.display_windows()
            .is_some_and(|broker| broker.is_completion_active())
    }
}
