//! The mode state machines.
//!
//! Each mode is a plain struct driven by the [`Engine`](crate::Engine),
//! which dispatches on [`ModeKind`] with a `match`. A mode receives the
//! shared [`Context`](crate::context::Context) and the host on every call
//! and reports what should happen next through a [`ProcessResult`].

mod command_line;
mod insert;
mod normal;
mod ops;
mod replace;
mod visual;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::VimError;
use crate::traits::{Host, TextOps};
use crate::types::{ModeKind, Operation, Position};

pub use command_line::CommandLineMode;
pub use insert::InsertMode;
pub use normal::{NormalAction, NormalMode};
pub use ops::{CaseChange, Operator};
pub use replace::ReplaceMode;
pub use visual::{VisualAction, VisualMode};

/// What a mode did with a key.
#[derive(Debug)]
pub enum ProcessResult {
    /// The key was consumed; the mode stays active.
    Processed,
    /// The active mode does not handle this key; the host may.
    NotHandled,
    SwitchMode(ModeKind),
    /// Return to the mode that was active before this one.
    SwitchPreviousMode,
    /// The command failed. The error has already been reported to the
    /// host's status sink.
    Error(VimError),
}

impl ProcessResult {
    pub fn is_handled(&self) -> bool {
        !matches!(self, ProcessResult::NotHandled)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ProcessResult::Error(_))
    }
}

/// Report a failed command: status line first, then the bell.
pub(crate) fn report<H: Host + ?Sized>(host: &mut H, err: &VimError) {
    tracing::debug!(target: "vim.error", error = %err, "command failed");
    host.on_error(err);
    host.beep();
}

pub(crate) fn grapheme_len(text: &str) -> u32 {
    text.graphemes(true).count() as u32
}

/// Where the caret ends up after `text` is inserted at `at`.
pub(crate) fn advance(at: Position, text: &str) -> Position {
    match text.rfind('\n') {
        Some(idx) => Position::new(
            at.line + text.matches('\n').count() as u32,
            grapheme_len(&text[idx + 1..]),
        ),
        None => Position::new(at.line, at.col + grapheme_len(text)),
    }
}

/// Longest text, in bytes, a count may build by repeating a string.
pub(crate) const MAX_REPEATED_LEN: usize = 64 * 1024 * 1024;

/// Fail with [`VimError::TextTooLong`] when `times` copies of `len` bytes
/// would exceed [`MAX_REPEATED_LEN`].
fn check_repeated_len(len: usize, times: u32) -> Result<(), VimError> {
    if len.saturating_mul(times as usize) > MAX_REPEATED_LEN {
        tracing::debug!(target: "vim.count", len, times, "repeated text too long");
        return Err(VimError::TextTooLong);
    }
    Ok(())
}

/// `text` repeated `times` times; with `new_line` every copy starts on a
/// line of its own.
pub(crate) fn repeated(text: &str, times: u32, new_line: bool) -> Result<String, VimError> {
    let copy_len = text.len() + usize::from(new_line);
    check_repeated_len(copy_len, times)?;
    if copy_len == 0 {
        return Ok(String::new());
    }
    let mut out = String::with_capacity(copy_len * times as usize);
    for _ in 0..times {
        if new_line {
            out.push('\n');
        }
        out.push_str(text);
    }
    Ok(out)
}

/// The position one grapheme before `pos`, stepping over the previous
/// line break at column 0.
pub(crate) fn step_back<T: TextOps + ?Sized>(text: &T, pos: Position) -> Option<Position> {
    if pos.col > 0 {
        Some(Position::new(pos.line, pos.col - 1))
    } else if pos.line > 0 {
        let line = pos.line - 1;
        Some(Position::new(line, text.line_len(line)))
    } else {
        None
    }
}

/// The position one grapheme after `pos`, stepping over the line break at
/// the end of a line.
pub(crate) fn step_forward<T: TextOps + ?Sized>(text: &T, pos: Position) -> Option<Position> {
    if pos.col < text.line_len(pos.line) {
        Some(Position::new(pos.line, pos.col + 1))
    } else if pos.line < text.last_line() {
        Some(Position::new(pos.line + 1, 0))
    } else {
        None
    }
}

/// Clamp `pos` to a valid normal-mode caret position: never on the line
/// break.
pub(crate) fn normal_caret<T: TextOps + ?Sized>(text: &T, pos: Position) -> Position {
    let pos = text.clamp(pos);
    Position::new(pos.line, pos.col.min(text.line_len(pos.line).saturating_sub(1)))
}

pub(crate) fn set_normal_caret<H: Host + ?Sized>(host: &mut H, pos: Position) -> Position {
    let caret = normal_caret(&*host, pos);
    host.apply(Operation::SetCursor(caret));
    caret
}

/// Overwrite text at the cursor the way replace mode types it: each
/// character replaces the one under the cursor, or is appended at the end
/// of the line. Returns the position after the last character.
pub(crate) fn overwrite<H: Host + ?Sized>(host: &mut H, at: Position, text: &str) -> Position {
    let mut pos = at;
    for g in text.graphemes(true) {
        if g == "\n" || g == "\r\n" {
            host.apply(Operation::InsertText {
                at: pos,
                text: "\n".into(),
            });
            pos = Position::new(pos.line + 1, 0);
            continue;
        }
        let next = Position::new(pos.line, pos.col + 1);
        if pos.col < host.line_len(pos.line) {
            host.apply(Operation::Replace {
                range: crate::types::Range { start: pos, end: next },
                text: g.to_string(),
            });
        } else {
            host.apply(Operation::InsertText {
                at: pos,
                text: g.to_string(),
            });
        }
        pos = next;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_over_single_and_multi_line_text() {
        assert_eq!(advance(Position::new(2, 3), "ab"), Position::new(2, 5));
        assert_eq!(advance(Position::new(2, 3), "ab\ncde"), Position::new(3, 3));
        assert_eq!(advance(Position::new(0, 0), "x\n"), Position::new(1, 0));
    }

    #[test]
    fn repeated_text() {
        assert_eq!(repeated("ab", 3, false).unwrap(), "ababab");
        assert_eq!(repeated("ab", 2, true).unwrap(), "\nab\nab");
        assert_eq!(repeated("ab", 0, true).unwrap(), "");
    }

    #[test]
    fn repeated_text_has_a_length_limit() {
        assert!(matches!(repeated("ab", u32::MAX, false), Err(VimError::TextTooLong)));
        assert!(matches!(repeated("", u32::MAX, true), Err(VimError::TextTooLong)));
        assert_eq!(repeated("", u32::MAX, false).unwrap(), "");
        assert!(check_repeated_len(MAX_REPEATED_LEN, 1).is_ok());
        assert!(check_repeated_len(MAX_REPEATED_LEN / 2 + 1, 2).is_err());
    }
}
