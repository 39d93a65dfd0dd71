use unicode_segmentation::UnicodeSegmentation;

use crate::change::TextEdit;
use crate::context::{Context, TextRepeat};
use crate::key::{KeyCode, KeyInput, Modifiers};
use crate::marks::LAST_CHANGE;
use crate::register::LAST_INSERTED;
use crate::traits::Host;
use crate::types::{ModeKind, Operation, Position, Range, ShiftDirection};

use super::{ProcessResult, advance, repeated, report, step_back, step_forward};

/// Insert mode: typed characters go into the buffer.
///
/// Everything typed in one session is collected so `.` can replay it and
/// the `.` register can show it. Moving the caret with the arrow keys
/// starts a new session.
#[derive(Debug, Default, Clone)]
pub struct InsertMode {
    typed: String,
    /// Graphemes erased before and after the session's own text.
    erased_before: u32,
    erased_after: u32,
    repeat: TextRepeat,
}

impl InsertMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> ModeKind {
        ModeKind::Insert
    }

    /// Text typed so far in this session.
    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn commands(&self) -> Vec<KeyInput> {
        let plain = |code| KeyInput::from_key(code, Modifiers::empty());
        vec![
            KeyInput::escape(),
            KeyInput::enter(),
            KeyInput::backspace(),
            plain(KeyCode::Delete),
            plain(KeyCode::Tab),
            plain(KeyCode::Left),
            plain(KeyCode::Right),
            plain(KeyCode::Up),
            plain(KeyCode::Down),
            plain(KeyCode::Home),
            plain(KeyCode::End),
            KeyInput::ctrl('d'),
            KeyInput::ctrl('t'),
        ]
    }

    pub fn can_process(&self, key: KeyInput) -> bool {
        key.plain_char().is_some() || self.commands().contains(&key)
    }

    pub fn on_enter<H: Host>(&mut self, ctx: &mut Context, _host: &mut H) {
        self.clear_session();
        self.repeat = std::mem::take(&mut ctx.text_repeat);
    }

    /// Close the session: record its text and step the caret back onto the
    /// last inserted character.
    pub fn on_leave<H: Host>(&mut self, ctx: &mut Context, host: &mut H) {
        let typed = std::mem::take(&mut self.typed);
        tracing::trace!(target: "vim.insert", len = typed.len(), "session end");
        ctx.registers.set_read_only(LAST_INSERTED, typed.clone());
        ctx.changes.on_text_session_end(TextEdit {
            text: typed,
            erased_before: std::mem::take(&mut self.erased_before),
            erased_after: std::mem::take(&mut self.erased_after),
        });
        let cursor = host.cursor();
        ctx.marks.set_internal(LAST_CHANGE, cursor);
        if cursor.col > 0 {
            host.apply(Operation::SetCursor(Position::new(cursor.line, cursor.col - 1)));
        }
    }

    pub fn process<H: Host>(&mut self, ctx: &mut Context, host: &mut H, key: KeyInput) -> ProcessResult {
        let cursor = host.cursor();
        match key.code() {
            KeyCode::Esc => return self.escape(ctx, host),
            KeyCode::Enter => self.insert(host, cursor, "\n"),
            KeyCode::Tab => self.insert(host, cursor, "\t"),
            KeyCode::Backspace => self.backspace(host, cursor),
            KeyCode::Delete => self.delete_forward(host, cursor),
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down | KeyCode::Home | KeyCode::End => {
                self.move_caret(host, cursor, key.code())
            }
            KeyCode::Char(c) if key.mods().contains(Modifiers::CTRL) => match c {
                'd' | 't' => {
                    let direction = if c == 'd' {
                        ShiftDirection::Left
                    } else {
                        ShiftDirection::Right
                    };
                    let before = host.line_len(cursor.line);
                    host.apply(Operation::ShiftLines {
                        first_line: cursor.line,
                        count: 1,
                        direction,
                    });
                    let after = host.line_len(cursor.line);
                    let col = (cursor.col + after).saturating_sub(before).min(after);
                    host.apply(Operation::SetCursor(Position::new(cursor.line, col)));
                }
                _ => return ProcessResult::NotHandled,
            },
            KeyCode::Char(c) if key.plain_char().is_some() => {
                let mut buf = [0u8; 4];
                self.insert(host, cursor, c.encode_utf8(&mut buf));
            }
            _ => return ProcessResult::NotHandled,
        }
        ProcessResult::Processed
    }

    fn escape<H: Host>(&mut self, ctx: &mut Context, host: &mut H) -> ProcessResult {
        if let Some(broker) = host.display_windows()
            && broker.is_completion_active()
        {
            broker.dismiss_completion();
            if ctx.settings.double_escape {
                return ProcessResult::Processed;
            }
        }
        if self.repeat.count > 1 && !self.typed.is_empty() {
            match repeated(&self.typed, self.repeat.count - 1, self.repeat.new_line) {
                Ok(extra) => {
                    let cursor = host.cursor();
                    host.apply(Operation::InsertText {
                        at: cursor,
                        text: extra.clone(),
                    });
                    host.apply(Operation::SetCursor(advance(cursor, &extra)));
                }
                // The typed text stays; only the extra copies are dropped.
                Err(err) => report(host, &err),
            }
        }
        ProcessResult::SwitchMode(ModeKind::Normal)
    }

    fn insert<H: Host>(&mut self, host: &mut H, at: Position, text: &str) {
        host.apply(Operation::InsertText {
            at,
            text: text.to_string(),
        });
        host.apply(Operation::SetCursor(advance(at, text)));
        self.typed.push_str(text);
    }

    fn backspace<H: Host>(&mut self, host: &mut H, cursor: Position) {
        let Some(start) = step_back(&*host, cursor) else {
            return;
        };
        host.apply(Operation::Delete {
            range: Range { start, end: cursor },
        });
        host.apply(Operation::SetCursor(start));
        match self.typed.grapheme_indices(true).next_back() {
            Some((idx, _)) => self.typed.truncate(idx),
            None => self.erased_before += 1,
        }
    }

    fn delete_forward<H: Host>(&mut self, host: &mut H, cursor: Position) {
        let Some(end) = step_forward(&*host, cursor) else {
            return;
        };
        host.apply(Operation::Delete {
            range: Range { start: cursor, end },
        });
        self.erased_after += 1;
    }

    fn clear_session(&mut self) {
        self.typed.clear();
        self.erased_before = 0;
        self.erased_after = 0;
    }

    fn move_caret<H: Host>(&mut self, host: &mut H, cursor: Position, code: KeyCode) {
        let last_line = host.last_line();
        let target = match code {
            KeyCode::Left => Position::new(cursor.line, cursor.col.saturating_sub(1)),
            KeyCode::Right => Position::new(cursor.line, cursor.col + 1),
            KeyCode::Up => Position::new(cursor.line.saturating_sub(1), cursor.col),
            KeyCode::Down => Position::new((cursor.line + 1).min(last_line), cursor.col),
            KeyCode::Home => Position::new(cursor.line, 0),
            _ => Position::new(cursor.line, host.line_len(cursor.line)),
        };
        host.apply(Operation::SetCursor(host.clamp(target)));
        self.clear_session();
        self.repeat = TextRepeat::default();
    }
}
