use crate::change::TextEdit;
use crate::context::Context;
use crate::key::{KeyCode, KeyInput};
use crate::marks::LAST_CHANGE;
use crate::register::LAST_INSERTED;
use crate::traits::Host;
use crate::types::{ModeKind, Operation, Position, Range};

use super::{ProcessResult, overwrite, repeated, report};

/// Replace mode (`R`): typed characters overwrite the text under the caret.
///
/// Backspace restores what was overwritten during this session and only
/// moves the caret over text that was there before.
#[derive(Debug, Clone)]
pub struct ReplaceMode {
    typed: String,
    /// What each typed character replaced; `None` where it was appended.
    replaced: Vec<Option<String>>,
    count: u32,
}

impl Default for ReplaceMode {
    fn default() -> Self {
        Self {
            typed: String::new(),
            replaced: Vec::new(),
            count: 1,
        }
    }
}

impl ReplaceMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> ModeKind {
        ModeKind::Replace
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn can_process(&self, key: KeyInput) -> bool {
        key.plain_char().is_some()
            || matches!(key.code(), KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace)
    }

    pub fn on_enter<H: Host>(&mut self, ctx: &mut Context, _host: &mut H) {
        self.typed.clear();
        self.replaced.clear();
        self.count = std::mem::take(&mut ctx.text_repeat).count.max(1);
    }

    pub fn on_leave<H: Host>(&mut self, ctx: &mut Context, host: &mut H) {
        let typed = std::mem::take(&mut self.typed);
        self.replaced.clear();
        ctx.registers.set_read_only(LAST_INSERTED, typed.clone());
        ctx.changes.on_text_session_end(TextEdit::from(typed));
        let cursor = host.cursor();
        ctx.marks.set_internal(LAST_CHANGE, cursor);
        if cursor.col > 0 {
            host.apply(Operation::SetCursor(Position::new(cursor.line, cursor.col - 1)));
        }
    }

    pub fn process<H: Host>(&mut self, _ctx: &mut Context, host: &mut H, key: KeyInput) -> ProcessResult {
        let cursor = host.cursor();
        match key.code() {
            KeyCode::Esc => {
                if self.count > 1 && !self.typed.is_empty() {
                    match repeated(&self.typed, self.count - 1, false) {
                        Ok(extra) => {
                            let end = overwrite(host, cursor, &extra);
                            host.apply(Operation::SetCursor(end));
                        }
                        Err(err) => report(host, &err),
                    }
                }
                return ProcessResult::SwitchMode(ModeKind::Normal);
            }
            KeyCode::Enter => {
                host.apply(Operation::InsertText {
                    at: cursor,
                    text: "\n".into(),
                });
                host.apply(Operation::SetCursor(Position::new(cursor.line + 1, 0)));
                self.typed.push('\n');
                // Backspace never crosses a line typed in this session.
                self.replaced.clear();
            }
            KeyCode::Backspace => self.backspace(host, cursor),
            KeyCode::Char(c) if key.plain_char().is_some() => {
                let original = host.grapheme_at(cursor);
                let mut buf = [0u8; 4];
                let end = overwrite(host, cursor, c.encode_utf8(&mut buf));
                host.apply(Operation::SetCursor(end));
                self.typed.push(c);
                self.replaced.push(original);
            }
            _ => return ProcessResult::NotHandled,
        }
        ProcessResult::Processed
    }

    fn backspace<H: Host>(&mut self, host: &mut H, cursor: Position) {
        if cursor.col == 0 {
            return;
        }
        let prev = Position::new(cursor.line, cursor.col - 1);
        if let Some(original) = self.replaced.pop() {
            let range = Range { start: prev, end: cursor };
            match original {
                Some(text) => host.apply(Operation::Replace { range, text }),
                None => host.apply(Operation::Delete { range }),
            }
            self.typed.pop();
        }
        host.apply(Operation::SetCursor(prev));
    }
}
