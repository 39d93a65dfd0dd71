//! Registers: storage for yanked and deleted text.
//!
//! Every yank and delete copies text into a register, and paste reads it
//! back. Each value remembers whether it was captured character-wise,
//! line-wise or block-wise, because paste behaves differently for each.
//!
//! ## Register names
//!
//! - `"` unnamed: receives every yank and delete.
//! - `a`–`z` named; `A`–`Z` append to the lowercase register.
//! - `0` last yank, `1`–`9` delete history (line-wise or multi-line deletes).
//! - `-` small delete (less than a line).
//! - `_` black hole: writes are discarded, reads are empty.
//! - `+`, `*` clipboard, backed by a [`Clipboard`] when one is installed.
//! - `.`, `/`, `:` read-only: last inserted text, last search, last command line.

use std::collections::HashMap;

use crate::traits::Clipboard;
use crate::types::{OperationKind, VisualKind};

pub const UNNAMED: char = '"';
pub const BLACK_HOLE: char = '_';
pub const SMALL_DELETE: char = '-';
pub const LAST_INSERTED: char = '.';
pub const LAST_SEARCH: char = '/';
pub const LAST_COMMAND_LINE: char = ':';

/// How the register content was captured; decides how a put lays it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
    /// Paste inserts inline at the cursor position.
    CharacterWise,
    /// Paste inserts whole lines above or below the cursor line.
    LineWise,
    /// A rectangular block, one line of text per selected row.
    BlockWise,
}

impl From<OperationKind> for RegisterKind {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::CharacterWise => RegisterKind::CharacterWise,
            OperationKind::LineWise => RegisterKind::LineWise,
        }
    }
}

impl From<VisualKind> for RegisterKind {
    fn from(kind: VisualKind) -> Self {
        match kind {
            VisualKind::Character => RegisterKind::CharacterWise,
            VisualKind::Line => RegisterKind::LineWise,
            VisualKind::Block => RegisterKind::BlockWise,
        }
    }
}

/// A register's content and capture kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterValue {
    pub text: String,
    pub kind: RegisterKind,
}

impl RegisterValue {
    pub fn new(text: impl Into<String>, kind: RegisterKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn append(&mut self, other: RegisterValue) {
        if other.kind == RegisterKind::LineWise || self.kind == RegisterKind::LineWise {
            if !self.text.is_empty() && !self.text.ends_with('\n') {
                self.text.push('\n');
            }
            self.text.push_str(&other.text);
            if !self.text.ends_with('\n') {
                self.text.push('\n');
            }
            self.kind = RegisterKind::LineWise;
        } else {
            self.text.push_str(&other.text);
        }
    }
}

/// Why text is being stored; yanks and deletes feed different numbered registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOperation {
    Yank,
    Delete,
}

/// All registers of one editing session.
#[derive(Default)]
pub struct RegisterMap {
    values: HashMap<char, RegisterValue>,
    clipboard: Option<Box<dyn Clipboard>>,
    clipboard_unnamed: bool,
}

impl std::fmt::Debug for RegisterMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterMap")
            .field("values", &self.values)
            .field("clipboard", &self.clipboard.is_some())
            .finish()
    }
}

impl RegisterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back the `+` and `*` registers with a clipboard.
    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = Some(clipboard);
    }

    /// Mirror unnamed-register writes to the clipboard (`clipboard=unnamed`).
    pub fn set_clipboard_unnamed(&mut self, enabled: bool) {
        self.clipboard_unnamed = enabled;
    }

    pub fn is_valid_name(name: char) -> bool {
        name.is_ascii_alphanumeric()
            || matches!(
                name,
                UNNAMED
                    | BLACK_HOLE
                    | SMALL_DELETE
                    | LAST_INSERTED
                    | LAST_SEARCH
                    | LAST_COMMAND_LINE
                    | '+'
                    | '*'
            )
    }

    pub fn is_read_only(name: char) -> bool {
        matches!(name, LAST_INSERTED | LAST_SEARCH | LAST_COMMAND_LINE)
    }

    /// Read a register. Uppercase names read their lowercase register.
    pub fn get(&mut self, name: char) -> Option<RegisterValue> {
        let name = name.to_ascii_lowercase();
        match name {
            BLACK_HOLE => None,
            '+' | '*' => match self.clipboard.as_mut() {
                Some(clipboard) => clipboard.get().map(|text| {
                    let kind = if text.ends_with('\n') {
                        RegisterKind::LineWise
                    } else {
                        RegisterKind::CharacterWise
                    };
                    RegisterValue { text, kind }
                }),
                None => self.values.get(&name).cloned(),
            },
            _ => self.values.get(&name).cloned(),
        }
    }

    /// Read the unnamed register.
    pub fn unnamed(&mut self) -> Option<RegisterValue> {
        if self.clipboard_unnamed && self.clipboard.is_some() {
            return self.get('+');
        }
        self.get(UNNAMED)
    }

    /// Overwrite one register, bypassing yank/delete bookkeeping.
    pub fn set(&mut self, name: char, value: RegisterValue) {
        match name {
            BLACK_HOLE => {}
            '+' | '*' if self.clipboard.is_some() => {
                if let Some(clipboard) = self.clipboard.as_mut() {
                    clipboard.set(value.text);
                }
            }
            _ => {
                self.values.insert(name, value);
            }
        }
    }

    /// Store text produced by a yank or delete, following Vim's rules for
    /// the unnamed, numbered and small-delete registers.
    pub fn store(&mut self, name: Option<char>, value: RegisterValue, op: RegisterOperation) {
        tracing::trace!(target: "vim.register", ?name, ?op, kind = ?value.kind, len = value.text.len(), "register_store");
        match name {
            Some(BLACK_HOLE) => {}
            Some(c) if c.is_ascii_uppercase() => {
                let lower = c.to_ascii_lowercase();
                let entry = self
                    .values
                    .entry(lower)
                    .or_insert_with(|| RegisterValue::new("", value.kind));
                entry.append(value);
                let full = entry.clone();
                self.values.insert(UNNAMED, full);
            }
            Some(c) if c != UNNAMED => {
                self.set(c, value.clone());
                self.values.insert(UNNAMED, value);
            }
            _ => {
                match op {
                    RegisterOperation::Yank => {
                        self.values.insert('0', value.clone());
                    }
                    RegisterOperation::Delete => {
                        if value.kind == RegisterKind::LineWise || value.text.contains('\n') {
                            self.shift_delete_history();
                            self.values.insert('1', value.clone());
                        } else {
                            self.values.insert(SMALL_DELETE, value.clone());
                        }
                    }
                }
                if self.clipboard_unnamed
                    && let Some(clipboard) = self.clipboard.as_mut()
                {
                    clipboard.set(value.text.clone());
                }
                self.values.insert(UNNAMED, value);
            }
        }
    }

    /// Record a read-only register (`.`, `/`, `:`).
    pub(crate) fn set_read_only(&mut self, name: char, text: String) {
        self.values
            .insert(name, RegisterValue::new(text, RegisterKind::CharacterWise));
    }

    fn shift_delete_history(&mut self) {
        for n in (1..9u8).rev() {
            let from = char::from(b'0' + n);
            let to = char::from(b'0' + n + 1);
            if let Some(value) = self.values.remove(&from) {
                self.values.insert(to, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> RegisterValue {
        RegisterValue::new(text, RegisterKind::LineWise)
    }

    fn chars(text: &str) -> RegisterValue {
        RegisterValue::new(text, RegisterKind::CharacterWise)
    }

    #[test]
    fn yank_fills_unnamed_and_zero() {
        let mut regs = RegisterMap::new();
        regs.store(None, chars("foo"), RegisterOperation::Yank);
        assert_eq!(regs.get(UNNAMED), Some(chars("foo")));
        assert_eq!(regs.get('0'), Some(chars("foo")));
    }

    #[test]
    fn line_deletes_shift_numbered_registers() {
        let mut regs = RegisterMap::new();
        regs.store(None, line("one\n"), RegisterOperation::Delete);
        regs.store(None, line("two\n"), RegisterOperation::Delete);
        assert_eq!(regs.get('1'), Some(line("two\n")));
        assert_eq!(regs.get('2'), Some(line("one\n")));
    }

    #[test]
    fn small_delete_goes_to_minus() {
        let mut regs = RegisterMap::new();
        regs.store(None, chars("x"), RegisterOperation::Delete);
        assert_eq!(regs.get(SMALL_DELETE), Some(chars("x")));
        assert_eq!(regs.get('1'), None);
    }

    #[test]
    fn uppercase_appends() {
        let mut regs = RegisterMap::new();
        regs.store(Some('a'), chars("foo"), RegisterOperation::Yank);
        regs.store(Some('A'), chars("bar"), RegisterOperation::Yank);
        assert_eq!(regs.get('a'), Some(chars("foobar")));
        assert_eq!(regs.get(UNNAMED), Some(chars("foobar")));
    }

    #[test]
    fn black_hole_discards() {
        let mut regs = RegisterMap::new();
        regs.store(None, chars("keep"), RegisterOperation::Yank);
        regs.store(Some(BLACK_HOLE), chars("gone"), RegisterOperation::Delete);
        assert_eq!(regs.get(UNNAMED), Some(chars("keep")));
        assert_eq!(regs.get(BLACK_HOLE), None);
    }

    #[test]
    fn valid_names() {
        assert!(RegisterMap::is_valid_name('a'));
        assert!(RegisterMap::is_valid_name('Z'));
        assert!(RegisterMap::is_valid_name('7'));
        assert!(RegisterMap::is_valid_name('+'));
        assert!(!RegisterMap::is_valid_name('!'));
    }
}
