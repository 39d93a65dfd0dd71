//! Repeat-last-change (`.`) bookkeeping.

use crate::error::VimError;
use crate::key::{KeyInput, KeyInputSet};

/// What one insert or replace session did to the buffer.
///
/// Backspace and `<Del>` only ever remove text on either side of what the
/// session typed, so the whole session replays as: erase `erased_before`
/// graphemes before the caret and `erased_after` after it, then insert
/// `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEdit {
    pub text: String,
    pub erased_before: u32,
    pub erased_after: u32,
}

impl TextEdit {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.erased_before == 0 && self.erased_after == 0
    }
}

impl From<String> for TextEdit {
    fn from(text: String) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }
}

impl From<&str> for TextEdit {
    fn from(text: &str) -> Self {
        Self::from(text.to_string())
    }
}

impl std::fmt::Display for TextEdit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.erased_before > 0 {
            write!(f, "{}<BS> ", self.erased_before)?;
        }
        if self.erased_after > 0 {
            write!(f, "{}<Del> ", self.erased_after)?;
        }
        write!(f, "{:?}", self.text)
    }
}

/// The last repeatable change of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepeatableChange {
    /// What was typed and erased in one insert or replace session.
    Text(TextEdit),
    /// A normal-mode command, replayed by feeding its keys back.
    Normal {
        keys: Vec<KeyInput>,
        count: Option<u32>,
        register: Option<char>,
    },
    /// A command that entered insert or replace mode followed by the text
    /// typed there (`cwfoo<Esc>`).
    Linked(Box<RepeatableChange>, Box<RepeatableChange>),
}

impl RepeatableChange {
    /// The keys `.` replays for a normal command, including register and
    /// count prefixes.
    pub fn replay_keys(keys: &[KeyInput], count: Option<u32>, register: Option<char>) -> Vec<KeyInput> {
        let mut out = Vec::with_capacity(keys.len() + 4);
        if let Some(r) = register {
            out.push(KeyInput::from_char('"'));
            out.push(KeyInput::from_char(r));
        }
        if let Some(n) = count {
            out.extend(n.to_string().chars().map(KeyInput::from_char));
        }
        out.extend_from_slice(keys);
        out
    }
}

impl std::fmt::Display for RepeatableChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepeatableChange::Text(edit) => write!(f, "{edit}"),
            RepeatableChange::Normal {
                keys,
                count,
                register,
            } => {
                let keys = RepeatableChange::replay_keys(keys, *count, *register);
                write!(f, "{}", KeyInputSet::new(keys))
            }
            RepeatableChange::Linked(a, b) => write!(f, "{a} {b}"),
        }
    }
}

/// Records repeatable commands and guards `.` against recursion.
#[derive(Debug, Default, Clone)]
pub struct ChangeTracker {
    last: Option<RepeatableChange>,
    /// A command that entered insert mode, waiting for the session's text.
    pending_link: Option<RepeatableChange>,
    repeat_depth: u32,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_change(&self) -> Option<&RepeatableChange> {
        self.last.as_ref()
    }

    pub fn set_last_change(&mut self, change: RepeatableChange) {
        self.last = Some(change);
        self.pending_link = None;
    }

    pub fn clear(&mut self) {
        self.last = None;
        self.pending_link = None;
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat_depth > 0
    }

    /// Note an executed command. Commands replayed by `.` are not recorded,
    /// so a count given to `.` never replaces the recorded one.
    pub fn on_command_executed(
        &mut self,
        keys: &[KeyInput],
        count: Option<u32>,
        register: Option<char>,
        enters_text_session: bool,
    ) {
        if self.is_repeating() {
            return;
        }
        let change = RepeatableChange::Normal {
            keys: keys.to_vec(),
            count,
            register,
        };
        tracing::trace!(target: "vim.change", %change, enters_text_session, "record");
        if enters_text_session {
            self.pending_link = Some(change);
        } else {
            self.set_last_change(change);
        }
    }

    /// Close an insert or replace session.
    pub fn on_text_session_end(&mut self, edit: TextEdit) {
        if self.is_repeating() {
            return;
        }
        match self.pending_link.take() {
            Some(command) => {
                self.last = Some(RepeatableChange::Linked(
                    Box::new(command),
                    Box::new(RepeatableChange::Text(edit)),
                ));
            }
            None if !edit.is_empty() => self.last = Some(RepeatableChange::Text(edit)),
            None => {}
        }
    }

    pub(crate) fn begin_repeat(&mut self) -> Result<(), VimError> {
        if self.repeat_depth > 0 {
            return Err(VimError::RecursiveRepeat);
        }
        self.repeat_depth += 1;
        Ok(())
    }

    pub(crate) fn end_repeat(&mut self) {
        self.repeat_depth = self.repeat_depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(s: &str) -> Vec<KeyInput> {
        KeyInput::parse(s).unwrap()
    }

    #[test]
    fn normal_command_overwrites_last() {
        let mut tracker = ChangeTracker::new();
        tracker.on_command_executed(&keys("x"), None, None, false);
        tracker.on_command_executed(&keys("dw"), Some(2), Some('a'), false);
        assert_eq!(
            tracker.last_change(),
            Some(&RepeatableChange::Normal {
                keys: keys("dw"),
                count: Some(2),
                register: Some('a'),
            })
        );
    }

    #[test]
    fn insert_session_links_to_entering_command() {
        let mut tracker = ChangeTracker::new();
        tracker.on_command_executed(&keys("cw"), None, None, true);
        assert_eq!(tracker.last_change(), None);
        tracker.on_text_session_end(TextEdit::from("foo"));
        let expected = RepeatableChange::Linked(
            Box::new(RepeatableChange::Normal {
                keys: keys("cw"),
                count: None,
                register: None,
            }),
            Box::new(RepeatableChange::Text(TextEdit::from("foo"))),
        );
        assert_eq!(tracker.last_change(), Some(&expected));
    }

    #[test]
    fn erase_only_session_is_recorded() {
        let mut tracker = ChangeTracker::new();
        tracker.on_text_session_end(TextEdit::default());
        assert_eq!(tracker.last_change(), None);

        let edit = TextEdit {
            text: String::new(),
            erased_before: 2,
            erased_after: 0,
        };
        tracker.on_text_session_end(edit.clone());
        assert_eq!(tracker.last_change(), Some(&RepeatableChange::Text(edit)));
        assert_eq!(tracker.last_change().map(ToString::to_string).as_deref(), Some("2<BS> \"\""));
    }

    #[test]
    fn nothing_recorded_while_repeating() {
        let mut tracker = ChangeTracker::new();
        tracker.on_command_executed(&keys("x"), None, None, false);
        tracker.begin_repeat().unwrap();
        tracker.on_command_executed(&keys("x"), Some(5), None, false);
        assert!(matches!(tracker.begin_repeat(), Err(VimError::RecursiveRepeat)));
        tracker.end_repeat();
        assert!(!tracker.is_repeating());
        assert_eq!(
            tracker.last_change(),
            Some(&RepeatableChange::Normal {
                keys: keys("x"),
                count: None,
                register: None,
            })
        );
    }

    #[test]
    fn replay_keys_prefix_register_and_count() {
        let replay = RepeatableChange::replay_keys(&keys("dd"), Some(12), Some('q'));
        assert_eq!(KeyInputSet::new(replay).to_string(), "\"q12dd");
    }
}
