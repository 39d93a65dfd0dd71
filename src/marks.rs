use std::collections::HashMap;

use crate::error::VimError;
use crate::types::Position;

/// The previous-context mark, set before every jump. `'` and `` ` `` both
/// name it.
pub const PREVIOUS_CONTEXT: char = '\'';
pub const VISUAL_START: char = '<';
pub const VISUAL_END: char = '>';
pub const LAST_CHANGE: char = '.';

/// Marks of one buffer.
///
/// Positions are not adjusted when text above them changes; a mark past the
/// end of the buffer is clamped when it is jumped to.
#[derive(Debug, Default, Clone)]
pub struct MarkMap {
    marks: HashMap<char, Position>,
}

impl MarkMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(name: char) -> char {
        if name == '`' { PREVIOUS_CONTEXT } else { name }
    }

    /// Set a mark from an `m{name}` command; only letters and the context
    /// marks may be set by the user.
    pub fn set(&mut self, name: char, pos: Position) -> Result<(), VimError> {
        let name = Self::normalize(name);
        if !(name.is_ascii_alphabetic()
            || matches!(name, PREVIOUS_CONTEXT | VISUAL_START | VISUAL_END))
        {
            return Err(VimError::InvalidMarkName(name));
        }
        self.marks.insert(name, pos);
        Ok(())
    }

    pub(crate) fn set_internal(&mut self, name: char, pos: Position) {
        self.marks.insert(Self::normalize(name), pos);
    }

    pub fn get(&self, name: char) -> Result<Position, VimError> {
        let name = Self::normalize(name);
        if !(name.is_ascii_alphabetic()
            || matches!(name, PREVIOUS_CONTEXT | VISUAL_START | VISUAL_END | LAST_CHANGE))
        {
            return Err(VimError::InvalidMarkName(name));
        }
        self.marks
            .get(&name)
            .copied()
            .ok_or(VimError::MarkNotSet(name))
    }

    /// Remember where a jump started so `''` can return to it.
    pub fn record_jump(&mut self, from: Position) {
        self.marks.insert(PREVIOUS_CONTEXT, from);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_letter_mark() {
        let mut marks = MarkMap::new();
        marks.set('a', Position::new(3, 2)).unwrap();
        assert_eq!(marks.get('a').unwrap(), Position::new(3, 2));
    }

    #[test]
    fn unset_mark_errors() {
        let marks = MarkMap::new();
        assert!(matches!(marks.get('q'), Err(VimError::MarkNotSet('q'))));
    }

    #[test]
    fn invalid_mark_name() {
        let mut marks = MarkMap::new();
        assert!(matches!(
            marks.set('!', Position::ZERO),
            Err(VimError::InvalidMarkName('!'))
        ));
    }

    #[test]
    fn backtick_aliases_previous_context() {
        let mut marks = MarkMap::new();
        marks.record_jump(Position::new(5, 1));
        assert_eq!(marks.get('`').unwrap(), Position::new(5, 1));
        assert_eq!(marks.get('\'').unwrap(), Position::new(5, 1));
    }
}
