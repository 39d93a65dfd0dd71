//! Command definitions and the per-mode command table.

use thiserror::Error;

use crate::key::{KeyInput, KeyInputSet};

bitflags::bitflags! {
    /// How a command interacts with the rest of the engine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CommandFlags: u8 {
        /// Recorded for `.`.
        const REPEATABLE    = 0b0001;
        /// Enters insert or replace mode; the text typed there is linked to
        /// the command for `.`.
        const LINKED_TEXT   = 0b0010;
        /// Leaves the change tracker untouched (undo, `.` itself).
        const SPECIAL       = 0b0100;
    }
}

/// A recognized key sequence bound to a mode-specific action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<A> {
    /// Runs as soon as its name is typed.
    Simple {
        name: KeyInputSet,
        flags: CommandFlags,
        action: A,
    },
    /// An operator: runs on the span of the motion typed after its name.
    Motion {
        name: KeyInputSet,
        flags: CommandFlags,
        action: A,
    },
    /// Consumes one more key as its argument (`r{char}`, `m{mark}`).
    Long {
        name: KeyInputSet,
        flags: CommandFlags,
        action: A,
    },
}

impl<A: Copy> Command<A> {
    pub fn simple(name: impl Into<KeyInputSet>, flags: CommandFlags, action: A) -> Self {
        Command::Simple {
            name: name.into(),
            flags,
            action,
        }
    }

    pub fn motion(name: impl Into<KeyInputSet>, flags: CommandFlags, action: A) -> Self {
        Command::Motion {
            name: name.into(),
            flags,
            action,
        }
    }

    pub fn long(name: impl Into<KeyInputSet>, flags: CommandFlags, action: A) -> Self {
        Command::Long {
            name: name.into(),
            flags,
            action,
        }
    }

    pub fn name(&self) -> &KeyInputSet {
        match self {
            Command::Simple { name, .. } | Command::Motion { name, .. } | Command::Long { name, .. } => {
                name
            }
        }
    }

    pub fn flags(&self) -> CommandFlags {
        match self {
            Command::Simple { flags, .. }
            | Command::Motion { flags, .. }
            | Command::Long { flags, .. } => *flags,
        }
    }

    pub fn action(&self) -> A {
        match self {
            Command::Simple { action, .. }
            | Command::Motion { action, .. }
            | Command::Long { action, .. } => *action,
        }
    }
}

/// A malformed command table. These are programming errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandTableError {
    #[error("command name is empty")]
    EmptyName,
    #[error("duplicate command name: {0}")]
    Duplicate(String),
    #[error("command name {0} is a prefix of {1}")]
    Ambiguous(String, String),
}

/// Result of matching typed keys against a [`CommandTable`].
#[derive(Debug, PartialEq, Eq)]
pub enum CommandLookup<'a, A> {
    Found(&'a Command<A>),
    /// The keys are a strict prefix of at least one command name.
    Prefix,
    NoMatch,
}

/// The commands one mode recognizes.
///
/// No name may be a prefix of another, so a fully typed name is never also
/// waiting for more input.
#[derive(Debug, Clone)]
pub struct CommandTable<A> {
    commands: Vec<Command<A>>,
}

impl<A: Copy> Default for CommandTable<A> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<A: Copy> CommandTable<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_add(&mut self, command: Command<A>) -> Result<(), CommandTableError> {
        check_name(command.name(), self.commands.iter().map(Command::name))?;
        self.commands.push(command);
        Ok(())
    }

    /// Add a command.
    ///
    /// # Panics
    ///
    /// Panics if the name is empty, already bound, or a prefix of (or
    /// prefixed by) another name.
    pub fn add(&mut self, command: Command<A>) {
        if let Err(err) = self.try_add(command) {
            panic!("invalid command table: {err}");
        }
    }

    pub fn lookup(&self, keys: &[KeyInput]) -> CommandLookup<'_, A> {
        let mut prefix = false;
        for command in &self.commands {
            let name = command.name();
            if name.keys() == keys {
                return CommandLookup::Found(command);
            }
            if name.len() > keys.len() && name.starts_with(keys) {
                prefix = true;
            }
        }
        if prefix {
            CommandLookup::Prefix
        } else {
            CommandLookup::NoMatch
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command<A>> {
        self.commands.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &KeyInputSet> {
        self.commands.iter().map(Command::name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Check `name` against already registered names.
pub(crate) fn check_name<'a>(
    name: &KeyInputSet,
    existing: impl Iterator<Item = &'a KeyInputSet>,
) -> Result<(), CommandTableError> {
    if name.is_empty() {
        return Err(CommandTableError::EmptyName);
    }
    for other in existing {
        if other == name {
            return Err(CommandTableError::Duplicate(name.to_string()));
        }
        if other.starts_with(name.keys()) {
            return Err(CommandTableError::Ambiguous(name.to_string(), other.to_string()));
        }
        if name.starts_with(other.keys()) {
            return Err(CommandTableError::Ambiguous(other.to_string(), name.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Act {
        A,
        B,
    }

    #[test]
    fn lookup_found_prefix_and_miss() {
        let mut table = CommandTable::new();
        table.add(Command::simple("gJ", CommandFlags::REPEATABLE, Act::A));
        table.add(Command::simple("x", CommandFlags::empty(), Act::B));

        let g = KeyInput::from_char('g');
        assert_eq!(table.lookup(&[g]), CommandLookup::Prefix);
        match table.lookup(&[g, KeyInput::from_char('J')]) {
            CommandLookup::Found(cmd) => assert_eq!(cmd.action(), Act::A),
            other => panic!("expected Found, got {other:?}"),
        }
        assert_eq!(table.lookup(&[KeyInput::from_char('q')]), CommandLookup::NoMatch);
    }

    #[test]
    fn duplicate_and_ambiguous_names_are_rejected() {
        let mut table = CommandTable::new();
        table.add(Command::simple("gt", CommandFlags::empty(), Act::A));
        assert_eq!(
            table.try_add(Command::simple("gt", CommandFlags::empty(), Act::B)),
            Err(CommandTableError::Duplicate("gt".into()))
        );
        assert!(matches!(
            table.try_add(Command::simple("g", CommandFlags::empty(), Act::B)),
            Err(CommandTableError::Ambiguous(..))
        ));
        assert_eq!(
            table.try_add(Command::simple("", CommandFlags::empty(), Act::B)),
            Err(CommandTableError::EmptyName)
        );
    }

    #[test]
    #[should_panic(expected = "invalid command table")]
    fn add_panics_on_conflict() {
        let mut table = CommandTable::new();
        table.add(Command::motion("d", CommandFlags::REPEATABLE, Act::A));
        table.add(Command::simple("dd", CommandFlags::REPEATABLE, Act::B));
    }
}
