//! Incremental command recognition.
//!
//! A [`CommandRunner`] is fed one key at a time and accumulates a count, a
//! register name, a partially typed command name and, after an operator,
//! the motion that operator applies to. It reports [`RunResult::Complete`]
//! once a whole command has been recognized and is then back to idle.

use crate::command::{Command, CommandFlags, CommandLookup, CommandTable, check_name};
use crate::error::VimError;
use crate::key::{KeyInput, KeyInputSet};
use crate::motion::{Motion, MotionLookup, MotionTable};
use crate::register::{RegisterMap, UNNAMED};

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    current: Option<u32>,
}

impl Counts {
    fn push_digit(&mut self, d: u32) {
        let next = self
            .current
            .unwrap_or(0)
            .saturating_mul(10)
            .saturating_add(d);
        self.current = Some(next);
    }

    /// True if `key` extends this count: `1`-`9` always, `0` only after a
    /// digit.
    fn accepts(&self, key: &KeyInput) -> Option<u32> {
        key.digit().filter(|&d| d != 0 || self.current.is_some())
    }
}

/// A fully recognized command, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<A> {
    pub command: Recognized<A>,
    /// The count, with operator and motion counts multiplied; `None` if no
    /// count was typed.
    pub count: Option<u32>,
    pub register: Option<char>,
    /// The keys that named the command, without count or register, in a
    /// form that can be fed back to the runner.
    pub keys: Vec<KeyInput>,
}

impl<A: Copy> Invocation<A> {
    pub fn count_or_one(&self) -> u32 {
        self.count.unwrap_or(1).max(1)
    }

    pub fn flags(&self) -> CommandFlags {
        match &self.command {
            Recognized::Simple { flags, .. }
            | Recognized::Operator { flags, .. }
            | Recognized::Long { flags, .. } => *flags,
            Recognized::Movement(_) => CommandFlags::empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recognized<A> {
    Simple {
        action: A,
        flags: CommandFlags,
    },
    Operator {
        action: A,
        flags: CommandFlags,
        motion: Motion,
    },
    Long {
        action: A,
        flags: CommandFlags,
        arg: KeyInput,
    },
    /// A plain cursor movement from the motion table.
    Movement(Motion),
}

#[derive(Debug)]
pub enum RunResult<A> {
    NeedMoreInput,
    Complete(Invocation<A>),
    /// Escape discarded the pending state.
    Cancelled,
    /// An operator was followed by something that is not a motion; the
    /// operator is dropped.
    Beep,
    Error(VimError),
}

#[derive(Debug, Clone)]
enum State<A> {
    Idle,
    Register,
    Command,
    Operator {
        name: KeyInputSet,
        flags: CommandFlags,
        action: A,
        count: Counts,
        keys: Vec<KeyInput>,
    },
    Argument {
        name: KeyInputSet,
        flags: CommandFlags,
        action: A,
    },
}

/// Recognizes the commands of one mode.
#[derive(Debug, Clone)]
pub struct CommandRunner<A> {
    commands: CommandTable<A>,
    movements: MotionTable,
    operator_motions: MotionTable,
    state: State<A>,
    count: Counts,
    register: Option<char>,
    input: Vec<KeyInput>,
}

impl<A: Copy + std::fmt::Debug> CommandRunner<A> {
    /// Build a runner over `commands` plus the `movements` usable as plain
    /// commands. Operators take their motion from `operator_motions`.
    ///
    /// # Panics
    ///
    /// Panics if a command name collides with a movement name.
    pub fn new(commands: CommandTable<A>, movements: MotionTable, operator_motions: MotionTable) -> Self {
        for name in movements.names() {
            if let Err(err) = check_name(name, commands.names()) {
                panic!("command conflicts with movement: {err}");
            }
        }
        Self {
            commands,
            movements,
            operator_motions,
            state: State::Idle,
            count: Counts::default(),
            register: None,
            input: Vec::new(),
        }
    }

    pub fn commands(&self) -> &CommandTable<A> {
        &self.commands
    }

    /// True while any part of a command has been typed.
    pub fn is_waiting_for_input(&self) -> bool {
        !matches!(self.state, State::Idle)
            || self.count.current.is_some()
            || self.register.is_some()
            || !self.input.is_empty()
    }

    /// True after an operator, while its motion is being typed.
    pub fn in_operator_pending(&self) -> bool {
        matches!(self.state, State::Operator { .. })
    }

    /// The pending count, if any.
    pub fn pending_count(&self) -> Option<u32> {
        self.count.current
    }

    /// Everything typed for the current command, for a `showcmd` area.
    pub fn pending_keys(&self) -> String {
        let mut out = String::new();
        if let Some(r) = self.register {
            out.push(UNNAMED);
            out.push(r);
        }
        if let Some(c) = self.count.current {
            out.push_str(&c.to_string());
        }
        if matches!(self.state, State::Register) {
            out.push(UNNAMED);
        }
        match &self.state {
            State::Operator {
                name, count, keys, ..
            } => {
                out.push_str(&name.to_string());
                if let Some(c) = count.current {
                    out.push_str(&c.to_string());
                }
                out.push_str(&KeyInputSet::new(keys.clone()).to_string());
            }
            State::Argument { name, .. } => out.push_str(&name.to_string()),
            _ => out.push_str(&KeyInputSet::new(self.input.clone()).to_string()),
        }
        out
    }

    /// First keys of every command and movement.
    pub fn first_keys(&self) -> Vec<KeyInput> {
        let mut keys: Vec<KeyInput> = Vec::new();
        for key in self
            .commands
            .names()
            .chain(self.movements.names())
            .filter_map(KeyInputSet::first)
        {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// True if `key` could start a command from the idle state.
    pub fn can_start(&self, key: &KeyInput) -> bool {
        self.count.accepts(key).is_some()
            || key.plain_char() == Some(UNNAMED)
            || !matches!(self.commands.lookup(&[*key]), CommandLookup::NoMatch)
            || !matches!(self.movements.lookup(&[*key]), MotionLookup::NoMatch)
    }

    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.count = Counts::default();
        self.register = None;
        self.input.clear();
    }

    pub fn run(&mut self, key: KeyInput) -> RunResult<A> {
        if key.is_escape() {
            tracing::trace!(target: "vim.runner", pending = %self.pending_keys(), "cancelled");
            self.reset();
            return RunResult::Cancelled;
        }

        match std::mem::replace(&mut self.state, State::Idle) {
            State::Register => self.run_register(key),
            State::Argument {
                name,
                flags,
                action,
            } => {
                let mut keys = name.keys().to_vec();
                keys.push(key);
                self.complete(Recognized::Long { action, flags, arg: key }, None, keys)
            }
            State::Operator {
                name,
                flags,
                action,
                count,
                keys,
            } => self.run_motion(key, name, flags, action, count, keys),
            State::Idle | State::Command => self.run_command(key),
        }
    }

    fn run_register(&mut self, key: KeyInput) -> RunResult<A> {
        match key.plain_char() {
            Some(c) if RegisterMap::is_valid_name(c) => {
                self.register = Some(c);
                RunResult::NeedMoreInput
            }
            other => {
                self.reset();
                RunResult::Error(VimError::InvalidRegister(other.unwrap_or('?')))
            }
        }
    }

    fn run_command(&mut self, key: KeyInput) -> RunResult<A> {
        if self.input.is_empty() {
            if let Some(d) = self.count.accepts(&key) {
                self.count.push_digit(d);
                return RunResult::NeedMoreInput;
            }
            if key.plain_char() == Some(UNNAMED) {
                self.state = State::Register;
                return RunResult::NeedMoreInput;
            }
        }

        self.input.push(key);
        let command = match self.commands.lookup(&self.input) {
            CommandLookup::Found(command) => Some(command.clone()),
            CommandLookup::Prefix => {
                self.state = State::Command;
                return RunResult::NeedMoreInput;
            }
            CommandLookup::NoMatch => None,
        };

        if let Some(command) = command {
            return match command {
                Command::Simple { flags, action, .. } => {
                    let keys = std::mem::take(&mut self.input);
                    self.complete(Recognized::Simple { action, flags }, None, keys)
                }
                Command::Motion { name, flags, action } => {
                    self.input.clear();
                    self.state = State::Operator {
                        name,
                        flags,
                        action,
                        count: Counts::default(),
                        keys: Vec::new(),
                    };
                    RunResult::NeedMoreInput
                }
                Command::Long { name, flags, action } => {
                    self.input.clear();
                    self.state = State::Argument { name, flags, action };
                    RunResult::NeedMoreInput
                }
            };
        }

        match self.movements.lookup(&self.input) {
            MotionLookup::Found(motion) => {
                let keys = std::mem::take(&mut self.input);
                self.complete(Recognized::Movement(motion), None, keys)
            }
            MotionLookup::NeedMoreInput => {
                self.state = State::Command;
                RunResult::NeedMoreInput
            }
            MotionLookup::NoMatch => {
                let typed = KeyInputSet::new(std::mem::take(&mut self.input)).to_string();
                self.reset();
                RunResult::Error(VimError::UnknownCommand(typed))
            }
        }
    }

    fn run_motion(
        &mut self,
        key: KeyInput,
        name: KeyInputSet,
        flags: CommandFlags,
        action: A,
        mut count: Counts,
        mut keys: Vec<KeyInput>,
    ) -> RunResult<A> {
        if keys.is_empty()
            && let Some(d) = count.accepts(&key)
        {
            count.push_digit(d);
            self.state = State::Operator {
                name,
                flags,
                action,
                count,
                keys,
            };
            return RunResult::NeedMoreInput;
        }

        keys.push(key);
        let doubled = name.last().is_some_and(|last| keys == [last]) || name.keys() == keys;
        let motion = if doubled {
            Some(Motion::CurrentLines)
        } else {
            match self.operator_motions.lookup(&keys) {
                MotionLookup::Found(motion) => Some(motion),
                MotionLookup::NeedMoreInput => None,
                MotionLookup::NoMatch if name.len() > keys.len() && name.starts_with(&keys) => None,
                MotionLookup::NoMatch => {
                    tracing::debug!(target: "vim.runner", operator = %name, keys = %KeyInputSet::new(keys), "invalid motion");
                    self.reset();
                    return RunResult::Beep;
                }
            }
        };

        match motion {
            Some(motion) => {
                let mut all = name.keys().to_vec();
                all.extend(keys);
                self.complete(Recognized::Operator { action, flags, motion }, count.current, all)
            }
            None => {
                self.state = State::Operator {
                    name,
                    flags,
                    action,
                    count,
                    keys,
                };
                RunResult::NeedMoreInput
            }
        }
    }

    /// Every complete command this runner recognizes without a count or
    /// register: its commands and movements, long commands with an `x`
    /// argument, and operators with each of their motions.
    #[cfg(test)]
    pub(crate) fn complete_sequences(&self) -> Vec<Vec<KeyInput>> {
        let arg = KeyInput::from_char('x');
        let operator_motions = self.operator_motions.complete_sequences(arg);
        let mut out = self.movements.complete_sequences(arg);
        for command in self.commands.iter() {
            let name = command.name().keys();
            match command {
                Command::Simple { .. } => out.push(name.to_vec()),
                Command::Long { .. } => out.push([name, std::slice::from_ref(&arg)].concat()),
                Command::Motion { .. } => {
                    out.push([name, &name[name.len() - 1..]].concat());
                    out.extend(operator_motions.iter().map(|motion| [name, motion.as_slice()].concat()));
                }
            }
        }
        out
    }

    /// Strict prefixes of multi-key commands that do not leave the runner
    /// waiting, described as `prefix of command: result`.
    #[cfg(test)]
    pub(crate) fn prefixes_not_waiting(&self) -> Vec<String> {
        let mut failures = Vec::new();
        for keys in self.complete_sequences() {
            let mut runner = self.clone();
            runner.reset();
            for (i, key) in keys.iter().enumerate().take(keys.len().saturating_sub(1)) {
                let result = runner.run(*key);
                if !matches!(result, RunResult::NeedMoreInput) || !runner.is_waiting_for_input() {
                    failures.push(format!(
                        "{} of {}: {result:?}",
                        KeyInputSet::new(keys[..=i].to_vec()),
                        KeyInputSet::new(keys.clone()),
                    ));
                    break;
                }
            }
        }
        failures
    }

    fn complete(
        &mut self,
        command: Recognized<A>,
        motion_count: Option<u32>,
        keys: Vec<KeyInput>,
    ) -> RunResult<A> {
        let count = match (self.count.current, motion_count) {
            (Some(a), Some(b)) => Some(a.saturating_mul(b)),
            (a, b) => a.or(b),
        };
        let invocation = Invocation {
            command,
            count,
            register: self.register,
            keys,
        };
        self.reset();
        tracing::trace!(target: "vim.runner", keys = %KeyInputSet::new(invocation.keys.clone()), count = ?invocation.count, "recognized");
        RunResult::Complete(invocation)
    }
}
