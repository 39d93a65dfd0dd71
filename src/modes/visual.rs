use crate::command::{Command, CommandFlags, CommandTable};
use crate::context::Context;
use crate::error::VimError;
use crate::key::{KeyCode, KeyInput, KeyInputSet, Modifiers};
use crate::marks::{VISUAL_END, VISUAL_START};
use crate::motion::{Motion, MotionTable, OperatorContext};
use crate::register::RegisterKind;
use crate::runner::{CommandRunner, Invocation, Recognized, RunResult};
use crate::traits::Host;
use crate::types::{ModeKind, Operation, Position, Range, Selection, ShiftDirection, VisualKind};

use super::ops::{self, CaseChange, Operator, Span};
use super::{ProcessResult, report, set_normal_caret};

/// Everything visual mode can do with its selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualAction {
    /// Apply an operator to the selection.
    Operator(Operator),
    /// Apply an operator to every line the selection touches (`D`, `Y`,
    /// `C`, `S`); in a block selection `D` and `C` reach the line ends.
    Lines(Operator),
    Join,
    JoinRaw,
    ReplaceChar,
    Put,
    /// Move the caret to the other end of the selection (`o`).
    SwapEnds,
    /// Move the caret to the other corner of the same line (`O`); like `o`
    /// outside block selections.
    SwapCorner,
    SwitchKind(VisualKind),
    CommandLine,
}

fn command_table() -> CommandTable<VisualAction> {
    let none = CommandFlags::empty();
    let text = CommandFlags::LINKED_TEXT;
    let mut table = CommandTable::new();

    let commands: Vec<(KeyInputSet, CommandFlags, VisualAction)> = vec![
        ("d".into(), none, VisualAction::Operator(Operator::Delete)),
        ("x".into(), none, VisualAction::Operator(Operator::Delete)),
        (
            KeyInput::from_key(KeyCode::Delete, Modifiers::empty()).into(),
            none,
            VisualAction::Operator(Operator::Delete),
        ),
        ("y".into(), none, VisualAction::Operator(Operator::Yank)),
        ("c".into(), text, VisualAction::Operator(Operator::Change)),
        ("s".into(), text, VisualAction::Operator(Operator::Change)),
        ("<".into(), none, VisualAction::Operator(Operator::Shift(ShiftDirection::Left))),
        (">".into(), none, VisualAction::Operator(Operator::Shift(ShiftDirection::Right))),
        ("~".into(), none, VisualAction::Operator(Operator::Case(CaseChange::Toggle))),
        ("u".into(), none, VisualAction::Operator(Operator::Case(CaseChange::Lower))),
        ("U".into(), none, VisualAction::Operator(Operator::Case(CaseChange::Upper))),
        ("D".into(), none, VisualAction::Lines(Operator::Delete)),
        ("X".into(), none, VisualAction::Lines(Operator::Delete)),
        ("Y".into(), none, VisualAction::Lines(Operator::Yank)),
        ("C".into(), text, VisualAction::Lines(Operator::Change)),
        ("S".into(), text, VisualAction::Lines(Operator::Change)),
        ("R".into(), text, VisualAction::Lines(Operator::Change)),
        ("J".into(), none, VisualAction::Join),
        ("gJ".into(), none, VisualAction::JoinRaw),
        ("p".into(), none, VisualAction::Put),
        ("P".into(), none, VisualAction::Put),
        ("o".into(), none, VisualAction::SwapEnds),
        ("O".into(), none, VisualAction::SwapCorner),
        ("v".into(), none, VisualAction::SwitchKind(VisualKind::Character)),
        ("V".into(), none, VisualAction::SwitchKind(VisualKind::Line)),
        (KeyInput::ctrl('v').into(), none, VisualAction::SwitchKind(VisualKind::Block)),
        (":".into(), none, VisualAction::CommandLine),
    ];
    for (name, flags, action) in commands {
        table.add(Command::simple(name, flags, action));
    }
    table.add(Command::long("r", none, VisualAction::ReplaceChar));
    table
}

/// Visual mode, shared by the character, line and block variants.
///
/// The selection runs from a fixed anchor to the caret. Every movement
/// command marks an explicit move, so the selection change it causes is not
/// mistaken for one the host made on its own.
#[derive(Debug, Clone)]
pub struct VisualMode {
    kind: VisualKind,
    anchor: Position,
    caret: Position,
    runner: CommandRunner<VisualAction>,
    explicit_move: bool,
    preferred_col: Option<u32>,
}

impl Default for VisualMode {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualMode {
    pub fn new() -> Self {
        Self {
            kind: VisualKind::Character,
            anchor: Position::ZERO,
            caret: Position::ZERO,
            runner: CommandRunner::new(
                command_table(),
                MotionTable::with_text_objects(),
                MotionTable::with_text_objects(),
            ),
            explicit_move: false,
            preferred_col: None,
        }
    }

    pub fn with_kind(kind: VisualKind) -> Self {
        Self {
            kind,
            ..Self::new()
        }
    }

    pub fn kind(&self) -> ModeKind {
        ModeKind::Visual(self.kind)
    }

    pub fn visual_kind(&self) -> VisualKind {
        self.kind
    }

    pub fn selection(&self) -> Selection {
        Selection {
            start: self.anchor,
            end: self.caret,
            kind: self.kind,
        }
    }

    pub fn commands(&self) -> Vec<KeyInput> {
        self.runner.first_keys()
    }

    pub fn is_waiting_for_input(&self) -> bool {
        self.runner.is_waiting_for_input()
    }

    pub fn pending_keys(&self) -> String {
        self.runner.pending_keys()
    }

    pub fn can_process(&self, key: KeyInput) -> bool {
        key.is_escape() || self.runner.is_waiting_for_input() || self.runner.can_start(&key)
    }

    /// Whether the last selection change came from a visual movement;
    /// reading the flag clears it.
    pub fn take_explicit_move(&mut self) -> bool {
        std::mem::take(&mut self.explicit_move)
    }

    /// Start a selection: adopt the host's selection if it has one,
    /// otherwise anchor at the cursor.
    pub fn on_enter<H: Host>(&mut self, host: &mut H, kind: VisualKind) {
        self.runner.reset();
        self.kind = kind;
        self.preferred_col = None;
        match host.selection() {
            Some(selection) if selection.start != selection.end => {
                self.anchor = selection.start;
                self.caret = selection.end;
            }
            _ => {
                let cursor = host.cursor();
                self.anchor = cursor;
                self.caret = cursor;
            }
        }
        self.explicit_move = false;
        self.show(host);
    }

    /// Switch between character, line and block selection, keeping the
    /// anchor and caret.
    pub fn set_kind<H: Host>(&mut self, host: &mut H, kind: VisualKind) {
        self.kind = kind;
        self.runner.reset();
        self.show(host);
    }

    /// Push the selection to the host, noting that the change is ours.
    fn show<H: Host>(&mut self, host: &mut H) {
        let selection = self.selection();
        if host.selection() != Some(selection) {
            self.explicit_move = true;
            host.apply(Operation::SetSelection(Some(selection)));
        }
    }

    /// Pick up a selection the host changed on its own.
    pub(crate) fn sync_from_host<H: Host>(&mut self, host: &H) {
        if let Some(selection) = host.selection() {
            self.anchor = selection.start;
            self.caret = selection.end;
        }
    }

    /// Record the `<` and `>` marks and clear the host selection.
    pub fn on_leave<H: Host>(&mut self, ctx: &mut Context, host: &mut H) {
        self.runner.reset();
        let (start, end) = self.selection().ordered();
        ctx.marks.set_internal(VISUAL_START, start);
        ctx.marks.set_internal(VISUAL_END, end);
        self.explicit_move = false;
        host.apply(Operation::SetSelection(None));
    }

    pub fn process<H: Host>(&mut self, ctx: &mut Context, host: &mut H, key: KeyInput) -> ProcessResult {
        match self.process_key(ctx, host, key) {
            Ok(result) => result,
            Err(err) => {
                self.runner.reset();
                report(host, &err);
                ProcessResult::Error(err)
            }
        }
    }

    fn process_key<H: Host>(
        &mut self,
        ctx: &mut Context,
        host: &mut H,
        key: KeyInput,
    ) -> Result<ProcessResult, VimError> {
        if key.is_escape() && !self.runner.is_waiting_for_input() {
            return Ok(ProcessResult::SwitchPreviousMode);
        }
        if !key.is_escape() && !self.runner.is_waiting_for_input() && !self.runner.can_start(&key) {
            return Ok(ProcessResult::NotHandled);
        }
        match self.runner.run(key) {
            RunResult::NeedMoreInput | RunResult::Cancelled => Ok(ProcessResult::Processed),
            RunResult::Beep => {
                host.beep();
                Ok(ProcessResult::Processed)
            }
            RunResult::Error(err) => Err(err),
            RunResult::Complete(invocation) => self.execute(ctx, host, invocation),
        }
    }

    fn execute<H: Host>(
        &mut self,
        ctx: &mut Context,
        host: &mut H,
        invocation: Invocation<VisualAction>,
    ) -> Result<ProcessResult, VimError> {
        tracing::debug!(
            target: "vim.visual",
            kind = ?self.kind,
            keys = %KeyInputSet::new(invocation.keys.clone()),
            count = ?invocation.count,
            "execute"
        );
        match invocation.command {
            Recognized::Movement(motion) => {
                self.move_caret(ctx, host, motion, invocation.count)?;
                Ok(ProcessResult::Processed)
            }
            Recognized::Simple { action, .. } => self.run_simple(ctx, host, action, &invocation),
            Recognized::Long {
                action: VisualAction::ReplaceChar,
                arg,
                ..
            } => {
                let Some(c) = arg.char().filter(|_| arg.code() != KeyCode::Enter) else {
                    host.beep();
                    return Ok(ProcessResult::Processed);
                };
                let span = self.span(&*host);
                ops::replace_chars(ctx, host, span, c);
                if let Some((width, _)) = self.single_line_width(span) {
                    let mut keys = KeyInputSet::from("r").keys().to_vec();
                    keys.push(arg);
                    ctx.changes.on_command_executed(&keys, Some(width), None, false);
                }
                Ok(ProcessResult::SwitchPreviousMode)
            }
            Recognized::Long { .. } | Recognized::Operator { .. } => Err(VimError::UnknownCommand(
                KeyInputSet::new(invocation.keys.clone()).to_string(),
            )),
        }
    }

    fn move_caret<H: Host>(
        &mut self,
        ctx: &mut Context,
        host: &mut H,
        motion: Motion,
        count: Option<u32>,
    ) -> Result<(), VimError> {
        let data = ctx.evaluate_motion(
            &*host,
            self.caret,
            motion,
            count,
            OperatorContext::Movement,
            self.preferred_col,
        )?;
        ctx.remember_motion(&data);
        if data.is_jump {
            ctx.marks.record_jump(self.caret);
        }
        if matches!(motion, Motion::InnerWord(_) | Motion::AroundWord(_)) {
            if self.anchor == self.caret {
                self.anchor = data.span.start;
            }
            self.caret = Position::new(data.span.end.line, data.span.end.col.saturating_sub(1));
        } else {
            self.caret = data.caret;
        }
        self.preferred_col = data.column;
        host.apply(Operation::SetCursor(self.caret));
        self.show(host);
        Ok(())
    }

    /// The text the selection covers.
    fn span<H: Host>(&self, host: &H) -> Span {
        let (start, end) = self.selection().ordered();
        match self.kind {
            VisualKind::Character => {
                let len = host.line_len(end.line);
                let end = if end.col < len {
                    Position::new(end.line, end.col + 1)
                } else if end.line < host.last_line() {
                    Position::new(end.line + 1, 0)
                } else {
                    Position::new(end.line, len)
                };
                Span::Chars(Range { start, end })
            }
            VisualKind::Line => Span::Lines {
                first: start.line,
                last: end.line,
            },
            VisualKind::Block => Span::Block {
                first: start.line,
                last: end.line,
                left: self.anchor.col.min(self.caret.col),
                right: self.anchor.col.max(self.caret.col) + 1,
            },
        }
    }

    /// Width and line of a selection within one line, the only shape that
    /// `.` can replay as a normal command.
    fn single_line_width(&self, span: Span) -> Option<(u32, u32)> {
        match span {
            Span::Chars(range) if range.start.line == range.end.line && !range.is_empty() => {
                Some((range.end.col - range.start.col, range.start.line))
            }
            _ => None,
        }
    }

    fn run_simple<H: Host>(
        &mut self,
        ctx: &mut Context,
        host: &mut H,
        action: VisualAction,
        invocation: &Invocation<VisualAction>,
    ) -> Result<ProcessResult, VimError> {
        let register = invocation.register;
        let span = self.span(&*host);
        Ok(match action {
            VisualAction::Operator(op) => self.apply_operator(ctx, host, op, span, invocation)?,
            VisualAction::Lines(op) => {
                let span = match (self.kind, op) {
                    (VisualKind::Block, Operator::Delete | Operator::Change) => match span {
                        Span::Block {
                            first, last, left, ..
                        } => Span::Block {
                            first,
                            last,
                            left,
                            right: u32::MAX,
                        },
                        other => other,
                    },
                    _ => Span::Lines {
                        first: span.first_line(),
                        last: span.last_line(),
                    },
                };
                self.apply_operator(ctx, host, op, span, invocation)?
            }
            VisualAction::Join | VisualAction::JoinRaw => {
                let first = span.first_line();
                let last = span.last_line().max(first + 1);
                ops::join_lines(host, first, last, action == VisualAction::Join)?;
                let keys = if action == VisualAction::Join { "J" } else { "gJ" };
                ctx.changes.on_command_executed(
                    KeyInputSet::from(keys).keys(),
                    Some(last - first + 1),
                    None,
                    false,
                );
                ProcessResult::SwitchPreviousMode
            }
            VisualAction::Put => {
                let value = ctx.read_register(register)?;
                ops::delete(ctx, host, span, None)?;
                let at = span.start();
                match (span, value.kind) {
                    (Span::Lines { first, .. }, _) if first > host.last_line() => {
                        let line = host.last_line();
                        ops::put(host, Position::new(line, 0), &value.text, RegisterKind::LineWise, 1, true)?;
                    }
                    (Span::Lines { first, .. }, RegisterKind::LineWise) => {
                        ops::put(host, Position::new(first, 0), &value.text, value.kind, 1, false)?;
                    }
                    (_, RegisterKind::LineWise) => {
                        ops::put(host, at, &value.text, value.kind, 1, true)?;
                    }
                    _ => {
                        let at = host.clamp(at);
                        ops::put(host, at, &value.text, RegisterKind::CharacterWise, 1, false)?;
                    }
                }
                ProcessResult::SwitchPreviousMode
            }
            VisualAction::SwapEnds => {
                std::mem::swap(&mut self.anchor, &mut self.caret);
                self.moved(host);
                ProcessResult::Processed
            }
            VisualAction::SwapCorner => {
                if self.kind == VisualKind::Block {
                    std::mem::swap(&mut self.anchor.col, &mut self.caret.col);
                } else {
                    std::mem::swap(&mut self.anchor, &mut self.caret);
                }
                self.moved(host);
                ProcessResult::Processed
            }
            VisualAction::SwitchKind(kind) if kind == self.kind => ProcessResult::SwitchPreviousMode,
            VisualAction::SwitchKind(kind) => ProcessResult::SwitchMode(ModeKind::Visual(kind)),
            VisualAction::CommandLine => ProcessResult::SwitchMode(ModeKind::Command),
            VisualAction::ReplaceChar => {
                return Err(VimError::UnknownCommand(
                    KeyInputSet::new(invocation.keys.clone()).to_string(),
                ));
            }
        })
    }

    fn moved<H: Host>(&mut self, host: &mut H) {
        self.preferred_col = None;
        host.apply(Operation::SetCursor(self.caret));
        self.show(host);
    }

    fn apply_operator<H: Host>(
        &mut self,
        ctx: &mut Context,
        host: &mut H,
        op: Operator,
        span: Span,
        invocation: &Invocation<VisualAction>,
    ) -> Result<ProcessResult, VimError> {
        let register = invocation.register;
        let result = match op {
            Operator::Delete => {
                ops::delete(ctx, host, span, register)?;
                ProcessResult::SwitchPreviousMode
            }
            Operator::Yank => {
                ops::yank(ctx, host, span, register)?;
                let (start, _) = self.selection().ordered();
                let caret = match span {
                    Span::Block { first, left, .. } => Position::new(first, left),
                    _ => start,
                };
                set_normal_caret(host, caret);
                return Ok(ProcessResult::SwitchPreviousMode);
            }
            Operator::Change => {
                ops::change(ctx, host, span, register)?;
                ProcessResult::SwitchMode(ModeKind::Insert)
            }
            Operator::Shift(direction) => {
                ops::shift(host, span, direction, invocation.count_or_one());
                ProcessResult::SwitchPreviousMode
            }
            Operator::Case(case) => {
                ops::change_case(ctx, host, span, case);
                ProcessResult::SwitchPreviousMode
            }
        };
        self.record(ctx, op, span, register, invocation);
        Ok(result)
    }

    /// Record the operator as the equivalent normal command so `.` repeats
    /// it on the same amount of text from the cursor: `{n}dd` for lines,
    /// `{n}dl` within one line. Other shapes are not repeatable.
    fn record(
        &self,
        ctx: &mut Context,
        op: Operator,
        span: Span,
        register: Option<char>,
        invocation: &Invocation<VisualAction>,
    ) {
        let name = match op {
            Operator::Delete => "d",
            Operator::Change => "c",
            Operator::Shift(ShiftDirection::Left) => "<",
            Operator::Shift(ShiftDirection::Right) => ">",
            Operator::Case(CaseChange::Lower) => "gu",
            Operator::Case(CaseChange::Upper) => "gU",
            Operator::Case(CaseChange::Toggle) => "g~",
            Operator::Yank => return,
        };
        let (suffix, count) = match span {
            Span::Lines { first, last } => {
                let last_key = name.chars().last().map_or(name.to_string(), String::from);
                (last_key, last - first + 1)
            }
            _ => match self.single_line_width(span) {
                Some((width, _)) => ("l".to_string(), width),
                None => return,
            },
        };
        if let Operator::Shift(_) = op
            && invocation.count_or_one() > 1
        {
            // `3>` shifts three times; `.` would need the count twice.
            return;
        }
        let keys = KeyInputSet::from(format!("{name}{suffix}").as_str());
        let enters_text = op == Operator::Change && invocation.flags().contains(CommandFlags::LINKED_TEXT);
        ctx.changes
            .on_command_executed(keys.keys(), Some(count), register, enters_text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_include_operators_and_movements() {
        let mode = VisualMode::new();
        let keys = mode.commands();
        for c in ['d', 'y', 'c', 'o', 'j', 'w', 'r'] {
            assert!(keys.contains(&KeyInput::from_char(c)), "missing {c}");
        }
        assert!(!mode.can_process(KeyInput::from_char('q')));
        assert!(mode.can_process(KeyInput::escape()));
    }

    #[test]
    fn every_multi_key_command_waits_after_each_prefix() {
        let mode = VisualMode::new();
        let sequences = mode.runner.complete_sequences();
        for name in command_table().names() {
            assert!(sequences.iter().any(|keys| keys.starts_with(name.keys())), "{name} not enumerated");
        }
        assert_eq!(mode.runner.prefixes_not_waiting(), Vec::<String>::new());
    }
}
