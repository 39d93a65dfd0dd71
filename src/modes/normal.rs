use crate::change::{RepeatableChange, TextEdit};
use crate::command::{Command, CommandFlags, CommandTable};
use crate::config::Settings;
use crate::context::{Context, TextRepeat};
use crate::error::VimError;
use crate::key::{KeyCode, KeyInput, KeyInputSet, Modifiers};
use crate::marks::LAST_CHANGE;
use crate::motion::{Motion, MotionTable, OperatorContext, SearchState};
use crate::runner::{CommandRunner, Invocation, Recognized, RunResult};
use crate::traits::{Host, SearchStep};
use crate::types::{
    Direction, ModeKind, Operation, Position, Range, ScrollKind, ShiftDirection, TabTarget, VisualKind,
};

use super::ops::{self, CaseChange, Operator, Span};
use super::{
    ProcessResult, advance, normal_caret, overwrite, repeated, report, set_normal_caret, step_back, step_forward,
};

/// Everything normal mode can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalAction {
    /// An operator waiting for its motion (`d`, `y`, `c`, `<`, `>`, `g~`, ...).
    Operator(Operator),
    /// A one-key form of an operator and motion (`x` is `dl`, `D` is `d$`).
    Shortcut(Operator, Motion),
    Join,
    JoinRaw,
    ToggleCaseChar,
    ReplaceChar,
    PutAfter,
    PutBefore,
    InsertBefore,
    Append,
    InsertAtFirstNonBlank,
    AppendAtEnd,
    InsertAtLineStart,
    OpenBelow,
    OpenAbove,
    Undo,
    Redo,
    Scroll(ScrollKind),
    Search(Direction),
    SetMark,
    NextTab,
    PreviousTab,
    Visual(VisualKind),
    ReplaceMode,
    CommandLine,
    RepeatLastChange,
}

fn command_table(settings: &Settings) -> CommandTable<NormalAction> {
    let edit = CommandFlags::REPEATABLE;
    let text = CommandFlags::REPEATABLE | CommandFlags::LINKED_TEXT;
    let special = CommandFlags::SPECIAL;
    let none = CommandFlags::empty();
    let key = |code: KeyCode| KeyInputSet::from(KeyInput::from_key(code, Modifiers::empty()));
    let ctrl = |c: char| KeyInputSet::from(KeyInput::ctrl(c));

    let mut table = CommandTable::new();

    let operators: [(&str, CommandFlags, Operator); 7] = [
        ("d", edit, Operator::Delete),
        ("y", none, Operator::Yank),
        ("c", text, Operator::Change),
        ("<", edit, Operator::Shift(ShiftDirection::Left)),
        (">", edit, Operator::Shift(ShiftDirection::Right)),
        ("gu", edit, Operator::Case(CaseChange::Lower)),
        ("gU", edit, Operator::Case(CaseChange::Upper)),
    ];
    for (name, flags, op) in operators {
        table.add(Command::motion(name, flags, NormalAction::Operator(op)));
    }
    table.add(Command::motion("g~", edit, NormalAction::Operator(Operator::Case(CaseChange::Toggle))));
    if settings.tilde_op {
        table.add(Command::motion("~", edit, NormalAction::Operator(Operator::Case(CaseChange::Toggle))));
    } else {
        table.add(Command::simple("~", edit, NormalAction::ToggleCaseChar));
    }

    let shortcuts: [(KeyInputSet, CommandFlags, Operator, Motion); 8] = [
        ("x".into(), edit, Operator::Delete, Motion::Right),
        (key(KeyCode::Delete), edit, Operator::Delete, Motion::Right),
        ("X".into(), edit, Operator::Delete, Motion::Left),
        ("D".into(), edit, Operator::Delete, Motion::LineEnd),
        ("C".into(), text, Operator::Change, Motion::LineEnd),
        ("s".into(), text, Operator::Change, Motion::Right),
        ("S".into(), text, Operator::Change, Motion::CurrentLines),
        ("Y".into(), none, Operator::Yank, Motion::CurrentLines),
    ];
    for (name, flags, op, motion) in shortcuts {
        table.add(Command::simple(name, flags, NormalAction::Shortcut(op, motion)));
    }

    let simple: Vec<(KeyInputSet, CommandFlags, NormalAction)> = vec![
        ("J".into(), edit, NormalAction::Join),
        ("gJ".into(), edit, NormalAction::JoinRaw),
        ("p".into(), edit, NormalAction::PutAfter),
        ("P".into(), edit, NormalAction::PutBefore),
        ("i".into(), text, NormalAction::InsertBefore),
        (key(KeyCode::Insert), text, NormalAction::InsertBefore),
        ("a".into(), text, NormalAction::Append),
        ("I".into(), text, NormalAction::InsertAtFirstNonBlank),
        ("A".into(), text, NormalAction::AppendAtEnd),
        ("gI".into(), text, NormalAction::InsertAtLineStart),
        ("o".into(), text, NormalAction::OpenBelow),
        ("O".into(), text, NormalAction::OpenAbove),
        ("u".into(), special, NormalAction::Undo),
        (ctrl('r'), special, NormalAction::Redo),
        (ctrl('e'), none, NormalAction::Scroll(ScrollKind::LineDown)),
        (ctrl('y'), none, NormalAction::Scroll(ScrollKind::LineUp)),
        (ctrl('d'), none, NormalAction::Scroll(ScrollKind::HalfPageDown)),
        (ctrl('u'), none, NormalAction::Scroll(ScrollKind::HalfPageUp)),
        (ctrl('f'), none, NormalAction::Scroll(ScrollKind::PageDown)),
        (key(KeyCode::PageDown), none, NormalAction::Scroll(ScrollKind::PageDown)),
        (ctrl('b'), none, NormalAction::Scroll(ScrollKind::PageUp)),
        (key(KeyCode::PageUp), none, NormalAction::Scroll(ScrollKind::PageUp)),
        ("/".into(), none, NormalAction::Search(Direction::Forward)),
        ("?".into(), none, NormalAction::Search(Direction::Backward)),
        ("gt".into(), none, NormalAction::NextTab),
        ("gT".into(), none, NormalAction::PreviousTab),
        ("v".into(), none, NormalAction::Visual(VisualKind::Character)),
        ("V".into(), none, NormalAction::Visual(VisualKind::Line)),
        (ctrl('v'), none, NormalAction::Visual(VisualKind::Block)),
        ("R".into(), text, NormalAction::ReplaceMode),
        (":".into(), none, NormalAction::CommandLine),
        (".".into(), special, NormalAction::RepeatLastChange),
    ];
    for (name, flags, action) in simple {
        table.add(Command::simple(name, flags, action));
    }

    table.add(Command::long("r", edit, NormalAction::ReplaceChar));
    table.add(Command::long("m", none, NormalAction::SetMark));
    table
}

#[derive(Debug, Clone, Copy)]
struct PendingSearch {
    direction: Direction,
    count: Option<u32>,
}

/// Normal mode: keys are commands.
#[derive(Debug, Clone)]
pub struct NormalMode {
    runner: CommandRunner<NormalAction>,
    tilde_op: bool,
    /// Sticky column kept across `j`/`k`.
    preferred_col: Option<u32>,
    search: Option<PendingSearch>,
}

impl NormalMode {
    pub fn new(settings: &Settings) -> Self {
        Self {
            runner: CommandRunner::new(
                command_table(settings),
                MotionTable::movements(),
                MotionTable::with_text_objects(),
            ),
            tilde_op: settings.tilde_op,
            preferred_col: None,
            search: None,
        }
    }

    /// Rebuild the command table if a setting it depends on changed.
    pub(crate) fn apply_settings(&mut self, settings: &Settings) {
        if settings.tilde_op != self.tilde_op {
            *self = Self::new(settings);
        }
    }

    pub fn kind(&self) -> ModeKind {
        ModeKind::Normal
    }

    /// First keys of every command this mode recognizes.
    pub fn commands(&self) -> Vec<KeyInput> {
        self.runner.first_keys()
    }

    pub fn is_waiting_for_input(&self) -> bool {
        self.search.is_some() || self.runner.is_waiting_for_input()
    }

    pub fn in_operator_pending(&self) -> bool {
        self.runner.in_operator_pending()
    }

    pub fn in_incremental_search(&self) -> bool {
        self.search.is_some()
    }

    pub fn pending_keys(&self) -> String {
        self.runner.pending_keys()
    }

    pub fn can_process<H: Host>(&self, host: &mut H, key: KeyInput) -> bool {
        if self.search.is_some() {
            return true;
        }
        if host.completion_active() {
            return key.is_escape();
        }
        key.is_escape() || self.runner.is_waiting_for_input() || self.runner.can_start(&key)
    }

    pub fn on_enter<H: Host>(&mut self, host: &mut H) {
        self.runner.reset();
        self.search = None;
        let cursor = host.cursor();
        if normal_caret(&*host, cursor) != cursor {
            set_normal_caret(host, cursor);
        }
    }

    pub fn on_leave(&mut self) {
        self.runner.reset();
        self.search = None;
        self.preferred_col = None;
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
        if let Some(pending) = self.search {
            return self.process_search(ctx, host, key, pending);
        }

        if host.completion_active() {
            if !key.is_escape() {
                return Ok(ProcessResult::NotHandled);
            }
            if let Some(broker) = host.display_windows() {
                broker.dismiss_completion();
            }
            return Ok(ProcessResult::Processed);
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

    fn process_search<H: Host>(
        &mut self,
        ctx: &mut Context,
        host: &mut H,
        key: KeyInput,
        pending: PendingSearch,
    ) -> Result<ProcessResult, VimError> {
        let Some(search) = host.incremental_search() else {
            self.search = None;
            return Ok(ProcessResult::NotHandled);
        };
        match search.process(key) {
            SearchStep::NeedMore => Ok(ProcessResult::Processed),
            SearchStep::Cancelled => {
                self.search = None;
                Ok(ProcessResult::Processed)
            }
            SearchStep::Complete(pattern) => {
                self.search = None;
                let pattern = if pattern.is_empty() {
                    ctx.last_search
                        .as_ref()
                        .map(|s| s.pattern.clone())
                        .ok_or(VimError::NoPreviousPattern)?
                } else {
                    pattern
                };
                ctx.set_last_search(SearchState {
                    pattern,
                    direction: pending.direction,
                });
                self.move_caret(ctx, host, Motion::SearchNext, pending.count)?;
                Ok(ProcessResult::Processed)
            }
        }
    }

    fn execute<H: Host>(
        &mut self,
        ctx: &mut Context,
        host: &mut H,
        invocation: Invocation<NormalAction>,
    ) -> Result<ProcessResult, VimError> {
        tracing::debug!(
            target: "vim.normal",
            keys = %KeyInputSet::new(invocation.keys.clone()),
            count = ?invocation.count,
            register = ?invocation.register,
            "execute"
        );
        let count = invocation.count;
        let register = invocation.register;
        let result = match invocation.command {
            Recognized::Movement(motion) => {
                self.move_caret(ctx, host, motion, count)?;
                return Ok(ProcessResult::Processed);
            }
            Recognized::Operator {
                action: NormalAction::Operator(op),
                motion,
                ..
            } => self.run_operator(ctx, host, op, motion, count, register)?,
            Recognized::Operator { .. } => return Err(unknown(&invocation)),
            Recognized::Simple { action, .. } => self.run_simple(ctx, host, action, &invocation)?,
            Recognized::Long { action, arg, .. } => self.run_long(ctx, host, action, arg, count)?,
        };
        self.preferred_col = None;

        let flags = invocation.flags();
        if flags.contains(CommandFlags::REPEATABLE) {
            let enters_text = flags.contains(CommandFlags::LINKED_TEXT)
                && matches!(
                    result,
                    ProcessResult::SwitchMode(ModeKind::Insert | ModeKind::Replace)
                );
            ctx.changes
                .on_command_executed(&invocation.keys, count, register, enters_text);
        }
        Ok(result)
    }

    fn move_caret<H: Host>(
        &mut self,
        ctx: &mut Context,
        host: &mut H,
        motion: Motion,
        count: Option<u32>,
    ) -> Result<(), VimError> {
        let cursor = host.cursor();
        let data = ctx.evaluate_motion(
            &*host,
            cursor,
            motion,
            count,
            OperatorContext::Movement,
            self.preferred_col,
        )?;
        ctx.remember_motion(&data);
        if data.is_jump {
            ctx.marks.record_jump(cursor);
        }
        self.preferred_col = data.column;
        set_normal_caret(host, data.caret);
        Ok(())
    }

    fn run_operator<H: Host>(
        &mut self,
        ctx: &mut Context,
        host: &mut H,
        op: Operator,
        motion: Motion,
        count: Option<u32>,
        register: Option<char>,
    ) -> Result<ProcessResult, VimError> {
        let cursor = host.cursor();
        let context = if op == Operator::Change {
            OperatorContext::Change
        } else {
            OperatorContext::Other
        };
        let data = ctx.evaluate_motion(&*host, cursor, motion, count, context, None)?;
        ctx.remember_motion(&data);
        if data.is_jump {
            ctx.marks.record_jump(cursor);
        }
        let span = Span::from_motion(&data);
        let empty = matches!(span, Span::Chars(range) if range.is_empty());

        match op {
            Operator::Change => {
                ops::change(ctx, host, span, register)?;
                return Ok(ProcessResult::SwitchMode(ModeKind::Insert));
            }
            _ if empty => {}
            Operator::Delete => {
                ops::delete(ctx, host, span, register)?;
            }
            Operator::Yank => {
                ops::yank(ctx, host, span, register)?;
                match span {
                    Span::Chars(range) if range.start < cursor => {
                        set_normal_caret(host, range.start);
                    }
                    Span::Lines { first, .. } if first < cursor.line => {
                        set_normal_caret(host, Position::new(first, cursor.col));
                    }
                    _ => {}
                }
            }
            Operator::Shift(direction) => {
                ops::shift(host, span, direction, 1);
            }
            Operator::Case(case) => {
                ops::change_case(ctx, host, span, case);
            }
        }
        Ok(ProcessResult::Processed)
    }

    fn run_simple<H: Host>(
        &mut self,
        ctx: &mut Context,
        host: &mut H,
        action: NormalAction,
        invocation: &Invocation<NormalAction>,
    ) -> Result<ProcessResult, VimError> {
        let count = invocation.count;
        let n = invocation.count_or_one();
        let cursor = host.cursor();
        let line = cursor.line;

        let insert_at = |ctx: &mut Context, host: &mut H, pos: Position, new_line: bool| {
            ctx.text_repeat = TextRepeat { count: n, new_line };
            host.apply(Operation::SetCursor(pos));
            ProcessResult::SwitchMode(ModeKind::Insert)
        };

        Ok(match action {
            NormalAction::Shortcut(op, motion) => {
                return self.run_operator(ctx, host, op, motion, count, invocation.register);
            }
            NormalAction::Join | NormalAction::JoinRaw => {
                let last = line.saturating_add(n.max(2) - 1);
                let caret = ops::join_lines(host, line, last, action == NormalAction::Join)?;
                ctx.marks.set_internal(LAST_CHANGE, caret);
                ProcessResult::Processed
            }
            NormalAction::ToggleCaseChar => {
                let len = host.line_len(line);
                if len > 0 {
                    let end = cursor.col.saturating_add(n).min(len);
                    let span = Span::Chars(Range {
                        start: cursor,
                        end: Position::new(line, end),
                    });
                    ops::change_case(ctx, host, span, CaseChange::Toggle);
                    set_normal_caret(host, Position::new(line, end));
                }
                ProcessResult::Processed
            }
            NormalAction::PutAfter | NormalAction::PutBefore => {
                let value = ctx.read_register(invocation.register)?;
                let caret = ops::put(
                    host,
                    cursor,
                    &value.text,
                    value.kind,
                    n,
                    action == NormalAction::PutAfter,
                )?;
                ctx.marks.set_internal(LAST_CHANGE, caret);
                ProcessResult::Processed
            }
            NormalAction::InsertBefore => insert_at(ctx, host, cursor, false),
            NormalAction::Append => {
                let col = if host.line_len(line) > 0 { cursor.col + 1 } else { 0 };
                insert_at(ctx, host, Position::new(line, col), false)
            }
            NormalAction::InsertAtFirstNonBlank => {
                let col = host.first_non_blank(line);
                insert_at(ctx, host, Position::new(line, col), false)
            }
            NormalAction::AppendAtEnd => {
                let col = host.line_len(line);
                insert_at(ctx, host, Position::new(line, col), false)
            }
            NormalAction::InsertAtLineStart => insert_at(ctx, host, Position::new(line, 0), false),
            NormalAction::OpenBelow => {
                let len = host.line_len(line);
                host.apply(Operation::InsertText {
                    at: Position::new(line, len),
                    text: "\n".into(),
                });
                insert_at(ctx, host, Position::new(line + 1, 0), true)
            }
            NormalAction::OpenAbove => {
                host.apply(Operation::InsertText {
                    at: Position::new(line, 0),
                    text: "\n".into(),
                });
                insert_at(ctx, host, Position::new(line, 0), true)
            }
            NormalAction::Undo | NormalAction::Redo => {
                host.apply(if action == NormalAction::Undo {
                    Operation::Undo { count: n }
                } else {
                    Operation::Redo { count: n }
                });
                let cursor = host.cursor();
                if normal_caret(&*host, cursor) != cursor {
                    set_normal_caret(host, cursor);
                }
                ProcessResult::Processed
            }
            NormalAction::Scroll(kind) => {
                let default = match kind {
                    ScrollKind::HalfPageDown | ScrollKind::HalfPageUp => ctx.settings.scroll_lines,
                    _ => 1,
                };
                host.apply(Operation::Scroll {
                    kind,
                    count: count.unwrap_or(default),
                });
                ProcessResult::Processed
            }
            NormalAction::Search(direction) => match host.incremental_search() {
                Some(search) => {
                    search.begin(direction);
                    self.search = Some(PendingSearch { direction, count });
                    ProcessResult::Processed
                }
                None => ProcessResult::NotHandled,
            },
            NormalAction::NextTab => {
                host.apply(Operation::GoToTab(match count {
                    Some(index) => TabTarget::Index(index),
                    None => TabTarget::Next,
                }));
                ProcessResult::Processed
            }
            NormalAction::PreviousTab => {
                for _ in 0..n {
                    host.apply(Operation::GoToTab(TabTarget::Previous));
                }
                ProcessResult::Processed
            }
            NormalAction::Visual(kind) => ProcessResult::SwitchMode(ModeKind::Visual(kind)),
            NormalAction::ReplaceMode => {
                ctx.text_repeat = TextRepeat {
                    count: n,
                    new_line: false,
                };
                ProcessResult::SwitchMode(ModeKind::Replace)
            }
            NormalAction::CommandLine => ProcessResult::SwitchMode(ModeKind::Command),
            NormalAction::RepeatLastChange => self.repeat_last_change(ctx, host, count)?,
            NormalAction::Operator(_) | NormalAction::ReplaceChar | NormalAction::SetMark => {
                return Err(unknown(invocation));
            }
        })
    }

    fn run_long<H: Host>(
        &mut self,
        ctx: &mut Context,
        host: &mut H,
        action: NormalAction,
        arg: KeyInput,
        count: Option<u32>,
    ) -> Result<ProcessResult, VimError> {
        let cursor = host.cursor();
        match action {
            NormalAction::ReplaceChar => {
                let n = count.unwrap_or(1).max(1);
                if cursor.col.saturating_add(n) > host.line_len(cursor.line) {
                    return Err(VimError::NotEnoughCharacters);
                }
                let range = Range {
                    start: cursor,
                    end: Position::new(cursor.line, cursor.col + n),
                };
                if arg.code() == KeyCode::Enter {
                    host.apply(Operation::Replace {
                        range,
                        text: "\n".into(),
                    });
                    let line = cursor.line + 1;
                    let col = host.first_non_blank(line);
                    let caret = set_normal_caret(host, Position::new(line, col));
                    ctx.marks.set_internal(LAST_CHANGE, caret);
                    return Ok(ProcessResult::Processed);
                }
                let Some(c) = arg.char() else {
                    host.beep();
                    return Ok(ProcessResult::Processed);
                };
                host.apply(Operation::Replace {
                    range,
                    text: c.to_string().repeat(n as usize),
                });
                let caret = set_normal_caret(host, Position::new(cursor.line, cursor.col + n - 1));
                ctx.marks.set_internal(LAST_CHANGE, caret);
                Ok(ProcessResult::Processed)
            }
            NormalAction::SetMark => {
                let name = arg.plain_char().ok_or(VimError::InvalidMarkName('?'))?;
                ctx.marks.set(name, cursor)?;
                Ok(ProcessResult::Processed)
            }
            _ => Err(VimError::UnknownCommand(format!("{action:?}"))),
        }
    }

    fn repeat_last_change<H: Host>(
        &mut self,
        ctx: &mut Context,
        host: &mut H,
        count: Option<u32>,
    ) -> Result<ProcessResult, VimError> {
        let change = ctx
            .changes
            .last_change()
            .cloned()
            .ok_or(VimError::NothingToRepeat)?;
        ctx.changes.begin_repeat()?;
        tracing::debug!(target: "vim.change", %change, ?count, "repeat");
        let result = self.replay(ctx, host, &change, count);
        ctx.changes.end_repeat();
        result
    }

    fn replay<H: Host>(
        &mut self,
        ctx: &mut Context,
        host: &mut H,
        change: &RepeatableChange,
        count: Option<u32>,
    ) -> Result<ProcessResult, VimError> {
        match change {
            RepeatableChange::Text(edit) => {
                let all = repeated(&edit.text, count.unwrap_or(1).max(1), false)?;
                erase_replayed(host, edit);
                insert_replayed(host, &all);
                Ok(ProcessResult::Processed)
            }
            RepeatableChange::Normal {
                keys,
                count: recorded,
                register,
            } => {
                let keys = RepeatableChange::replay_keys(keys, count.or(*recorded), *register);
                let mut result = ProcessResult::Processed;
                for key in keys {
                    result = self.process_key(ctx, host, key)?;
                }
                Ok(result)
            }
            RepeatableChange::Linked(command, text) => {
                let RepeatableChange::Text(edit) = text.as_ref() else {
                    self.replay(ctx, host, command, count)?;
                    return self.replay(ctx, host, text, None);
                };
                let result = self.replay(ctx, host, command, count)?;
                let repeat = std::mem::take(&mut ctx.text_repeat);
                match result {
                    ProcessResult::SwitchMode(ModeKind::Insert) => {
                        let extra = repeated(&edit.text, repeat.count.saturating_sub(1), repeat.new_line)?;
                        erase_replayed(host, edit);
                        insert_replayed(host, &format!("{}{extra}", edit.text));
                        Ok(ProcessResult::Processed)
                    }
                    ProcessResult::SwitchMode(ModeKind::Replace) => {
                        let all = repeated(&edit.text, repeat.count.max(1), false)?;
                        let at = host.cursor();
                        let end = overwrite(host, at, &all);
                        set_normal_caret(host, Position::new(end.line, end.col.saturating_sub(1)));
                        Ok(ProcessResult::Processed)
                    }
                    other => Ok(other),
                }
            }
        }
    }
}

/// Erase what an insert session erased around its text, starting from the
/// cursor.
fn erase_replayed<H: Host>(host: &mut H, edit: &TextEdit) {
    let cursor = host.cursor();
    let mut start = cursor;
    for _ in 0..edit.erased_before {
        match step_back(&*host, start) {
            Some(pos) => start = pos,
            None => break,
        }
    }
    let mut end = cursor;
    for _ in 0..edit.erased_after {
        match step_forward(&*host, end) {
            Some(pos) => end = pos,
            None => break,
        }
    }
    if start != end {
        host.apply(Operation::Delete {
            range: Range { start, end },
        });
        host.apply(Operation::SetCursor(start));
    }
}

/// Insert replayed text at the cursor and leave the caret on its last
/// character, as leaving insert mode would.
fn insert_replayed<H: Host>(host: &mut H, text: &str) {
    let at = host.cursor();
    if !text.is_empty() {
        host.apply(Operation::InsertText {
            at,
            text: text.to_string(),
        });
    }
    let end = advance(at, text);
    let caret = Position::new(end.line, end.col.saturating_sub(1));
    set_normal_caret(host, caret);
}

fn unknown(invocation: &Invocation<NormalAction>) -> VimError {
    VimError::UnknownCommand(KeyInputSet::new(invocation.keys.clone()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_multi_key_command_waits_after_each_prefix() {
        for tilde_op in [false, true] {
            let settings = Settings {
                tilde_op,
                ..Settings::default()
            };
            let mode = NormalMode::new(&settings);
            let sequences = mode.runner.complete_sequences();
            for name in command_table(&settings).names().chain(MotionTable::movements().names()) {
                assert!(sequences.iter().any(|keys| keys.starts_with(name.keys())), "{name} not enumerated");
            }
            for expected in ["gUiw", "guu", "d`x", "rx", "gg"] {
                assert!(sequences.contains(&KeyInput::parse(expected).unwrap()), "{expected} not enumerated");
            }
            assert_eq!(mode.runner.prefixes_not_waiting(), Vec::<String>::new(), "tilde_op = {tilde_op}");
        }
    }
}
