use std::collections::VecDeque;

use crate::config::Settings;
use crate::context::Context;
use crate::error::VimError;
use crate::key::KeyInput;
use crate::modes::{CommandLineMode, InsertMode, NormalMode, ProcessResult, ReplaceMode, VisualMode};
use crate::traits::{Clipboard, Host};
use crate::types::{ModeKind, Selection, VisualKind};

/// A reaction to a host selection change, run later by
/// [`Engine::run_deferred`] so it never interrupts the host's own
/// multi-step edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// The host made a selection outside visual mode.
    EnterVisual,
    /// The host cleared the selection while in visual mode.
    LeaveVisual,
}

/// One editing session: the modes, the shared [`Context`] and one level of
/// previous-mode history.
#[derive(Debug)]
pub struct Engine {
    normal: NormalMode,
    insert: InsertMode,
    replace: ReplaceMode,
    visual: VisualMode,
    command_line: CommandLineMode,
    mode: ModeKind,
    previous: Option<ModeKind>,
    ctx: Context,
    deferred: VecDeque<DeferredTask>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub mode: ModeKind,
    pub previous_mode: Option<ModeKind>,
    /// Keys typed for a command that is not complete yet (`showcmd`).
    pub pending_keys: String,
    pub waiting_for_input: bool,
    pub operator_pending: bool,
    /// The `:` line being typed, in command-line mode.
    pub command_line: Option<String>,
    /// The visual selection, in visual mode.
    pub selection: Option<Selection>,
}

pub struct EngineBuilder {
    mode: ModeKind,
    settings: Settings,
    clipboard: Option<Box<dyn Clipboard>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            mode: ModeKind::Normal,
            settings: Settings::default(),
            clipboard: None,
        }
    }
}

impl EngineBuilder {
    pub fn mode(mut self, mode: ModeKind) -> Self {
        self.mode = mode;
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Back the `+` and `*` registers with `clipboard`.
    pub fn clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn build(self) -> Engine {
        let mut ctx = Context::new(self.settings);
        if let Some(clipboard) = self.clipboard {
            ctx.registers.set_clipboard(clipboard);
        }
        let mut visual = VisualMode::new();
        if let ModeKind::Visual(kind) = self.mode {
            visual = VisualMode::with_kind(kind);
        }
        Engine {
            normal: NormalMode::new(&ctx.settings),
            insert: InsertMode::new(),
            replace: ReplaceMode::new(),
            visual,
            command_line: CommandLineMode::new(),
            mode: self.mode,
            previous: None,
            ctx,
            deferred: VecDeque::new(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::default().build()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn mode(&self) -> ModeKind {
        self.mode
    }

    pub fn previous_mode(&self) -> Option<ModeKind> {
        self.previous
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn settings(&self) -> &Settings {
        &self.ctx.settings
    }

    /// Replace the settings; the normal-mode command table is rebuilt when
    /// `tilde_op` changes.
    pub fn set_settings(&mut self, settings: Settings) {
        self.ctx.registers.set_clipboard_unnamed(settings.clipboard_unnamed);
        self.normal.apply_settings(&settings);
        self.ctx.settings = settings;
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            mode: self.mode,
            previous_mode: self.previous,
            pending_keys: match self.mode {
                ModeKind::Normal => self.normal.pending_keys(),
                ModeKind::Visual(_) => self.visual.pending_keys(),
                _ => String::new(),
            },
            waiting_for_input: self.is_waiting_for_input(),
            operator_pending: self.mode == ModeKind::Normal && self.normal.in_operator_pending(),
            command_line: (self.mode == ModeKind::Command).then(|| self.command_line.line()),
            selection: self.mode.is_visual().then(|| self.visual.selection()),
        }
    }

    /// True while the active mode holds a partly typed command.
    pub fn is_waiting_for_input(&self) -> bool {
        match self.mode {
            ModeKind::Normal => self.normal.is_waiting_for_input(),
            ModeKind::Visual(_) => self.visual.is_waiting_for_input(),
            ModeKind::Insert | ModeKind::Replace | ModeKind::Command => false,
        }
    }

    /// First keys of the commands the active mode recognizes.
    pub fn commands(&self) -> Vec<KeyInput> {
        match self.mode {
            ModeKind::Normal => self.normal.commands(),
            ModeKind::Visual(_) => self.visual.commands(),
            ModeKind::Insert => self.insert.commands(),
            ModeKind::Replace | ModeKind::Command => {
                vec![KeyInput::escape(), KeyInput::enter(), KeyInput::backspace()]
            }
        }
    }

    /// Whether the active mode would handle `key`. Keys it would not
    /// handle should go to the host's default key handling.
    pub fn can_process<H: Host>(&self, host: &mut H, key: KeyInput) -> bool {
        match self.mode {
            ModeKind::Normal => self.normal.can_process(host, key),
            ModeKind::Insert => self.insert.can_process(key),
            ModeKind::Replace => self.replace.can_process(key),
            ModeKind::Visual(_) => self.visual.can_process(key),
            ModeKind::Command => self.command_line.can_process(key),
        }
    }

    /// Feed one key to the active mode and carry out the mode switch it
    /// asks for.
    pub fn process<H: Host>(&mut self, host: &mut H, key: KeyInput) -> ProcessResult {
        tracing::trace!(target: "vim.key", mode = %self.mode, %key, "process");
        let ctx = &mut self.ctx;
        let result = match self.mode {
            ModeKind::Normal => self.normal.process(ctx, host, key),
            ModeKind::Insert => self.insert.process(ctx, host, key),
            ModeKind::Replace => self.replace.process(ctx, host, key),
            ModeKind::Visual(_) => self.visual.process(ctx, host, key),
            ModeKind::Command => self.command_line.process(ctx, host, key),
        };
        match result {
            ProcessResult::SwitchMode(kind) => self.switch_mode(host, kind),
            ProcessResult::SwitchPreviousMode => {
                let target = self.previous_target();
                self.switch_mode(host, target);
            }
            _ => {}
        }
        result
    }

    /// Parse Vim key notation and process every key. Returns the result of
    /// the last key.
    pub fn process_notation<H: Host>(&mut self, host: &mut H, notation: &str) -> Result<ProcessResult, VimError> {
        let mut result = ProcessResult::Processed;
        for key in KeyInput::parse(notation)? {
            result = self.process(host, key);
        }
        Ok(result)
    }

    /// The mode `SwitchPreviousMode` returns to. Visual and command-line
    /// mode never return to each other: they fall back to normal mode.
    fn previous_target(&self) -> ModeKind {
        match self.previous {
            Some(ModeKind::Visual(_) | ModeKind::Command) | None => ModeKind::Normal,
            Some(mode) => mode,
        }
    }

    /// Leave the active mode and enter `kind`. Switching between visual
    /// kinds keeps the selection and the previous mode.
    pub fn switch_mode<H: Host>(&mut self, host: &mut H, kind: ModeKind) {
        if kind == self.mode {
            return;
        }
        if let (ModeKind::Visual(_), ModeKind::Visual(new)) = (self.mode, kind) {
            tracing::debug!(target: "vim.mode", from = %self.mode, to = %kind, "visual kind");
            self.visual.set_kind(host, new);
            self.mode = kind;
            return;
        }
        tracing::debug!(target: "vim.mode", from = %self.mode, to = %kind, "switch");
        let from = self.mode;
        match from {
            ModeKind::Normal => self.normal.on_leave(),
            ModeKind::Insert => self.insert.on_leave(&mut self.ctx, host),
            ModeKind::Replace => self.replace.on_leave(&mut self.ctx, host),
            ModeKind::Visual(_) => self.visual.on_leave(&mut self.ctx, host),
            ModeKind::Command => self.command_line.on_leave(),
        }
        self.previous = Some(from);
        self.mode = kind;
        match kind {
            ModeKind::Normal => self.normal.on_enter(host),
            ModeKind::Insert => self.insert.on_enter(&mut self.ctx, host),
            ModeKind::Replace => self.replace.on_enter(&mut self.ctx, host),
            ModeKind::Visual(visual) => self.visual.on_enter(host, visual),
            ModeKind::Command => self.command_line.on_enter(from),
        }
    }

    /// Tell the engine the host's selection changed.
    ///
    /// Changes caused by visual-mode movements are ignored. Anything else
    /// queues at most one [`DeferredTask`] of each kind; the host runs them
    /// with [`Engine::run_deferred`] once its own edit is complete.
    pub fn on_selection_changed<H: Host>(&mut self, host: &mut H) {
        let selected = has_selection(host.selection());
        let task = match self.mode {
            ModeKind::Visual(_) => {
                if self.visual.take_explicit_move() {
                    return;
                }
                if selected {
                    self.visual.sync_from_host(&*host);
                    return;
                }
                DeferredTask::LeaveVisual
            }
            ModeKind::Normal | ModeKind::Insert | ModeKind::Replace if selected => DeferredTask::EnterVisual,
            _ => return,
        };
        if !self.deferred.contains(&task) {
            tracing::trace!(target: "vim.deferred", ?task, "queued");
            self.deferred.push_back(task);
        }
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Run the queued selection tasks. Each task checks again that it
    /// still applies; stale tasks are dropped. Returns how many ran.
    pub fn run_deferred<H: Host>(&mut self, host: &mut H) -> usize {
        let mut ran = 0;
        while let Some(task) = self.deferred.pop_front() {
            let selection = host.selection();
            let selected = has_selection(selection);
            match task {
                DeferredTask::EnterVisual
                    if selected && matches!(self.mode, ModeKind::Normal | ModeKind::Insert | ModeKind::Replace) =>
                {
                    let kind = selection.map_or(VisualKind::Character, |s| s.kind);
                    self.switch_mode(host, ModeKind::Visual(kind));
                }
                DeferredTask::LeaveVisual if !selected && self.mode.is_visual() => {
                    let target = self.previous_target();
                    self.switch_mode(host, target);
                }
                _ => {
                    tracing::trace!(target: "vim.deferred", ?task, "stale");
                    continue;
                }
            }
            tracing::debug!(target: "vim.deferred", ?task, mode = %self.mode, "ran");
            ran += 1;
        }
        ran
    }
}

fn has_selection(selection: Option<Selection>) -> bool {
    selection.is_some_and(|s| s.start != s.end)
}
