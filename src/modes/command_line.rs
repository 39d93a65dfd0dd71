use crate::context::Context;
use crate::key::{KeyCode, KeyInput};
use crate::register::LAST_COMMAND_LINE;
use crate::traits::Host;
use crate::types::{ModeKind, Operation};

use super::ProcessResult;

/// Range prefix used when the command line is opened from visual mode.
const VISUAL_RANGE: &str = "'<,'>";

/// The `:` command line. The line is edited here; what it means is up to
/// the host, which receives it through [`Operation::ExecuteCommandLine`].
#[derive(Debug, Default, Clone)]
pub struct CommandLineMode {
    prefix: String,
    line: String,
}

impl CommandLineMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> ModeKind {
        ModeKind::Command
    }

    /// The command line as typed so far, including a visual range prefix.
    pub fn line(&self) -> String {
        format!("{}{}", self.prefix, self.line)
    }

    pub fn can_process(&self, key: KeyInput) -> bool {
        key.plain_char().is_some()
            || matches!(key.code(), KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Tab)
    }

    pub fn on_enter(&mut self, from: ModeKind) {
        self.line.clear();
        self.prefix.clear();
        if from.is_visual() {
            self.prefix.push_str(VISUAL_RANGE);
        }
    }

    pub fn on_leave(&mut self) {
        self.line.clear();
        self.prefix.clear();
    }

    pub fn process<H: Host>(&mut self, ctx: &mut Context, host: &mut H, key: KeyInput) -> ProcessResult {
        match key.code() {
            KeyCode::Esc => ProcessResult::SwitchPreviousMode,
            KeyCode::Enter => {
                let line = self.line();
                tracing::debug!(target: "vim.command_line", %line, "execute");
                ctx.registers.set_read_only(LAST_COMMAND_LINE, line.clone());
                host.apply(Operation::ExecuteCommandLine(line));
                ProcessResult::SwitchPreviousMode
            }
            KeyCode::Backspace => {
                if self.line.pop().is_none() {
                    ProcessResult::SwitchPreviousMode
                } else {
                    ProcessResult::Processed
                }
            }
            KeyCode::Tab => {
                self.line.push('\t');
                ProcessResult::Processed
            }
            _ => match key.plain_char() {
                Some(c) => {
                    self.line.push(c);
                    ProcessResult::Processed
                }
                None => ProcessResult::NotHandled,
            },
        }
    }
}
