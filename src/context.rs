use crate::change::ChangeTracker;
use crate::config::Settings;
use crate::error::VimError;
use crate::marks::MarkMap;
use crate::motion::{self, CharSearch, Motion, MotionContext, MotionData, MotionResult, OperatorContext, SearchState};
use crate::register::{RegisterKind, RegisterMap, RegisterOperation, RegisterValue};
use crate::traits::TextOps;
use crate::types::Position;

/// How the text of the next insert or replace session is repeated when it
/// ends (`3ifoo<Esc>`, `2ofoo<Esc>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TextRepeat {
    pub count: u32,
    /// Each repetition goes on a new line of its own (`o`, `O`).
    pub new_line: bool,
}

impl Default for TextRepeat {
    fn default() -> Self {
        Self {
            count: 1,
            new_line: false,
        }
    }
}

/// Per-session state shared by every mode.
#[derive(Debug, Default)]
pub struct Context {
    pub registers: RegisterMap,
    pub changes: ChangeTracker,
    pub marks: MarkMap,
    pub settings: Settings,
    pub last_search: Option<SearchState>,
    pub last_char_search: Option<CharSearch>,
    pub(crate) text_repeat: TextRepeat,
}

impl Context {
    pub fn new(settings: Settings) -> Self {
        let mut registers = RegisterMap::new();
        registers.set_clipboard_unnamed(settings.clipboard_unnamed);
        Self {
            registers,
            settings,
            ..Self::default()
        }
    }

    pub(crate) fn motion_context(
        &self,
        operator: OperatorContext,
        preferred_col: Option<u32>,
    ) -> MotionContext<'_> {
        MotionContext {
            operator,
            char_search: self.last_char_search,
            last_search: self.last_search.as_ref(),
            marks: &self.marks,
            wrap_scan: self.settings.wrap_scan,
            preferred_col,
        }
    }

    pub(crate) fn evaluate_motion<T: TextOps + ?Sized>(
        &self,
        text: &T,
        cursor: Position,
        motion: Motion,
        count: Option<u32>,
        operator: OperatorContext,
        preferred_col: Option<u32>,
    ) -> Result<MotionData, VimError> {
        let ctx = self.motion_context(operator, preferred_col);
        match motion::evaluate(text, cursor, motion, count, &ctx) {
            MotionResult::Complete(data) => Ok(data),
            MotionResult::Invalid(err) => Err(err),
            MotionResult::NeedMoreInput => Err(VimError::InvalidMotion(format!("{motion:?}"))),
        }
    }

    /// Keep the search and `f` state a motion produced.
    pub(crate) fn remember_motion(&mut self, data: &MotionData) {
        if let Some(search) = data.new_char_search {
            self.last_char_search = Some(search);
        }
        if let Some(search) = &data.new_search {
            self.set_last_search(search.clone());
        }
    }

    pub(crate) fn set_last_search(&mut self, search: SearchState) {
        self.registers
            .set_read_only(crate::register::LAST_SEARCH, search.pattern.clone());
        self.last_search = Some(search);
    }

    /// Store yanked or deleted text; read-only registers reject writes.
    pub(crate) fn store_register(
        &mut self,
        register: Option<char>,
        text: String,
        kind: RegisterKind,
        op: RegisterOperation,
    ) -> Result<(), VimError> {
        if let Some(name) = register
            && RegisterMap::is_read_only(name)
        {
            return Err(VimError::InvalidRegister(name));
        }
        self.registers.store(register, RegisterValue::new(text, kind), op);
        Ok(())
    }

    /// The register a put reads from.
    pub(crate) fn read_register(&mut self, register: Option<char>) -> Result<RegisterValue, VimError> {
        let name = register.unwrap_or(crate::register::UNNAMED);
        let value = match register {
            None => self.registers.unnamed(),
            Some(name) => self.registers.get(name),
        };
        value
            .filter(|value| !value.is_empty())
            .ok_or(VimError::EmptyRegister(name))
    }
}
