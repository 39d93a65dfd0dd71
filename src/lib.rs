pub mod change;
#[cfg(feature = "clipboard")]
pub mod clipboard;
pub mod command;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod key;
pub mod marks;
pub mod modes;
pub mod motion;
pub mod register;
pub mod runner;
pub mod traits;
pub mod types;
mod word;

pub use crate::change::{ChangeTracker, RepeatableChange, TextEdit};
pub use crate::command::{Command, CommandFlags, CommandTable};
pub use crate::config::Settings;
pub use crate::context::Context;
pub use crate::engine::{DeferredTask, Engine, EngineBuilder, EngineSnapshot};
pub use crate::error::VimError;
pub use crate::key::{KeyCode, KeyInput, KeyInputSet, Modifiers};
pub use crate::modes::ProcessResult;
pub use crate::motion::{Motion, MotionData, MotionResult};
pub use crate::register::{RegisterKind, RegisterMap, RegisterValue};
pub use crate::runner::{CommandRunner, Invocation, Recognized, RunResult};
pub use crate::traits::{
    Clipboard, DisplayWindowBroker, Host, IncrementalSearch, Operations, SearchStep, StatusSink, TextOps,
};
pub use crate::types::{
    Direction, ModeKind, MotionKind, Operation, OperationKind, Position, Range, ScrollKind, Selection,
    ShiftDirection, TabTarget, VisualKind,
};
