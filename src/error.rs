use thiserror::Error;

/// Errors surfaced to the host through [`StatusSink::on_error`].
///
/// None of these are fatal: the engine reports them, discards any pending
/// input and waits for the next key.
///
/// [`StatusSink::on_error`]: crate::traits::StatusSink::on_error
#[derive(Debug, Error)]
pub enum VimError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid motion: {0}")]
    InvalidMotion(String),

    #[error("Character not found: {0}")]
    FindCharNotFound(char),

    #[error("E20: Mark not set")]
    MarkNotSet(char),

    #[error("E191: Argument must be a letter or forward/backward quote: {0}")]
    InvalidMarkName(char),

    #[error("E354: Invalid register name: '{0}'")]
    InvalidRegister(char),

    #[error("E35: No previous regular expression")]
    NoPreviousPattern,

    #[error("E486: Pattern not found: {0}")]
    PatternNotFound(String),

    #[error("E353: Nothing in register {0}")]
    EmptyRegister(char),

    #[error("Cannot join lines: not enough lines")]
    CannotJoin,

    #[error("No previous change to repeat")]
    NothingToRepeat,

    #[error("Cannot repeat a repeat command recursively")]
    RecursiveRepeat,

    #[error("Not enough characters to replace")]
    NotEnoughCharacters,

    #[error("E1240: Resulting text too long")]
    TextTooLong,

    #[error("Invalid key notation: {0}")]
    InvalidKeyNotation(String),

    #[error("Invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}
