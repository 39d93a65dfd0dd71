use serde::{Deserialize, Serialize};

use crate::error::VimError;

/// Engine settings.
///
/// Storage belongs to the host; the engine only reads these values. Any
/// field missing from a serialized form falls back to its Vim default.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// First Escape in insert mode only dismisses an open completion popup.
    pub double_escape: bool,
    /// Searches wrap around the end of the buffer (`'wrapscan'`).
    pub wrap_scan: bool,
    /// `~` behaves like an operator (`'tildeop'`).
    pub tilde_op: bool,
    /// Yanks and deletes into the unnamed register also go to the clipboard.
    pub clipboard_unnamed: bool,
    /// Lines scrolled by `<C-d>`/`<C-u>` when no count is given; 0 means half
    /// a window, as decided by the host.
    pub scroll_lines: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            double_escape: false,
            wrap_scan: true,
            tilde_op: false,
            clipboard_unnamed: false,
            scroll_lines: 0,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, VimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, VimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
