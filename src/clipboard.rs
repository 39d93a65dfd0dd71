//! System clipboard for the `+` and `*` registers.

use crate::traits::Clipboard;

/// The desktop clipboard, through `arboard`.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    /// Connect to the system clipboard; `None` where there is none (a
    /// headless session, for instance).
    pub fn new() -> Option<Self> {
        match arboard::Clipboard::new() {
            Ok(inner) => Some(Self { inner }),
            Err(err) => {
                tracing::warn!(target: "vim.clipboard", %err, "system clipboard unavailable");
                None
            }
        }
    }
}

impl Clipboard for SystemClipboard {
    fn get(&mut self) -> Option<String> {
        self.inner.get_text().ok()
    }

    fn set(&mut self, text: String) {
        if let Err(err) = self.inner.set_text(text) {
            tracing::warn!(target: "vim.clipboard", %err, "clipboard write failed");
        }
    }
}
