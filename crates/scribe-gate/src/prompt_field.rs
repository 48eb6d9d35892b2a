//! The dictation prompt: the text field voice input appends to.
//!
//! The desktop host has no text box, so the prompt lives in memory and is
//! mirrored to the clipboard for pasting wherever the user needs it.

use arboard::Clipboard;
use tracing::{debug, info, instrument, warn};

/// Prompt buffer, optionally mirrored to the system clipboard.
pub struct PromptField {
    value: String,
    clipboard: Option<Clipboard>,
}

impl PromptField {
    /// Create an empty prompt. With `mirror_to_clipboard`, a clipboard that
    /// cannot be opened is logged and mirroring is skipped.
    #[instrument]
    pub fn new(mirror_to_clipboard: bool) -> Self {
        let clipboard = if mirror_to_clipboard {
            match Clipboard::new() {
                Ok(clipboard) => Some(clipboard),
                Err(e) => {
                    warn!(error = %e, "Clipboard unavailable, prompt will not be mirrored");
                    None
                }
            }
        } else {
            None
        };

        info!(mirrored = clipboard.is_some(), "Prompt field ready");

        Self {
            value: String::new(),
            clipboard,
        }
    }

    /// Current prompt text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the prompt is copied to the clipboard on every change.
    pub fn is_mirrored(&self) -> bool {
        self.clipboard.is_some()
    }

    /// Replace the prompt text.
    #[instrument(skip(self, value))]
    pub fn set(&mut self, value: String) {
        self.value = value;
        self.mirror();
    }

    /// Empty the prompt.
    pub fn clear(&mut self) {
        self.set(String::new());
    }

    fn mirror(&mut self) {
        let Some(clipboard) = self.clipboard.as_mut() else {
            return;
        };

        match clipboard.set_text(self.value.as_str()) {
            Ok(()) => debug!(text_len = self.value.len(), "Prompt copied to clipboard"),
            Err(e) => warn!(error = %e, "Failed to copy prompt to clipboard"),
        }
    }
}
