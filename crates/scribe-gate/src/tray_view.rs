use crate::{PromptField, TrayCommand};

use scribe_gate_core::{ButtonFace, CaptureView};
use tao::event_loop::EventLoopProxy;
use tracing::debug;

/// The tray icon as the voice input button, the prompt as the text field.
///
/// Lives on the async runtime; button changes are forwarded to the main
/// thread, which owns the tray icon.
pub struct TrayView {
    prompt: PromptField,
    tray_proxy: EventLoopProxy<TrayCommand>,
}

impl TrayView {
    pub fn new(prompt: PromptField, tray_proxy: EventLoopProxy<TrayCommand>) -> Self {
        Self { prompt, tray_proxy }
    }

    /// Empty the prompt.
    pub fn clear_prompt(&mut self) {
        self.prompt.clear();
    }

    fn send(&self, command: TrayCommand) {
        if self.tray_proxy.send_event(command).is_err() {
            debug!(?command, "Event loop closed, tray command dropped");
        }
    }
}

impl CaptureView for TrayView {
    fn field_value(&self) -> String {
        self.prompt.value().to_string()
    }

    fn set_field_value(&mut self, value: String) {
        self.prompt.set(value);
    }

    fn render_button(&mut self, face: &ButtonFace) {
        self.send(TrayCommand::Render(*face));
    }

    fn hide_button(&mut self) {
        self.send(TrayCommand::Hide);
    }
}
