/// Icon shown on the voice input button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonIcon {
    /// Ready to listen.
    Microphone,
    /// Listening; pressing stops.
    Stop,
}

/// Everything the button displays for one capture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonFace {
    /// Button label.
    pub label: &'static str,
    /// Button icon.
    pub icon: ButtonIcon,
    /// Whether the "recording" marker is shown.
    pub recording: bool,
}

impl ButtonFace {
    /// Shown while idle.
    pub const IDLE: ButtonFace = ButtonFace {
        label: "Voice Input",
        icon: ButtonIcon::Microphone,
        recording: false,
    };

    /// Shown while listening.
    pub const LISTENING: ButtonFace = ButtonFace {
        label: "Stop Recording",
        icon: ButtonIcon::Stop,
        recording: true,
    };
}

/// The text field and button a [`VoiceCapture`](crate::VoiceCapture) is bound to.
pub trait CaptureView {
    /// Current contents of the text field.
    fn field_value(&self) -> String;
    /// Replace the contents of the text field.
    fn set_field_value(&mut self, value: String);
    /// Redraw the button.
    fn render_button(&mut self, face: &ButtonFace);
    /// Hide the button for good.
    fn hide_button(&mut self);
}
