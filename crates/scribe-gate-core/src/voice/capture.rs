use crate::voice::{
    ButtonFace, CaptureEffect, CaptureEvent, CaptureMachine, CaptureState, CaptureView,
    RecognitionEvent, RecognitionOptions, SpeechRecognizer,
};

use tracing::{debug, error, info, instrument, warn};

/// Binds a text field and a button to a speech recognizer.
///
/// Clicks toggle recognition; recognized transcripts are appended to the
/// field. The driver feeds recognizer events in through [`handle`](Self::handle)
/// one at a time, so no locking is involved.
pub struct VoiceCapture<V, R> {
    view: V,
    recognizer: Option<R>,
    machine: CaptureMachine,
    options: RecognitionOptions,
}

impl<V: CaptureView, R: SpeechRecognizer> VoiceCapture<V, R> {
    /// Bind `view` to `recognizer`.
    ///
    /// Without a recognizer the button is hidden and clicks are ignored.
    #[instrument(skip(view, recognizer))]
    pub fn new(mut view: V, recognizer: Option<R>, options: RecognitionOptions) -> Self {
        let machine = CaptureMachine::new(recognizer.is_some());

        if recognizer.is_some() {
            view.render_button(&ButtonFace::IDLE);
            info!(language = %options.language, "Voice capture ready");
        } else {
            warn!("Speech recognition not supported, hiding voice input button");
            view.hide_button();
        }

        Self {
            view,
            recognizer,
            machine,
            options,
        }
    }

    /// Current capture state.
    pub fn state(&self) -> CaptureState {
        self.machine.state()
    }

    /// Whether a recognition session is running.
    pub fn is_listening(&self) -> bool {
        self.machine.state() == CaptureState::Listening
    }

    /// The bound view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// The bound view, mutably.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Recognition settings fixed at construction.
    pub fn options(&self) -> &RecognitionOptions {
        &self.options
    }

    /// The voice input button was pressed.
    pub fn click(&mut self) {
        self.dispatch(CaptureEvent::Click);
    }

    /// Feed a recognizer lifecycle event.
    pub fn handle(&mut self, event: RecognitionEvent) {
        if let RecognitionEvent::Error(code) = &event {
            error!(error = %code, "Speech recognition error");
        }
        self.dispatch(CaptureEvent::Recognition(event));
    }

    fn dispatch(&mut self, event: CaptureEvent) {
        let before = self.machine.state();
        let effects = self.machine.transition(event);
        let after = self.machine.state();

        if before != after {
            debug!(from = ?before, to = ?after, "Voice capture state changed");
        }

        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: CaptureEffect) {
        match effect {
            CaptureEffect::Render(face) => self.view.render_button(&face),
            CaptureEffect::Append(transcript) => {
                let value = append_transcript(&self.view.field_value(), &transcript);
                self.view.set_field_value(value);
                debug!(text_len = transcript.len(), "Transcript appended");
            }
            CaptureEffect::StartRecognition => {
                let result = match self.recognizer.as_mut() {
                    Some(recognizer) => recognizer.start(&self.options),
                    None => return,
                };
                if let Err(e) = result {
                    self.handle(RecognitionEvent::Error(e.to_string()));
                }
            }
            CaptureEffect::StopRecognition => {
                let result = match self.recognizer.as_mut() {
                    Some(recognizer) => recognizer.stop(),
                    None => return,
                };
                if let Err(e) = result {
                    self.handle(RecognitionEvent::Error(e.to_string()));
                }
            }
        }
    }
}

/// Append `transcript` to `current`, separated by one space unless `current`
/// is empty.
pub fn append_transcript(current: &str, transcript: &str) -> String {
    if current.is_empty() {
        transcript.to_string()
    } else {
        format!("{} {}", current, transcript)
    }
}
