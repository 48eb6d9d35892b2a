//! Voice capture state machine.
//!
//! Pure: it consumes clicks and recognizer events and returns the effects to
//! carry out, so it can be driven by any event loop or by tests.

use crate::voice::{ButtonFace, RecognitionEvent};

/// Voice capture states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No recognizer available. Terminal.
    Unsupported,
    /// Not listening.
    Idle,
    /// A recognition session is running.
    Listening,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    /// The voice input button was pressed.
    Click,
    /// The recognizer reported a lifecycle event.
    Recognition(RecognitionEvent),
}

/// Work the driver performs after a transition, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEffect {
    /// Ask the recognizer to start.
    StartRecognition,
    /// Ask the recognizer to stop.
    StopRecognition,
    /// Redraw the button.
    Render(ButtonFace),
    /// Append a transcript to the text field.
    Append(String),
}

/// Tracks whether a recognition session is running.
#[derive(Debug, Clone)]
pub struct CaptureMachine {
    state: CaptureState,
}

impl CaptureMachine {
    /// Start `Idle` when a recognizer exists, `Unsupported` otherwise.
    pub fn new(supported: bool) -> Self {
        let state = if supported {
            CaptureState::Idle
        } else {
            CaptureState::Unsupported
        };
        Self { state }
    }

    /// Current state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Apply one event and return the resulting effects.
    ///
    /// Results are accepted whether or not the machine is listening, because
    /// the recognizer delivers the final transcript after a stop request.
    pub fn transition(&mut self, event: CaptureEvent) -> Vec<CaptureEffect> {
        use CaptureEffect::*;
        use CaptureState::*;

        match (self.state, event) {
            (Unsupported, _) => Vec::new(),

            (Idle, CaptureEvent::Click) => {
                self.state = Listening;
                // Render first so a rejected start is rendered idle last.
                vec![Render(ButtonFace::LISTENING), StartRecognition]
            }
            (Listening, CaptureEvent::Click) => {
                self.state = Idle;
                vec![Render(ButtonFace::IDLE), StopRecognition]
            }

            (_, CaptureEvent::Recognition(RecognitionEvent::Result(results))) => results
                .first()
                .and_then(|r| r.best_transcript())
                .filter(|t| !t.is_empty())
                .map(|t| vec![Append(t.to_string())])
                .unwrap_or_default(),

            (Idle, CaptureEvent::Recognition(RecognitionEvent::Start)) => {
                self.state = Listening;
                vec![Render(ButtonFace::LISTENING)]
            }
            (Listening, CaptureEvent::Recognition(RecognitionEvent::Start)) => Vec::new(),

            (
                Listening,
                CaptureEvent::Recognition(RecognitionEvent::End | RecognitionEvent::Error(_)),
            ) => {
                self.state = Idle;
                vec![Render(ButtonFace::IDLE)]
            }
            (Idle, CaptureEvent::Recognition(RecognitionEvent::End | RecognitionEvent::Error(_))) => {
                Vec::new()
            }
        }
    }
}
