mod capture;
mod machine;
mod recognizer;
mod view;

pub use {
    capture::{VoiceCapture, append_transcript},
    machine::{CaptureEffect, CaptureEvent, CaptureMachine, CaptureState},
    recognizer::{
        DEFAULT_LANGUAGE, RecognitionAlternative, RecognitionEvent, RecognitionOptions,
        RecognitionResult, SpeechRecognizer,
    },
    view::{ButtonFace, ButtonIcon, CaptureView},
};
