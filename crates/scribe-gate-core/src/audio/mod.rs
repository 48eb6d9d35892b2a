pub(crate) mod capture;
mod engine;
pub(crate) mod recognizer;
pub(crate) mod resampler;

pub(crate) use {capture::MicCapture, engine::SttEngine, resampler::Resampler};

pub use recognizer::{AUDIO_CAPTURE, NO_SPEECH, TRANSCRIPTION_FAILED, WhisperRecognizer};
