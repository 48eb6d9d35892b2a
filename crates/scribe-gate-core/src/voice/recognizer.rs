use crate::VoiceResult;

/// Recognition language used unless configured otherwise.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Settings for one recognition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    /// BCP 47 language tag, e.g. `en-US`.
    pub language: String,
    /// Keep listening after the first utterance.
    pub continuous: bool,
    /// Deliver partial transcripts while the user is still speaking.
    pub interim_results: bool,
}

impl RecognitionOptions {
    /// Single utterance, final results only.
    pub fn single_utterance(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            continuous: false,
            interim_results: false,
        }
    }
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self::single_utterance(DEFAULT_LANGUAGE)
    }
}

/// One candidate transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionAlternative {
    /// Recognized text.
    pub transcript: String,
    /// Engine confidence in `0.0..=1.0`, when it reports one.
    pub confidence: Option<f32>,
}

/// A recognition result: candidate transcripts, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    /// Candidates ordered by likelihood.
    pub alternatives: Vec<RecognitionAlternative>,
    /// Whether the engine will revise this result.
    pub is_final: bool,
}

impl RecognitionResult {
    /// A final result with a single candidate.
    pub fn final_transcript(transcript: impl Into<String>) -> Self {
        Self {
            alternatives: vec![RecognitionAlternative {
                transcript: transcript.into(),
                confidence: None,
            }],
            is_final: true,
        }
    }

    /// The most likely transcript.
    pub fn best_transcript(&self) -> Option<&str> {
        self.alternatives.first().map(|a| a.transcript.as_str())
    }
}

/// Lifecycle events emitted by a speech recognizer.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// The engine started listening.
    Start,
    /// The engine recognized speech.
    Result(Vec<RecognitionResult>),
    /// The session ended.
    End,
    /// The session failed; carries the engine's error code (e.g. `no-speech`).
    Error(String),
}

/// A speech-to-text engine.
///
/// Lifecycle events are not returned from these calls; implementations
/// deliver them asynchronously through whatever channel they were built with.
pub trait SpeechRecognizer {
    /// Begin a recognition session.
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot start, including when a session is
    /// already running.
    fn start(&mut self, options: &RecognitionOptions) -> VoiceResult<()>;

    /// Stop listening and deliver whatever was recognized so far.
    ///
    /// Stopping an engine that is not listening is a no-op.
    ///
    /// # Errors
    ///
    /// Returns error if the engine fails to stop.
    fn stop(&mut self) -> VoiceResult<()>;
}
