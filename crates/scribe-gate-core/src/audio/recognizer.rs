use crate::{
    VoiceError, VoiceResult,
    audio::{MicCapture, Resampler, SttEngine, resampler::WHISPER_SAMPLE_RATE},
    voice::{RecognitionEvent, RecognitionOptions, RecognitionResult, SpeechRecognizer},
};

use std::{
    panic::Location,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
    },
    thread,
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Error code reported when the utterance held no recognizable speech.
pub const NO_SPEECH: &str = "no-speech";
/// Error code reported when the microphone could not be read.
pub const AUDIO_CAPTURE: &str = "audio-capture";
/// Error code reported when the model failed on the captured audio.
pub const TRANSCRIPTION_FAILED: &str = "transcription-failed";

/// Local speech recognizer: microphone in, Whisper transcript out.
///
/// `start` opens the microphone; `stop` closes it and transcribes the
/// utterance on a worker thread, so neither call blocks on the model. Events
/// arrive on the channel given to [`new`](Self::new) in the order
/// `Start`, then `Result` or `Error`, then `End`.
pub struct WhisperRecognizer {
    mic: MicCapture,
    engine: Arc<Mutex<SttEngine>>,
    events: Sender<RecognitionEvent>,
    language: String,
    // Set from stop() until the worker has sent End.
    transcribing: Arc<AtomicBool>,
}

impl WhisperRecognizer {
    /// Load the model and open the default microphone.
    ///
    /// # Errors
    ///
    /// Returns error if no input device exists or the model cannot be loaded.
    #[track_caller]
    #[instrument(skip(model_path, events))]
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        use_gpu: bool,
        events: Sender<RecognitionEvent>,
    ) -> VoiceResult<Self> {
        let mic = MicCapture::open_default()?;
        let engine = SttEngine::load(model_path, use_gpu)?;

        info!(sample_rate = mic.sample_rate(), "Whisper recognizer ready");

        Ok(Self {
            mic,
            engine: Arc::new(Mutex::new(engine)),
            events,
            language: whisper_language(crate::voice::DEFAULT_LANGUAGE),
            transcribing: Arc::new(AtomicBool::new(false)),
        })
    }

    fn emit(&self, event: RecognitionEvent) {
        if self.events.send(event).is_err() {
            debug!("Recognition event receiver dropped");
        }
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    #[track_caller]
    #[instrument(skip(self))]
    fn start(&mut self, options: &RecognitionOptions) -> VoiceResult<()> {
        if self.mic.is_open() {
            return Err(VoiceError::InvalidState {
                reason: "recognition already started".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.transcribing.load(Ordering::Acquire) {
            return Err(VoiceError::InvalidState {
                reason: "previous utterance still transcribing".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if options.continuous || options.interim_results {
            debug!("Continuous and interim results unsupported, capturing one utterance");
        }

        self.language = whisper_language(&options.language);
        self.mic.open_stream()?;
        self.emit(RecognitionEvent::Start);

        info!(language = %self.language, "Listening");

        Ok(())
    }

    #[instrument(skip(self))]
    fn stop(&mut self) -> VoiceResult<()> {
        if !self.mic.is_open() {
            return Ok(());
        }

        let samples = self.mic.close_stream();
        let input_rate = self.mic.sample_rate();
        let engine = Arc::clone(&self.engine);
        let events = self.events.clone();
        let language = self.language.clone();
        let transcribing = Arc::clone(&self.transcribing);

        info!(sample_count = samples.len(), "Stopped listening");

        self.transcribing.store(true, Ordering::Release);

        thread::Builder::new()
            .name("whisper-transcribe".to_string())
            .spawn(move || {
                let outcome = transcribe_utterance(&engine, &samples, input_rate, &language);
                let event = match outcome {
                    Ok(text) if text.is_empty() => RecognitionEvent::Error(NO_SPEECH.to_string()),
                    Ok(text) => RecognitionEvent::Result(vec![RecognitionResult::final_transcript(
                        text,
                    )]),
                    Err(e) => {
                        error!(error = ?e, "Utterance not recognized");
                        RecognitionEvent::Error(error_code(&e).to_string())
                    }
                };
                let _ = events.send(event);
                let _ = events.send(RecognitionEvent::End);
                transcribing.store(false, Ordering::Release);
            })
            .map_err(|e| {
                self.transcribing.store(false, Ordering::Release);
                VoiceError::DeviceError {
                    reason: format!("Failed to spawn transcription thread: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;

        Ok(())
    }
}

impl Drop for WhisperRecognizer {
    fn drop(&mut self) {
        if self.mic.is_open() {
            warn!("Recognizer dropped while listening, discarding audio");
            let _ = self.mic.close_stream();
        }
    }
}

fn transcribe_utterance(
    engine: &Mutex<SttEngine>,
    samples: &[f32],
    input_rate: u32,
    language: &str,
) -> VoiceResult<String> {
    if samples.is_empty() {
        return Err(VoiceError::NoAudioCaptured {
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let resampled = if input_rate == WHISPER_SAMPLE_RATE {
        samples.to_vec()
    } else {
        Resampler::to_whisper_rate(input_rate)?.process(samples)?
    };

    let start = std::time::Instant::now();
    let text = engine
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .transcribe(&resampled, language)?;

    info!(
        duration_ms = start.elapsed().as_millis(),
        text_len = text.len(),
        "Transcription complete"
    );

    Ok(text)
}

/// Map a failure to the error code a recognizer reports for it.
pub(crate) fn error_code(error: &VoiceError) -> &'static str {
    match error {
        VoiceError::NoAudioCaptured { .. } => NO_SPEECH,
        VoiceError::NoMicrophoneFound { .. } | VoiceError::DeviceError { .. } => AUDIO_CAPTURE,
        _ => TRANSCRIPTION_FAILED,
    }
}

/// Whisper takes the primary subtag of a BCP 47 tag: `en-US` becomes `en`.
pub(crate) fn whisper_language(tag: &str) -> String {
    let primary = tag.split(['-', '_']).next().unwrap_or_default().trim();
    if primary.is_empty() {
        "en".to_string()
    } else {
        primary.to_ascii_lowercase()
    }
}
