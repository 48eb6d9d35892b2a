use crate::{VoiceError, VoiceResult};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Whisper model wrapper.
pub(crate) struct SttEngine {
    ctx: WhisperContext,
}

impl SttEngine {
    #[track_caller]
    #[instrument(skip(model_path))]
    pub fn load<P: AsRef<Path>>(model_path: P, use_gpu: bool) -> VoiceResult<Self> {
        let path = model_path.as_ref();

        let path_str = path
            .exists()
            .then(|| path.to_str())
            .flatten()
            .ok_or(VoiceError::ModelNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let mut params = WhisperContextParameters::default();
        params.use_gpu(use_gpu);

        let ctx = WhisperContext::new_with_params(path_str, params).map_err(|e| {
            VoiceError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        info!(model_path = ?path, use_gpu, "Whisper model loaded");

        Ok(Self { ctx })
    }

    /// Transcribe 16 kHz mono samples in `language` (an ISO 639-1 code).
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn transcribe(&mut self, samples: &[f32], language: &str) -> VoiceResult<String> {
        if samples.is_empty() {
            return Err(VoiceError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(language));
        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_suppress_nst(true);
        // One utterance in, one transcript out.
        params.set_single_segment(true);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| VoiceError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        state
            .full(params, samples)
            .map_err(|e| VoiceError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let segment_count = state.full_n_segments();
        let text = (0..segment_count)
            .filter_map(|i| state.get_segment(i))
            .map(|segment| segment.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let transcript = text.split_whitespace().collect::<Vec<_>>().join(" ");

        debug!(
            sample_count = samples.len(),
            segment_count,
            text_len = transcript.len(),
            "Utterance transcribed"
        );

        Ok(transcript)
    }
}
