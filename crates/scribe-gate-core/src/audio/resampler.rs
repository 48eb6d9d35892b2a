use crate::{VoiceError, VoiceResult};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

/// Sample rate Whisper expects.
pub(crate) const WHISPER_SAMPLE_RATE: u32 = 16_000;

const CHUNK_FRAMES: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Mono FFT resampler from the device rate to [`WHISPER_SAMPLE_RATE`].
pub(crate) struct Resampler {
    inner: Fft<f32>,
    ratio: f64,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub fn to_whisper_rate(input_rate: u32) -> VoiceResult<Self> {
        let inner = Fft::<f32>::new(
            input_rate as usize,
            WHISPER_SAMPLE_RATE as usize,
            CHUNK_FRAMES,
            SUB_CHUNKS,
            1,
            FixedSync::Input,
        )
        .map_err(|e| VoiceError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self {
            inner,
            ratio: f64::from(WHISPER_SAMPLE_RATE) / f64::from(input_rate),
        })
    }

    /// Resample a whole utterance. The final partial chunk is zero-padded
    /// and the output trimmed back to the expected length.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn process(&mut self, samples: &[f32]) -> VoiceResult<Vec<f32>> {
        let expected_len = (samples.len() as f64 * self.ratio) as usize;
        let mut output = Vec::with_capacity(expected_len);

        let max_out = self.inner.output_frames_max();
        let mut out_chunk = vec![0.0f32; max_out];
        let mut in_chunk = vec![0.0f32; CHUNK_FRAMES];

        for chunk in samples.chunks(CHUNK_FRAMES) {
            in_chunk[..chunk.len()].copy_from_slice(chunk);
            in_chunk[chunk.len()..].fill(0.0);

            let written = {
                let input = InterleavedSlice::new(&in_chunk, 1, CHUNK_FRAMES).map_err(|e| {
                    VoiceError::ResamplingError {
                        reason: format!("Failed to wrap input chunk: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    }
                })?;

                let mut out = InterleavedSlice::new_mut(&mut out_chunk, 1, max_out).map_err(|e| {
                    VoiceError::ResamplingError {
                        reason: format!("Failed to wrap output chunk: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    }
                })?;

                let (_consumed, written) = self
                    .inner
                    .process_into_buffer(&input, &mut out, None)
                    .map_err(|e| VoiceError::ResamplingError {
                        reason: format!("Resampling failed: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

                written
            };

            output.extend_from_slice(&out_chunk[..written]);
        }

        output.truncate(expected_len);

        debug!(
            input_len = samples.len(),
            output_len = output.len(),
            "Utterance resampled"
        );

        Ok(output)
    }
}
