use crate::{VoiceError, VoiceResult};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// Upper bound on buffered mono samples: five minutes at 48 kHz (~58MB).
///
/// An utterance longer than this keeps only its most recent five minutes.
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

/// Microphone capture into a bounded mono ring buffer.
pub(crate) struct MicCapture {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Set before the stream is dropped so a late callback writes nothing.
    closed: Arc<AtomicBool>,
}

impl MicCapture {
    /// Open the default input device.
    #[track_caller]
    #[instrument]
    pub fn open_default() -> VoiceResult<Self> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or(VoiceError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| VoiceError::DeviceError {
                reason: format!("Failed to get input config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "Microphone opened"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            samples: Arc::new(Mutex::new(VecDeque::new())),
            closed: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Whether a stream is currently open.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Device sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Start streaming into a fresh buffer.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn open_stream(&mut self) -> VoiceResult<()> {
        self.samples
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.closed.store(false, Ordering::Release);

        let samples = Arc::clone(&self.samples);
        let closed = Arc::clone(&self.closed);
        let channels = usize::from(self.config.channels.max(1));

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if closed.load(Ordering::Acquire) {
                        return;
                    }
                    let mut buf = samples.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    push_frames(&mut buf, data, channels);
                },
                |err| {
                    error!("Input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| VoiceError::DeviceError {
                reason: format!("Failed to build input stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| VoiceError::DeviceError {
            reason: format!("Failed to start input stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.stream = Some(stream);
        debug!(channels, "Input stream open");

        Ok(())
    }

    /// Close the stream and take everything captured since it was opened.
    #[instrument(skip(self))]
    pub fn close_stream(&mut self) -> Vec<f32> {
        self.closed.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            // Let a callback that raced the flag finish before draining.
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        let samples: Vec<f32> = self
            .samples
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();

        debug!(sample_count = samples.len(), "Input stream closed");

        samples
    }
}

/// Downmix interleaved frames to mono and append them, dropping the oldest
/// samples once the buffer is full.
pub(crate) fn push_frames(buf: &mut VecDeque<f32>, data: &[f32], channels: usize) {
    if channels <= 1 {
        buf.extend(data.iter().copied());
    } else {
        buf.extend(
            data.chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32),
        );
    }

    let excess = buf.len().saturating_sub(MAX_BUFFER_SAMPLES);
    if excess > 0 {
        buf.drain(..excess);
    }
}
