//! Scribe Gate Core Library
//!
//! Session handling against a GoTrue identity service, authenticated HTTP
//! requests with redirect-on-failure, and voice capture into a text field
//! backed by a local Whisper recognizer.
//!
//! # Example
//!
//! ```no_run
//! use scribe_gate_core::{
//!     GoTrueClient, IdentityConfig, MemorySessionStore, Navigation, Navigator,
//!     RequestOptions, SessionAdapter,
//! };
//!
//! struct Print;
//!
//! impl Navigator for Print {
//!     fn navigate(&self, target: Navigation) {
//!         println!("navigate to {}", target.path());
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IdentityConfig::new(Some("https://project.supabase.co"), Some("public-key"))?;
//! let identity = GoTrueClient::new(config, MemorySessionStore::default())?;
//! let session = SessionAdapter::new(identity, Print)?;
//!
//! let response = session
//!     .make_authenticated_request("https://api.example.com/notes", RequestOptions::default())
//!     .await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

mod audio;
mod error;
mod identity;
mod session;
mod voice;

pub use {
    audio::{AUDIO_CAPTURE, NO_SPEECH, TRANSCRIPTION_FAILED, WhisperRecognizer},
    error::{AuthError, AuthResult, ConfigError, RequestError, VoiceError, VoiceResult},
    identity::{
        APP_USER_AGENT, AuthPayload, FileSessionStore, GoTrueClient, IdentityConfig,
        IdentityService, MemorySessionStore, Session, SessionStore, User,
    },
    session::{Navigation, Navigator, RequestOptions, SessionAdapter},
    voice::{
        ButtonFace, ButtonIcon, CaptureEffect, CaptureEvent, CaptureMachine, CaptureState,
        CaptureView, DEFAULT_LANGUAGE, RecognitionAlternative, RecognitionEvent,
        RecognitionOptions, RecognitionResult, SpeechRecognizer, VoiceCapture,
        append_transcript,
    },
};
