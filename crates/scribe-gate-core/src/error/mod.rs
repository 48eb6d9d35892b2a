use crate::session::Navigation;

use error_location::ErrorLocation;
use thiserror::Error;

/// Errors reported by the identity service client.
///
/// The session adapter hands these back to its callers exactly as the client
/// produced them.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The identity service answered with a non-success status.
    #[error("Identity service error ({status}): {message} {location}")]
    Api {
        /// HTTP status returned by the service.
        status: u16,
        /// Machine-readable error code, when the service sent one.
        code: Option<String>,
        /// Human-readable message from the service.
        message: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The identity service could not be reached.
    #[error("Identity service unreachable: {source} {location}")]
    Transport {
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The identity service answered with a body that could not be decoded.
    #[error("Unexpected identity service response: {reason} {location}")]
    InvalidResponse {
        /// Why the body was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Reading or writing the persisted session failed.
    #[error("Session store error: {reason} {location}")]
    SessionStore {
        /// Description of the store failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl AuthError {
    /// HTTP status sent by the identity service, if the error came from it.
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Api { status, .. } => Some(*status),
            AuthError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Error code sent by the identity service, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            AuthError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Errors from [`SessionAdapter::make_authenticated_request`](crate::SessionAdapter::make_authenticated_request).
#[derive(Error, Debug)]
pub enum RequestError {
    /// Querying the current session failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// No bearer credential was available; the request was not sent.
    #[error("No authentication token found or session expired {location}")]
    Unauthenticated {
        /// Where the user should be sent to authenticate.
        redirect: Navigation,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The server answered 401.
    #[error("Session expired. Please log in again. {location}")]
    SessionExpired {
        /// Where the user should be sent to authenticate.
        redirect: Navigation,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A caller-supplied header could not be encoded.
    #[error("Invalid header {name:?}: {reason} {location}")]
    InvalidHeader {
        /// Header name as supplied by the caller.
        name: String,
        /// Why it was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The outbound request itself failed.
    #[error("Request failed: {source} {location}")]
    Transport {
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl RequestError {
    /// The page the user should be sent to, for the two auth-guard failures.
    pub fn redirect(&self) -> Option<Navigation> {
        match self {
            RequestError::Unauthenticated { redirect, .. }
            | RequestError::SessionExpired { redirect, .. } => Some(*redirect),
            _ => None,
        }
    }
}

/// Startup configuration errors for the identity client.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required value was absent or blank.
    #[error("Missing required configuration value: {key} {location}")]
    MissingValue {
        /// Name of the missing setting.
        key: &'static str,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The service URL could not be parsed.
    #[error("Invalid identity service URL {value:?}: {source} {location}")]
    InvalidUrl {
        /// The rejected value.
        value: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {source} {location}")]
    HttpClient {
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Speech recognition errors with source location tracking.
#[derive(Error, Debug)]
pub enum VoiceError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Whisper model file not found at specified path.
    #[error("Model not found at path: {path:?} {location}")]
    ModelNotFound {
        /// Path to the missing model file.
        path: std::path::PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Transcription process failed.
    #[error("Transcription failed: {source} {location}")]
    TranscriptionFailed {
        /// Underlying error from whisper-rs.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio data captured or provided.
    #[error("No audio captured {location}")]
    NoAudioCaptured {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Start or stop was requested in a state that does not allow it.
    #[error("Invalid recognition state: {reason} {location}")]
    InvalidState {
        /// What was attempted.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`AuthError`].
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Result type alias using [`VoiceError`].
pub type VoiceResult<T> = std::result::Result<T, VoiceError>;
