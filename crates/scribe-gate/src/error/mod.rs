use scribe_gate_core::{AuthError, ConfigError, RequestError, VoiceError};

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the scribe-gate binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Identity service error from scribe-gate-core.
    #[error("Identity error: {source} {location}")]
    Identity {
        /// The underlying identity error.
        #[source]
        source: AuthError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Authenticated request error from scribe-gate-core.
    #[error("Request error: {source} {location}")]
    Request {
        /// The underlying request error.
        #[source]
        source: RequestError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Identity service settings were missing or invalid; auth is disabled.
    #[error("Authentication disabled: {source} {location}")]
    IdentityConfig {
        /// The underlying validation error.
        #[source]
        source: ConfigError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The outbound HTTP client could not be built.
    #[error("HTTP client setup failed: {source} {location}")]
    HttpClient {
        /// The underlying build error.
        #[source]
        source: ConfigError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Speech recognition error from scribe-gate-core.
    #[error("Voice error: {source} {location}")]
    Voice {
        /// The underlying voice error.
        #[source]
        source: VoiceError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Reading an HTTP response failed.
    #[error("HTTP error: {source} {location}")]
    Http {
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A command needed a session and there was none.
    #[error("Not signed in. Run `scribe-gate login` first. {location}")]
    NotSignedIn {
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to register global hotkey.
    #[error("Hotkey registration failed: {reason} {location}")]
    HotkeyRegistrationFailed {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to build or update the tray icon.
    #[error("Tray error: {reason} {location}")]
    TrayError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to send message through async channel.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Logging could not be initialized.
    #[error("Logging setup failed: {reason} {location}")]
    LoggingError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

// Manual From impls with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<AuthError> for AppError {
    #[track_caller]
    fn from(source: AuthError) -> Self {
        AppError::Identity {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<RequestError> for AppError {
    #[track_caller]
    fn from(source: RequestError) -> Self {
        AppError::Request {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for AppError {
    #[track_caller]
    fn from(source: ConfigError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        match source {
            ConfigError::HttpClient { .. } => AppError::HttpClient { source, location },
            _ => AppError::IdentityConfig { source, location },
        }
    }
}

impl From<VoiceError> for AppError {
    #[track_caller]
    fn from(source: VoiceError) -> Self {
        AppError::Voice {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
