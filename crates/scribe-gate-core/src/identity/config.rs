use crate::ConfigError;

use std::{fmt, panic::Location};

use error_location::ErrorLocation;
use secrecy::SecretString;
use url::Url;

/// Connection settings for the identity service.
///
/// Built once at startup and handed to the client; missing values are a
/// startup error, never a lazily discovered one.
#[derive(Clone)]
pub struct IdentityConfig {
    url: Url,
    public_key: SecretString,
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url.as_str())
            .field("public_key", &"[REDACTED]")
            .finish()
    }
}

impl IdentityConfig {
    /// Validate the service URL and public key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] when either value is absent or
    /// blank, and [`ConfigError::InvalidUrl`] when the URL does not parse.
    #[track_caller]
    pub fn new(url: Option<&str>, public_key: Option<&str>) -> Result<Self, ConfigError> {
        let url = url.map(str::trim).filter(|v| !v.is_empty()).ok_or(
            ConfigError::MissingValue {
                key: "identity.url",
                location: ErrorLocation::from(Location::caller()),
            },
        )?;

        let public_key = public_key
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingValue {
                key: "identity.public_key",
                location: ErrorLocation::from(Location::caller()),
            })?;

        let url = Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
            value: url.to_string(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self {
            url,
            public_key: SecretString::from(public_key.to_string()),
        })
    }

    /// Base URL of the service project.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Public (anonymous) API key.
    pub fn public_key(&self) -> &SecretString {
        &self.public_key
    }

    /// Absolute URL of an auth endpoint, e.g. `token?grant_type=password`.
    pub(crate) fn auth_endpoint(&self, path: &str) -> String {
        let base = self.url.as_str().trim_end_matches('/');
        format!("{}/auth/v1/{}", base, path.trim_start_matches('/'))
    }
}
