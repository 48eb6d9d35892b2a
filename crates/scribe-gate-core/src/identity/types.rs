use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A session issued by the identity service.
///
/// Only `access_token` matters to the session adapter; the rest is kept so
/// the client can refresh and persist the session.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer credential attached to outgoing requests.
    pub access_token: String,
    /// Token type, always `bearer` for this service.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Expiry as unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// Token used to obtain a fresh session.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// The authenticated user.
    #[serde(default)]
    pub user: Option<User>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .finish()
    }
}

impl Session {
    /// Create a session holding only a bearer credential.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            expires_in: None,
            expires_at: None,
            refresh_token: None,
            user: None,
        }
    }

    /// True when the access token expires within `margin_secs` of `now`.
    ///
    /// Sessions without a known expiry never count as expiring.
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at
            .is_some_and(|at| at.saturating_sub(now) <= margin_secs)
    }

    /// True when the access token is already past its expiry.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_within(now, 0)
    }

    /// Fill in `expires_at` from `expires_in` when the service omitted it.
    pub(crate) fn with_expiry_from(mut self, now: i64) -> Self {
        if self.expires_at.is_none()
            && let Some(expires_in) = self.expires_in
        {
            self.expires_at = Some(now.saturating_add(expires_in));
        }
        self
    }
}

/// The user record returned by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Service-assigned user id.
    pub id: String,
    /// Primary e-mail address.
    #[serde(default)]
    pub email: Option<String>,
    /// Every other field, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a login or signup call.
///
/// Signup with e-mail confirmation enabled yields a user and no session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthPayload {
    /// The user the call was about.
    pub user: Option<User>,
    /// The session that was issued, if any.
    pub session: Option<Session>,
}
