//! Client for the Supabase Auth (GoTrue) REST API.
//!
//! Covers exactly what the session adapter needs: password sign in, sign up,
//! sign out and reading the current session, refreshing it when it is about
//! to expire.

use crate::{
    AuthError, AuthPayload, AuthResult, ConfigError, IdentityConfig, IdentityService, Session,
    SessionStore, User,
};

use std::panic::Location;

use async_trait::async_trait;
use chrono::Utc;
use error_location::ErrorLocation;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

/// User agent sent with every identity request.
pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Sessions expiring within this many seconds are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 90;

/// Maximum number of error body characters kept in an error message.
const MAX_ERROR_CHARS: usize = 200;

/// Identity service client backed by a [`SessionStore`].
pub struct GoTrueClient<S> {
    config: IdentityConfig,
    http: Client,
    store: S,
}

impl<S: SessionStore> GoTrueClient<S> {
    /// Create a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    #[track_caller]
    pub fn new(config: IdentityConfig, store: S) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|source| ConfigError::HttpClient {
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(url = %config.url(), "Identity client initialized");

        Ok(Self {
            config,
            http,
            store,
        })
    }

    /// The store holding the current session.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// POST to an auth endpoint with the project key, and the user's token
    /// when one is given.
    fn post(&self, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let key = self.config.public_key().expose_secret();
        self.http
            .post(self.config.auth_endpoint(path))
            .header("apikey", key)
            .bearer_auth(bearer.unwrap_or(key))
    }

    /// Send a request and decode the JSON body. Empty bodies yield `None`.
    async fn send(&self, request: RequestBuilder) -> AuthResult<Option<Value>> {
        let response = request.send().await.map_err(|source| AuthError::Transport {
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| AuthError::Transport {
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| AuthError::InvalidResponse {
                reason: format!("Failed to decode response: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<Session> {
        let request = self
            .post("token?grant_type=refresh_token", None)
            .json(&json!({ "refresh_token": refresh_token }));

        let refreshed = match self.send(request).await {
            Ok(value) => session_from(value),
            Err(e) => Err(e),
        };

        match refreshed {
            Ok(session) => {
                self.store.save(&session)?;
                debug!(expires_at = ?session.expires_at, "Session refreshed");
                Ok(session)
            }
            Err(e) => {
                // The service rejected the refresh token itself: the session is gone.
                if e.status().is_some_and(|s| (400..500).contains(&s)) {
                    warn!(error = %e, "Refresh token rejected, clearing session");
                    self.store.clear()?;
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<S: SessionStore> IdentityService for GoTrueClient<S> {
    #[instrument(skip(self))]
    async fn get_session(&self) -> AuthResult<Option<Session>> {
        let Some(session) = self.store.load()? else {
            return Ok(None);
        };

        let now = Utc::now().timestamp();
        if !session.expires_within(now, EXPIRY_MARGIN_SECS) {
            return Ok(Some(session));
        }

        match session.refresh_token.as_deref().filter(|t| !t.is_empty()) {
            Some(refresh_token) => self.refresh(refresh_token).await.map(Some),
            None if session.is_expired(now) => {
                debug!("Stored session expired without a refresh token");
                self.store.clear()?;
                Ok(None)
            }
            None => Ok(Some(session)),
        }
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> AuthResult<AuthPayload> {
        let request = self.post("token?grant_type=password", None).json(&json!({
            "email": email,
            "password": password.expose_secret(),
        }));

        let session = session_from(self.send(request).await?)?;
        self.store.save(&session)?;

        info!(
            user_id = ?session.user.as_ref().map(|u| u.id.as_str()),
            "Signed in"
        );

        Ok(AuthPayload {
            user: session.user.clone(),
            session: Some(session),
        })
    }

    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &SecretString) -> AuthResult<AuthPayload> {
        let request = self.post("signup", None).json(&json!({
            "email": email,
            "password": password.expose_secret(),
        }));

        let value = self.send(request).await?;

        // With auto-confirm the service answers with a session; otherwise the
        // body is the new, unconfirmed user.
        if value.as_ref().is_some_and(|v| v.get("access_token").is_some()) {
            let session = session_from(value)?;
            self.store.save(&session)?;
            info!("Signed up with an active session");
            return Ok(AuthPayload {
                user: session.user.clone(),
                session: Some(session),
            });
        }

        let user = value
            .filter(|v| v.get("id").is_some())
            .map(serde_json::from_value::<User>)
            .transpose()
            .map_err(|e| AuthError::InvalidResponse {
                reason: format!("Failed to decode user: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            user_id = ?user.as_ref().map(|u| u.id.as_str()),
            "Signed up, confirmation pending"
        );

        Ok(AuthPayload {
            user,
            session: None,
        })
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> AuthResult<()> {
        let Some(session) = self.store.load()? else {
            debug!("Sign out without a session");
            return Ok(());
        };

        match self
            .send(self.post("logout", Some(&session.access_token)))
            .await
        {
            Ok(_) => {}
            Err(AuthError::Api {
                status: 401 | 403 | 404,
                ..
            }) => debug!("Session already gone server-side"),
            Err(e) => return Err(e),
        }

        self.store.clear()?;
        info!("Signed out");

        Ok(())
    }
}

#[track_caller]
fn session_from(value: Option<Value>) -> AuthResult<Session> {
    let value = value.ok_or_else(|| AuthError::InvalidResponse {
        reason: "Empty session response".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let session: Session =
        serde_json::from_value(value).map_err(|e| AuthError::InvalidResponse {
            reason: format!("Failed to decode session: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(session.with_expiry_from(Utc::now().timestamp()))
}

/// Build an [`AuthError::Api`] from a service error body.
///
/// The service has used several error shapes over time (`msg`,
/// `error_description`, `message`); the first one present wins.
#[track_caller]
fn api_error(status: u16, body: &str) -> AuthError {
    let json = serde_json::from_str::<Value>(body).ok();
    let field = |key: &str| {
        json.as_ref()
            .and_then(|v| v.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let message = ["msg", "message", "error_description", "error"]
        .into_iter()
        .find_map(|key| field(key))
        .unwrap_or_else(|| sanitize_body(body));
    let code = field("error_code").or_else(|| field("error"));

    AuthError::Api {
        status,
        code,
        message,
        location: ErrorLocation::from(Location::caller()),
    }
}

fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
