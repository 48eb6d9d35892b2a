//! Session façade over the identity service.
//!
//! Every query goes back to the identity client; the adapter holds no session
//! state of its own, so concurrent calls are independent.

use crate::{
    AuthError, AuthPayload, ConfigError, IdentityService, RequestError,
    identity::APP_USER_AGENT,
    session::{Navigation, Navigator, RequestOptions},
};

use std::panic::Location;

use error_location::ErrorLocation;
use reqwest::{
    Client, Response, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use secrecy::SecretString;
use tracing::{debug, info, instrument, warn};

/// Login/session helpers and an auth guard for outgoing requests.
pub struct SessionAdapter<I, N> {
    identity: I,
    navigator: N,
    http: Client,
    redirect_on_auth_failure: bool,
}

impl<I: IdentityService, N: Navigator> SessionAdapter<I, N> {
    /// Create an adapter that redirects on auth failures.
    ///
    /// # Errors
    ///
    /// Returns error if the outbound HTTP client cannot be built.
    #[track_caller]
    pub fn new(identity: I, navigator: N) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|source| ConfigError::HttpClient {
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            identity,
            navigator,
            http,
            redirect_on_auth_failure: true,
        })
    }

    /// Turn the login redirect on missing/expired credentials on or off.
    ///
    /// The redirect target is still reported through
    /// [`RequestError::redirect`] either way.
    pub fn with_redirects(mut self, enabled: bool) -> Self {
        self.redirect_on_auth_failure = enabled;
        self
    }

    /// The identity service this adapter queries.
    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// True iff the identity service reports a session.
    ///
    /// A failing query counts as signed out.
    #[instrument(skip(self))]
    pub async fn is_logged_in(&self) -> bool {
        match self.identity.get_session().await {
            Ok(session) => session.is_some(),
            Err(e) => {
                warn!(error = %e, "Session query failed, treating as signed out");
                false
            }
        }
    }

    /// Bearer credential of the current session, re-queried on every call.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> Option<String> {
        match self.identity.get_session().await {
            Ok(session) => session.map(|s| s.access_token),
            Err(e) => {
                warn!(error = %e, "Session query failed, no token available");
                None
            }
        }
    }

    /// Submit credentials to the password grant.
    ///
    /// # Errors
    ///
    /// Returns the identity service's error unchanged. No retry is attempted.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthPayload, AuthError> {
        self.identity.sign_in_with_password(email, password).await
    }

    /// Request a new account.
    ///
    /// # Errors
    ///
    /// Returns the identity service's error unchanged. No retry is attempted.
    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthPayload, AuthError> {
        self.identity.sign_up(email, password).await
    }

    /// Sign out, then navigate to the site root.
    ///
    /// Returns the navigation that was performed.
    ///
    /// # Errors
    ///
    /// Returns the identity service's error unchanged; no navigation happens
    /// in that case.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<Navigation, AuthError> {
        self.identity.sign_out().await?;

        let target = Navigation::Root;
        self.navigator.navigate(target);
        info!(path = target.path(), "Logged out");

        Ok(target)
    }

    /// Send a request carrying the current bearer credential.
    ///
    /// The session query completes before the request is sent, and the
    /// status check happens after the response arrives. Any response other
    /// than 401 is returned as-is; its body is the caller's concern.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Auth`] when the session query fails.
    /// - [`RequestError::Unauthenticated`] when there is no credential; the
    ///   request is never sent.
    /// - [`RequestError::SessionExpired`] when the server answers 401.
    /// - [`RequestError::InvalidHeader`] / [`RequestError::Transport`] for
    ///   malformed headers and transport failures.
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn make_authenticated_request(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response, RequestError> {
        let session = self.identity.get_session().await?;

        let Some(token) = session
            .map(|s| s.access_token)
            .filter(|token| !token.is_empty())
        else {
            self.redirect(Navigation::Login);
            return Err(RequestError::Unauthenticated {
                redirect: Navigation::Login,
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let headers = merge_headers(&token, &options.headers)?;

        let mut request = self.http.request(options.method, url).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|source| RequestError::Transport {
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.redirect(Navigation::Login);
            return Err(RequestError::SessionExpired {
                redirect: Navigation::Login,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        debug!(status = response.status().as_u16(), "Authenticated request complete");

        Ok(response)
    }

    fn redirect(&self, target: Navigation) {
        if self.redirect_on_auth_failure {
            info!(path = target.path(), "Redirecting to login");
            self.navigator.navigate(target);
        } else {
            debug!(path = target.path(), "Redirect suppressed by policy");
        }
    }
}

/// Injected headers first, caller headers after; a caller header replaces an
/// injected one with the same name.
#[track_caller]
pub(crate) fn merge_headers(
    token: &str,
    caller_headers: &[(String, String)],
) -> Result<HeaderMap, RequestError> {
    let mut headers = HeaderMap::new();

    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
        RequestError::InvalidHeader {
            name: AUTHORIZATION.to_string(),
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in caller_headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| RequestError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| RequestError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}
