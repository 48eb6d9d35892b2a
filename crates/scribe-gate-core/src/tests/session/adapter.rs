use crate::{
    AuthError, AuthPayload, AuthResult, IdentityService, Navigation, Navigator, RequestError,
    RequestOptions, Session, SessionAdapter, User,
};

use std::{
    panic::Location,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use reqwest::Method;
use secrecy::SecretString;
use serde_json::Map;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string, header, method, path},
};

/// Identity service double: a fixed session, or a fixed failure.
#[derive(Default)]
struct FakeIdentity {
    session: Mutex<Option<Session>>,
    fail_with_status: Option<u16>,
    sign_outs: Mutex<usize>,
}

impl FakeIdentity {
    fn signed_in(token: &str) -> Self {
        Self {
            session: Mutex::new(Some(Session::bearer(token))),
            ..Self::default()
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::default()
        }
    }

    #[track_caller]
    fn check(&self) -> AuthResult<()> {
        match self.fail_with_status {
            Some(status) => Err(AuthError::Api {
                status,
                code: Some("invalid_credentials".to_string()),
                message: "Invalid login credentials".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IdentityService for FakeIdentity {
    async fn get_session(&self) -> AuthResult<Option<Session>> {
        self.check()?;
        Ok(self.session.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &SecretString,
    ) -> AuthResult<AuthPayload> {
        self.check()?;
        let user = User {
            id: "user-1".to_string(),
            email: Some(email.to_string()),
            extra: Map::new(),
        };
        let session = Session {
            user: Some(user.clone()),
            ..Session::bearer("fresh-token")
        };
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(AuthPayload {
            user: Some(user),
            session: Some(session),
        })
    }

    async fn sign_up(&self, email: &str, _password: &SecretString) -> AuthResult<AuthPayload> {
        self.check()?;
        Ok(AuthPayload {
            user: Some(User {
                id: "user-2".to_string(),
                email: Some(email.to_string()),
                extra: Map::new(),
            }),
            session: None,
        })
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.check()?;
        *self.sign_outs.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingNavigator {
    visits: Arc<Mutex<Vec<Navigation>>>,
}

impl RecordingNavigator {
    fn visits(&self) -> Vec<Navigation> {
        self.visits.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: Navigation) {
        self.visits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(target);
    }
}

#[allow(clippy::unwrap_used)]
fn adapter(
    identity: FakeIdentity,
) -> (
    SessionAdapter<FakeIdentity, RecordingNavigator>,
    RecordingNavigator,
) {
    let navigator = RecordingNavigator::default();
    let adapter = SessionAdapter::new(identity, navigator.clone()).unwrap();
    (adapter, navigator)
}

fn password() -> SecretString {
    SecretString::from("hunter2".to_string())
}

/// WHAT: Logged-in state follows the identity service
/// WHY: The adapter holds no session state of its own
#[tokio::test]
async fn given_session_when_querying_then_logged_in_with_token() {
    let (session, _) = adapter(FakeIdentity::signed_in("abc"));

    assert!(session.is_logged_in().await);
    assert_eq!(session.get_token().await, Some("abc".to_string()));
}

/// WHAT: No session means logged out and no token
/// WHY: Guards the request path
#[tokio::test]
async fn given_no_session_when_querying_then_logged_out() {
    let (session, _) = adapter(FakeIdentity::default());

    assert!(!session.is_logged_in().await);
    assert_eq!(session.get_token().await, None);
}

/// WHAT: A failing session query reads as logged out
/// WHY: Queries never raise to the caller
#[tokio::test]
async fn given_identity_failure_when_querying_then_logged_out() {
    let (session, _) = adapter(FakeIdentity::failing(500));

    assert!(!session.is_logged_in().await);
    assert_eq!(session.get_token().await, None);
}

/// WHAT: Login returns the service payload
/// WHY: Callers read the user from it
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_valid_credentials_when_login_then_payload_returned() {
    let (session, navigator) = adapter(FakeIdentity::default());

    let payload = session.login("ada@example.com", &password()).await.unwrap();

    assert_eq!(
        payload.user.and_then(|u| u.email),
        Some("ada@example.com".to_string())
    );
    assert_eq!(session.get_token().await, Some("fresh-token".to_string()));
    assert!(navigator.visits().is_empty());
}

/// WHAT: Login errors reach the caller unchanged
/// WHY: The login form shows the service's own message
#[tokio::test]
async fn given_rejected_credentials_when_login_then_service_error_unchanged() {
    let (session, navigator) = adapter(FakeIdentity::failing(400));

    let result = session.login("ada@example.com", &password()).await;

    assert!(matches!(
        result,
        Err(AuthError::Api { status: 400, ref message, .. }) if message == "Invalid login credentials"
    ));
    assert!(navigator.visits().is_empty());
}

/// WHAT: Signup returns the pending user
/// WHY: Confirmation e-mail flows have no session yet
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_new_account_when_signup_then_user_without_session() {
    let (session, _) = adapter(FakeIdentity::default());

    let payload = session.signup("new@example.com", &password()).await.unwrap();

    assert!(payload.session.is_none());
    assert_eq!(payload.user.map(|u| u.id), Some("user-2".to_string()));
}

/// WHAT: Logout signs out then navigates to the root page
/// WHY: A signed-out user lands on the public page
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_session_when_logout_then_signed_out_and_root_visited() {
    let (session, navigator) = adapter(FakeIdentity::signed_in("abc"));

    let target = session.logout().await.unwrap();

    assert_eq!(target, Navigation::Root);
    assert_eq!(navigator.visits(), vec![Navigation::Root]);
    assert_eq!(*session.identity().sign_outs.lock().unwrap(), 1);
    assert!(!session.is_logged_in().await);
}

/// WHAT: A failed logout does not navigate
/// WHY: The user is still signed in
#[tokio::test]
async fn given_identity_failure_when_logout_then_error_and_no_navigation() {
    let (session, navigator) = adapter(FakeIdentity::failing(500));

    assert!(session.logout().await.is_err());
    assert!(navigator.visits().is_empty());
}

/// WHAT: No token means no request and a login redirect
/// WHY: Unauthenticated calls must never reach the server
#[tokio::test]
async fn given_no_session_when_making_request_then_redirect_and_no_request() {
    // Given: A server that must not be called
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let (session, navigator) = adapter(FakeIdentity::default());

    // When: Making an authenticated request
    let result = session
        .make_authenticated_request(&format!("{}/notes", server.uri()), RequestOptions::default())
        .await;

    // Then: Unauthenticated with a login redirect
    let err = result.err();
    assert!(matches!(err, Some(RequestError::Unauthenticated { .. })));
    assert_eq!(err.and_then(|e| e.redirect()), Some(Navigation::Login));
    assert_eq!(navigator.visits(), vec![Navigation::Login]);
}

/// WHAT: An empty token counts as no token
/// WHY: "Bearer " with nothing after it is never a credential
#[tokio::test]
async fn given_empty_token_when_making_request_then_unauthenticated() {
    let (session, navigator) = adapter(FakeIdentity::signed_in(""));

    let result = session
        .make_authenticated_request("http://127.0.0.1:9/unused", RequestOptions::default())
        .await;

    assert!(matches!(result, Err(RequestError::Unauthenticated { .. })));
    assert_eq!(navigator.visits(), vec![Navigation::Login]);
}

/// WHAT: Requests carry the bearer token and JSON content type
/// WHY: Protected endpoints authenticate with the session token
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_session_when_making_request_then_auth_headers_attached() {
    // Given: A server expecting the bearer token
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notes"))
        .and(header("authorization", "Bearer abc"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"text":"hi"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&server)
        .await;
    let (session, navigator) = adapter(FakeIdentity::signed_in("abc"));

    // When: Posting a body
    let response = session
        .make_authenticated_request(
            &format!("{}/notes", server.uri()),
            RequestOptions::new(Method::POST).body(r#"{"text":"hi"}"#),
        )
        .await
        .unwrap();

    // Then: Raw response handed back
    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(response.text().await.unwrap(), "created");
    assert!(navigator.visits().is_empty());
}

/// WHAT: Caller headers replace injected ones of the same name
/// WHY: Uploads need their own content type
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_caller_content_type_when_making_request_then_caller_wins() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(header("content-type", "text/plain"))
        .and(header("x-trace", "1"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let (session, _) = adapter(FakeIdentity::signed_in("abc"));

    let options = RequestOptions::new(Method::PUT)
        .header("Content-Type", "text/plain")
        .header("X-Trace", "1");
    let response = session
        .make_authenticated_request(&server.uri(), options)
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 204);
}

/// WHAT: A 401 response redirects to login and fails the request, whatever its body says
/// WHY: The server rejected the session; a success-looking body does not change that
#[tokio::test]
async fn given_rejected_token_when_making_request_then_session_expired_and_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("content-type", "application/json")
                .set_body_string("{\"ok\":true}"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let (session, navigator) = adapter(FakeIdentity::signed_in("stale"));

    let result = session
        .make_authenticated_request(&server.uri(), RequestOptions::default())
        .await;

    let err = result.err();
    assert!(matches!(err, Some(RequestError::SessionExpired { .. })));
    assert!(
        err.map(|e| e.to_string())
            .is_some_and(|m| m.contains("Session expired. Please log in again."))
    );
    assert_eq!(navigator.visits(), vec![Navigation::Login]);
}

/// WHAT: Other error statuses are returned as responses
/// WHY: Only 401 is the adapter's concern
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_forbidden_when_making_request_then_response_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let (session, navigator) = adapter(FakeIdentity::signed_in("abc"));

    let response = session
        .make_authenticated_request(&server.uri(), RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
    assert!(navigator.visits().is_empty());
}

/// WHAT: With redirects disabled the error still names the target
/// WHY: Headless callers decide for themselves
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_redirects_disabled_when_unauthenticated_then_no_navigation() {
    let navigator = RecordingNavigator::default();
    let session = SessionAdapter::new(FakeIdentity::default(), navigator.clone())
        .unwrap()
        .with_redirects(false);

    let result = session
        .make_authenticated_request("http://127.0.0.1:9/", RequestOptions::default())
        .await;

    assert_eq!(
        result.err().and_then(|e| e.redirect()),
        Some(Navigation::Login)
    );
    assert!(navigator.visits().is_empty());
}

/// WHAT: A failing session query aborts the request
/// WHY: The session query completes before anything is sent
#[tokio::test]
async fn given_identity_failure_when_making_request_then_auth_error() {
    let (session, navigator) = adapter(FakeIdentity::failing(500));

    let result = session
        .make_authenticated_request("http://127.0.0.1:9/", RequestOptions::default())
        .await;

    assert!(matches!(result, Err(RequestError::Auth(AuthError::Api { status: 500, .. }))));
    assert!(navigator.visits().is_empty());
}
