use crate::{
    AuthError, GoTrueClient, IdentityConfig, IdentityService, MemorySessionStore, Session,
    SessionStore,
};

use chrono::Utc;
use secrecy::SecretString;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_partial_json, header, method, path, query_param},
};

const PUBLIC_KEY: &str = "anon-key";

#[allow(clippy::unwrap_used)]
fn client_for(server: &MockServer, store: MemorySessionStore) -> GoTrueClient<MemorySessionStore> {
    let config = IdentityConfig::new(Some(server.uri().as_str()), Some(PUBLIC_KEY)).unwrap();
    GoTrueClient::new(config, store).unwrap()
}

fn session_body(access_token: &str) -> serde_json::Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-1",
        "user": { "id": "user-1", "email": "ada@example.com", "role": "authenticated" }
    })
}

fn password() -> SecretString {
    SecretString::from("hunter2".to_string())
}

fn session_expiring_in(secs: i64) -> Session {
    Session {
        expires_at: Some(Utc::now().timestamp() + secs),
        refresh_token: Some("refresh-1".to_string()),
        ..Session::bearer("old-token")
    }
}

/// WHAT: Password sign in posts credentials with the project key and stores the session
/// WHY: Later session queries read the stored session
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_valid_credentials_when_signing_in_then_session_saved() {
    // Given: A service that accepts the password grant
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", PUBLIC_KEY))
        .and(header("authorization", "Bearer anon-key"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("token-1")))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server, MemorySessionStore::default());

    // When: Signing in
    let payload = client
        .sign_in_with_password("ada@example.com", &password())
        .await
        .unwrap();

    // Then: Session returned and persisted with a computed expiry
    let session = payload.session.unwrap();
    assert_eq!(session.access_token, "token-1");
    assert!(session.expires_at.is_some());
    assert_eq!(payload.user.unwrap().id, "user-1");
    assert_eq!(client.store().load().unwrap(), Some(session));
}

/// WHAT: Rejected credentials surface the service's message and code
/// WHY: The login form shows the service's own wording
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_wrong_password_when_signing_in_then_api_error_with_message() {
    // Given: A service rejecting the grant
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;
    let client = client_for(&server, MemorySessionStore::default());

    // When: Signing in
    let err = client
        .sign_in_with_password("ada@example.com", &password())
        .await
        .unwrap_err();

    // Then: Message and code come from the body; nothing stored
    assert!(matches!(
        &err,
        AuthError::Api { status: 400, message, .. } if message == "Invalid login credentials"
    ));
    assert_eq!(err.code(), Some("invalid_grant"));
    assert_eq!(client.store().load().unwrap(), None);
}

/// WHAT: Newer error shape uses msg and error_code
/// WHY: The service changed its error body over time
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_msg_error_body_when_signing_up_then_msg_used() {
    // Given: A service answering with the msg/error_code shape
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": 422,
            "error_code": "weak_password",
            "msg": "Password should be at least 6 characters."
        })))
        .mount(&server)
        .await;
    let client = client_for(&server, MemorySessionStore::default());

    // When: Signing up
    let err = client
        .sign_up("ada@example.com", &password())
        .await
        .unwrap_err();

    // Then: The msg field wins
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.code(), Some("weak_password"));
    assert!(err.to_string().contains("Password should be at least 6 characters."));
}

/// WHAT: Non-JSON error bodies become a trimmed message
/// WHY: Proxies in front of the service answer with plain text
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_plain_text_error_when_signing_in_then_body_used_as_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("  Bad Gateway \n"))
        .mount(&server)
        .await;
    let client = client_for(&server, MemorySessionStore::default());

    let err = client
        .sign_in_with_password("ada@example.com", &password())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AuthError::Api { status: 502, ref message, .. } if message == "Bad Gateway"
    ));
}

/// WHAT: Signup with confirmation pending returns the user and no session
/// WHY: The user must confirm their e-mail before signing in
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_confirmation_required_when_signing_up_then_user_without_session() {
    // Given: A service that answers signup with the bare user
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_partial_json(json!({ "email": "ada@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-2",
            "email": "ada@example.com",
            "confirmation_sent_at": "2026-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;
    let client = client_for(&server, MemorySessionStore::default());

    // When: Signing up
    let payload = client.sign_up("ada@example.com", &password()).await.unwrap();

    // Then: User present, unknown fields kept, no session stored
    let user = payload.user.unwrap();
    assert_eq!(user.id, "user-2");
    assert!(user.extra.contains_key("confirmation_sent_at"));
    assert!(payload.session.is_none());
    assert_eq!(client.store().load().unwrap(), None);
}

/// WHAT: Signup with auto-confirm stores the issued session
/// WHY: The user is signed in straight away
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_auto_confirm_when_signing_up_then_session_saved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("token-2")))
        .mount(&server)
        .await;
    let client = client_for(&server, MemorySessionStore::default());

    let payload = client.sign_up("ada@example.com", &password()).await.unwrap();

    assert_eq!(payload.session.unwrap().access_token, "token-2");
    assert_eq!(
        client.store().load().unwrap().map(|s| s.access_token),
        Some("token-2".to_string())
    );
}

/// WHAT: Sign out revokes with the user's token and clears the store
/// WHY: The session must be unusable afterwards
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_session_when_signing_out_then_logout_called_and_store_cleared() {
    // Given: A stored session
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer user-token"))
        .and(header("apikey", PUBLIC_KEY))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let store = MemorySessionStore::with_session(Session::bearer("user-token"));
    let client = client_for(&server, store);

    // When: Signing out
    client.sign_out().await.unwrap();

    // Then: Store empty
    assert_eq!(client.store().load().unwrap(), None);
}

/// WHAT: A session already revoked server-side still signs out locally
/// WHY: Logging out must never leave a dead session behind
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_revoked_session_when_signing_out_then_not_found_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error_code": "session_not_found",
            "msg": "Session from session_id claim in JWT does not exist"
        })))
        .mount(&server)
        .await;
    let client = client_for(&server, MemorySessionStore::with_session(Session::bearer("t")));

    client.sign_out().await.unwrap();

    assert_eq!(client.store().load().unwrap(), None);
}

/// WHAT: A server failure during sign out keeps the session
/// WHY: The caller sees the error and may retry
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_server_error_when_signing_out_then_error_and_session_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let client = client_for(&server, MemorySessionStore::with_session(Session::bearer("t")));

    let result = client.sign_out().await;

    assert!(matches!(result, Err(AuthError::Api { status: 500, .. })));
    assert!(client.store().load().unwrap().is_some());
}

/// WHAT: Sign out without a session makes no request
/// WHY: There is nothing to revoke
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_session_when_signing_out_then_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    let client = client_for(&server, MemorySessionStore::default());

    client.sign_out().await.unwrap();
}

/// WHAT: A fresh session is returned without contacting the service
/// WHY: Session queries happen on every request
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_fresh_session_when_getting_session_then_returned_from_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let stored = session_expiring_in(3600);
    let client = client_for(&server, MemorySessionStore::with_session(stored.clone()));

    let session = client.get_session().await.unwrap();

    assert_eq!(session, Some(stored));
}

/// WHAT: A session about to expire is refreshed and re-saved
/// WHY: Requests must not go out with a token that dies in flight
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_expiring_session_when_getting_session_then_refreshed() {
    // Given: A session expiring in 30 seconds
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({ "refresh_token": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("new-token")))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(
        &server,
        MemorySessionStore::with_session(session_expiring_in(30)),
    );

    // When: Querying the session
    let session = client.get_session().await.unwrap().unwrap();

    // Then: The refreshed session is returned and stored
    assert_eq!(session.access_token, "new-token");
    assert_eq!(
        client.store().load().unwrap().map(|s| s.access_token),
        Some("new-token".to_string())
    );
}

/// WHAT: A rejected refresh token clears the session
/// WHY: The user has to sign in again
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_revoked_refresh_token_when_getting_session_then_store_cleared() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_code": "refresh_token_not_found",
            "msg": "Invalid Refresh Token: Refresh Token Not Found"
        })))
        .mount(&server)
        .await;
    let client = client_for(
        &server,
        MemorySessionStore::with_session(session_expiring_in(-10)),
    );

    let result = client.get_session().await;

    assert!(matches!(result, Err(AuthError::Api { status: 400, .. })));
    assert_eq!(client.store().load().unwrap(), None);
}

/// WHAT: A refresh that fails server-side keeps the session
/// WHY: An outage is not a sign out
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_server_error_during_refresh_when_getting_session_then_session_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let client = client_for(
        &server,
        MemorySessionStore::with_session(session_expiring_in(30)),
    );

    let result = client.get_session().await;

    assert!(result.is_err());
    assert!(client.store().load().unwrap().is_some());
}

/// WHAT: An expired session with no refresh token reads as signed out
/// WHY: It can never be used again
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_expired_session_without_refresh_token_when_getting_session_then_none() {
    let server = MockServer::start().await;
    let expired = Session {
        expires_at: Some(Utc::now().timestamp() - 60),
        ..Session::bearer("dead")
    };
    let client = client_for(&server, MemorySessionStore::with_session(expired));

    let session = client.get_session().await.unwrap();

    assert!(session.is_none());
    assert_eq!(client.store().load().unwrap(), None);
}
