mod client;
mod config;
mod store;
mod types;

pub use {
    client::{APP_USER_AGENT, GoTrueClient},
    config::IdentityConfig,
    store::{FileSessionStore, MemorySessionStore, SessionStore},
    types::{AuthPayload, Session, User},
};

use crate::AuthResult;

use async_trait::async_trait;
use secrecy::SecretString;

/// The external identity service, as seen by the session adapter.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Current session, or `None` when signed out.
    async fn get_session(&self) -> AuthResult<Option<Session>>;

    /// Password-grant sign in.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> AuthResult<AuthPayload>;

    /// Create a new account.
    async fn sign_up(&self, email: &str, password: &SecretString) -> AuthResult<AuthPayload>;

    /// End the current session.
    async fn sign_out(&self) -> AuthResult<()>;
}
