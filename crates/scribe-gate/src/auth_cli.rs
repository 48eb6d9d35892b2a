//! One-shot session subcommands: login, signup, logout, status, token and
//! authenticated requests.

use crate::{
    AppError, AppResult, BrowserNavigator,
    cli::{Credentials, RequestArgs, SessionCommand},
    config::Config,
};

use std::{io::Write, panic::Location};

use error_location::ErrorLocation;
use scribe_gate_core::{
    FileSessionStore, GoTrueClient, IdentityService, Navigator, RequestOptions, SessionAdapter,
    SessionStore,
};
use secrecy::SecretString;
use tracing::{info, instrument};

/// Build the session adapter from `config` and run `command`, writing the
/// result to stdout.
pub(crate) async fn run(command: SessionCommand, config: &Config) -> AppResult<()> {
    let store = FileSessionStore::new(Config::session_path()?);
    run_with_store(command, config, store).await
}

/// [`run`] against an explicit session store.
///
/// The command carries the password, so it is kept out of the span.
#[instrument(skip_all, fields(command = command.name()))]
pub(crate) async fn run_with_store<S: SessionStore>(
    command: SessionCommand,
    config: &Config,
    store: S,
) -> AppResult<()> {
    let client = GoTrueClient::new(config.identity_config()?, store)?;
    let navigator = BrowserNavigator::new(&config.site.url)?;

    let adapter = SessionAdapter::new(client, navigator)?
        .with_redirects(config.site.redirect_on_auth_failure);

    let mut stdout = std::io::stdout().lock();
    execute(command, &adapter, &mut stdout).await
}

/// Run `command` against `adapter`, writing user-facing output to `out`.
pub(crate) async fn execute<I, N, W>(
    command: SessionCommand,
    adapter: &SessionAdapter<I, N>,
    out: &mut W,
) -> AppResult<()>
where
    I: IdentityService,
    N: Navigator,
    W: Write,
{
    match command {
        SessionCommand::Login(credentials) => {
            let (email, password) = secret(credentials);
            let payload = adapter.login(&email, &password).await?;
            let who = payload
                .user
                .and_then(|user| user.email)
                .unwrap_or(email);
            writeln!(out, "Signed in as {}", who)?;
        }
        SessionCommand::Signup(credentials) => {
            let (email, password) = secret(credentials);
            let payload = adapter.signup(&email, &password).await?;
            writeln!(out, "Account created for {}", email)?;
            if payload.session.is_none() {
                writeln!(out, "Check your inbox to confirm the address, then log in.")?;
            }
        }
        SessionCommand::Logout => {
            adapter.logout().await?;
            writeln!(out, "Signed out")?;
        }
        SessionCommand::Status => {
            let state = if adapter.is_logged_in().await {
                "Signed in"
            } else {
                "Not signed in"
            };
            writeln!(out, "{}", state)?;
        }
        SessionCommand::Token => {
            let token = adapter.get_token().await.ok_or_else(|| AppError::NotSignedIn {
                location: ErrorLocation::from(Location::caller()),
            })?;
            writeln!(out, "{}", token)?;
        }
        SessionCommand::Request(args) => {
            let url = args.url.clone();
            let response = adapter
                .make_authenticated_request(&url, request_options(args))
                .await?;

            let status = response.status();
            info!(status = status.as_u16(), url = %url, "Request complete");

            let body = response.text().await.map_err(|source| AppError::Http {
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;
            writeln!(out, "{}", body)?;
        }
    }

    Ok(())
}

pub(crate) fn request_options(args: RequestArgs) -> RequestOptions {
    let options = args
        .headers
        .into_iter()
        .fold(RequestOptions::new(args.method), |options, (name, value)| {
            options.header(name, value)
        });

    match args.body {
        Some(body) => options.body(body),
        None => options,
    }
}

fn secret(credentials: Credentials) -> (String, SecretString) {
    (credentials.email, SecretString::from(credentials.password))
}
