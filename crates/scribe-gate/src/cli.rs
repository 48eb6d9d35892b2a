//! Command-line interface.

use std::fmt;

use clap::{Args, Parser, Subcommand};
use reqwest::Method;

/// Scribe Gate: dictation tray and session tools for a Supabase-backed site.
#[derive(Debug, Parser)]
#[command(name = "scribe-gate", version, about)]
pub(crate) struct Cli {
    /// Subcommand to execute; defaults to `dictate`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Run the dictation tray (CTRL+SHIFT+Space toggles voice input).
    Dictate,
    /// Session commands.
    #[command(flatten)]
    Session(SessionCommand),
}

/// Commands backed by the session adapter.
#[derive(Debug, Subcommand)]
pub(crate) enum SessionCommand {
    /// Sign in with e-mail and password.
    Login(Credentials),
    /// Create an account.
    Signup(Credentials),
    /// Sign out and open the site root.
    Logout,
    /// Report whether a session exists.
    Status,
    /// Print the current bearer token.
    Token,
    /// Send a request carrying the bearer token.
    Request(RequestArgs),
}

impl SessionCommand {
    /// Subcommand name as typed on the command line.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            SessionCommand::Login(_) => "login",
            SessionCommand::Signup(_) => "signup",
            SessionCommand::Logout => "logout",
            SessionCommand::Status => "status",
            SessionCommand::Token => "token",
            SessionCommand::Request(_) => "request",
        }
    }
}

/// E-mail and password for login and signup.
#[derive(Args)]
pub(crate) struct Credentials {
    /// Account e-mail.
    #[arg(long)]
    pub email: String,

    /// Account password.
    #[arg(long, env = "SCRIBE_GATE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Arguments for an authenticated request.
#[derive(Debug, Args)]
pub(crate) struct RequestArgs {
    /// Target URL.
    pub url: String,

    /// HTTP method.
    #[arg(short = 'X', long, default_value = "GET", value_parser = parse_method)]
    pub method: Method,

    /// Extra header as `Name: value`; repeatable, later wins.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Raw request body.
    #[arg(short = 'd', long)]
    pub body: Option<String>,
}

pub(crate) fn parse_method(value: &str) -> Result<Method, String> {
    Method::from_bytes(value.trim().to_ascii_uppercase().as_bytes())
        .map_err(|e| format!("invalid method {:?}: {}", value, e))
}

pub(crate) fn parse_header(value: &str) -> Result<(String, String), String> {
    let (name, header_value) = value
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got {:?}", value))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in {:?}", value));
    }

    Ok((name.to_string(), header_value.trim().to_string()))
}
