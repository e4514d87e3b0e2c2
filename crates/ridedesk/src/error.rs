//! User-facing errors.
//!
//! Every failure leaves the process as a miette report with a hint and a
//! stable exit code, so scripts can tell a dead backend from an expired
//! session.

use miette::Diagnostic;
use thiserror::Error;

use ridedesk_config::ConfigError;
use ridedesk_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    /// 128 + SIGINT
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Backend reachability ─────────────────────────────────────────
    #[error("Could not reach the admin API at {url}")]
    #[diagnostic(
        code(ridedesk::connection_failed),
        help(
            "{reason}\n\
             Check the profile's api_url, or pass --insecure (-k) for a self-signed staging backend."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(ridedesk::timeout),
        help("Raise it with --timeout 60s or `ridedesk config set timeout 60s`.")
    )]
    Timeout { url: String },

    // ── Session ──────────────────────────────────────────────────────
    #[error("Session expired or token rejected")]
    #[diagnostic(code(ridedesk::session_expired), help("Sign in again with: ridedesk login"))]
    SessionExpired,

    #[error("Not signed in to profile '{profile}'")]
    #[diagnostic(
        code(ridedesk::no_token),
        help("Run `ridedesk login -p {profile}`, or export RIDEDESK_TOKEN.")
    )]
    NoCredentials { profile: String },

    #[error("Sign-in failed: {message}")]
    #[diagnostic(code(ridedesk::login_failed))]
    LoginFailed { message: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(ridedesk::permission_denied),
        help("The console only accepts admin accounts.")
    )]
    PermissionDenied { message: String },

    // ── Requests ─────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(ridedesk::not_found),
        help("IDs are shown by the matching `list` command.")
    )]
    NotFound { message: String },

    #[error("API error{}: {message}", .status.map_or_else(String::new, |s| format!(" ({s})")))]
    #[diagnostic(code(ridedesk::api_error))]
    Api {
        message: String,
        status: Option<u16>,
    },

    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(ridedesk::validation))]
    Validation { field: String, reason: String },

    #[error("Interrupted")]
    #[diagnostic(code(ridedesk::interrupted))]
    Interrupted,

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found")]
    #[diagnostic(
        code(ridedesk::profile_not_found),
        help("Known profiles: {known}\nCreate one with: ridedesk config init")
    )]
    ProfileNotFound { name: String, known: String },

    #[error("No API URL configured")]
    #[diagnostic(
        code(ridedesk::no_config),
        help("Run `ridedesk config init`, or pass --api-url.\nConfig file: {path}")
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(ridedesk::config))]
    Config(ConfigError),

    // ── Terminal ─────────────────────────────────────────────────────
    #[error("Prompt failed: {0}")]
    #[diagnostic(
        code(ridedesk::prompt),
        help("Pass the value as an argument, or --yes (-y) to skip confirmations.")
    )]
    Prompt(String),

    #[error("{0}")]
    #[diagnostic(code(ridedesk::internal))]
    Internal(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::SessionExpired | Self::NoCredentials { .. } | Self::LoginFailed { .. } => {
                exit_code::AUTH
            }
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::Prompt(_) => exit_code::USAGE,
            Self::Interrupted => exit_code::INTERRUPTED,
            _ => exit_code::GENERAL,
        }
    }

    /// Validation messages read `field: reason`; anything else is blamed
    /// on the input as a whole.
    fn rejected_input(message: String) -> Self {
        match message.split_once(": ") {
            Some((field, reason)) if !field.contains(' ') => Self::Validation {
                field: field.to_owned(),
                reason: reason.to_owned(),
            },
            _ => Self::Validation {
                field: "input".into(),
                reason: message,
            },
        }
    }
}

/// Map a dialoguer / rpassword failure.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt(e.to_string())
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name, known } => Self::ProfileNotFound {
                name,
                known: if known.is_empty() {
                    "(none)".into()
                } else {
                    known.join(", ")
                },
            },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            other => Self::Config(other),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SessionExpired => Self::SessionExpired,
            CoreError::AuthenticationFailed { message } => Self::LoginFailed { message },
            CoreError::PermissionDenied { message } => Self::PermissionDenied { message },
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout { url } => Self::Timeout { url },
            CoreError::NotFound { message } => Self::NotFound { message },
            CoreError::Api { message, status } => Self::Api { message, status },
            CoreError::ValidationFailed { message } => Self::rejected_input(message),
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Cancelled => Self::Interrupted,
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}
