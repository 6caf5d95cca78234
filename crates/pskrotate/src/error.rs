//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable process exit code.

use miette::Diagnostic;
use thiserror::Error;

use pskrotate_config::ConfigError;
use pskrotate_core::{CoreError, TransientCause};

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const PARTIAL_FAILURE: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the Dashboard API")]
    #[diagnostic(
        code(pskrotate::connection_failed),
        help(
            "Check network access to the API host.\n\
             Override the endpoint with --base-url or `base_url` in your profile."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(pskrotate::timeout),
        help("Increase the timeout with --timeout or `timeout` in your profile.")
    )]
    Timeout { reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(pskrotate::auth_failed),
        help(
            "Verify the API key for profile '{profile}' and that it has write\n\
             access to the organization."
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(pskrotate::no_credentials),
        help(
            "Pass --api-key, set PSKROTATE_API_KEY, or add `api_key_env`\n\
             to the profile in your config file."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(pskrotate::not_found),
        help("Run: pskrotate {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({kind}): {message}")]
    #[diagnostic(code(pskrotate::api_error))]
    ApiError { kind: String, message: String },

    // ── Run outcome ──────────────────────────────────────────────────

    #[error("{failed} of {total} network(s) failed")]
    #[diagnostic(
        code(pskrotate::partial_failure),
        help("Failed networks are listed above. Re-run to retry only where needed.")
    )]
    PartialFailure { failed: usize, total: usize },

    #[error("Run cancelled")]
    #[diagnostic(code(pskrotate::cancelled))]
    Cancelled,

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(pskrotate::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(pskrotate::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(
        code(pskrotate::config),
        help("Check the config file printed by: pskrotate config path")
    )]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(pskrotate::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(pskrotate::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PartialFailure { .. } => exit_code::PARTIAL_FAILURE,
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::Config(_)
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ──────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Auth { message } => CliError::AuthFailed {
                profile: "current".into(),
                message,
            },

            CoreError::Transient { cause, message, .. } => match cause {
                TransientCause::Timeout => CliError::Timeout { reason: message },
                TransientCause::Connect | TransientCause::Interrupted => {
                    CliError::ConnectionFailed { reason: message }
                }
                TransientCause::RateLimited | TransientCause::Server => CliError::ApiError {
                    kind: format!("transient/{cause}"),
                    message,
                },
            },

            // The summary is handled by the caller before this conversion.
            CoreError::Aborted { cause, .. } => CliError::from(*cause),

            CoreError::OrganizationNotFound { selector } => CliError::NotFound {
                resource_type: "organization".into(),
                identifier: selector,
                list_command: "orgs list".into(),
            },

            CoreError::NotFound { message } => CliError::NotFound {
                resource_type: "resource".into(),
                identifier: message,
                list_command: "networks list".into(),
            },

            CoreError::Validation { message } => CliError::ApiError {
                kind: "validation".into(),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::UnsupportedFamily { family } => CliError::ApiError {
                kind: "unsupported-family".into(),
                message: format!("no SSID endpoint for {family} networks"),
            },

            CoreError::Cancelled => CliError::Cancelled,

            CoreError::Internal(message) => CliError::ApiError {
                kind: "internal".into(),
                message,
            },
        }
    }
}
