//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use routerkick_config::ConfigError;
use routerkick_core::{CoreError, FailureKind, OperationKind};

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const OPERATION_FAILED: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const ENVIRONMENT: i32 = 9;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Operations ───────────────────────────────────────────────────

    #[error("{operation} failed: {reason}")]
    #[diagnostic(
        code(routerkick::operation_failed),
        help(
            "Re-run with -v to see each step.\n\
             Check the router address and password with: routerkick config show"
        )
    )]
    OperationFailed {
        operation: OperationKind,
        reason: String,
    },

    #[error("{operation} failed: {reason}")]
    #[diagnostic(
        code(routerkick::timeout),
        help(
            "The router's web console did not respond in time.\n\
             Raise the limits under [profiles.<name>.timing] if it is just slow."
        )
    )]
    Timeout {
        operation: OperationKind,
        reason: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(routerkick::environment_missing),
        help(
            "Install Chrome or Chromium (or pass --chrome <PATH>) for reboots,\n\
             and the platform network tool (nmcli, netsh, networksetup) for Wi-Fi joins."
        )
    )]
    EnvironmentMissing { message: String },

    #[error("No known networks in profile '{profile}'")]
    #[diagnostic(
        code(routerkick::no_networks),
        help("Add one with: routerkick networks add <SSID>")
    )]
    NoNetworks { profile: String },

    #[error("{operation} is already running")]
    #[diagnostic(code(routerkick::already_running))]
    AlreadyRunning { operation: OperationKind },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(routerkick::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: routerkick config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Network '{network}' is not in profile '{profile}'")]
    #[diagnostic(
        code(routerkick::network_not_found),
        help("Run: routerkick networks list")
    )]
    NetworkNotFound { profile: String, network: String },

    #[error("{resource_type} '{identifier}' already exists")]
    #[diagnostic(code(routerkick::conflict))]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    #[error("The '{name}' profile cannot be removed")]
    #[diagnostic(
        code(routerkick::protected_profile),
        help("Use `routerkick config reset` to restore its defaults instead.")
    )]
    ProtectedProfile { name: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(routerkick::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(routerkick::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Could not load configuration from {path}")]
    #[diagnostic(
        code(routerkick::config),
        help("Fix the file, or move it aside and run: routerkick config init")
    )]
    ConfigLoad {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("System keyring unavailable: {message}")]
    #[diagnostic(
        code(routerkick::keyring),
        help("Set ROUTERKICK_PASSWORD, or put `password` in the profile (plaintext).")
    )]
    Keyring { message: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(routerkick::config))]
    Config { message: String },

    // ── Interrupt ────────────────────────────────────────────────────

    #[error("Interrupted")]
    #[diagnostic(code(routerkick::interrupted))]
    Interrupted,

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(routerkick::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::OperationFailed { .. } | Self::NoNetworks { .. } => exit_code::OPERATION_FAILED,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::EnvironmentMissing { .. } => exit_code::ENVIRONMENT,
            Self::ProfileNotFound { .. } | Self::NetworkNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::ProtectedProfile { .. } | Self::AlreadyRunning { .. } => {
                exit_code::CONFLICT
            }
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Interrupted => exit_code::INTERRUPTED,
            _ => exit_code::GENERAL,
        }
    }

    /// Classify a failed operation outcome.
    pub fn from_failure(operation: OperationKind, kind: FailureKind, reason: String) -> Self {
        match kind {
            FailureKind::Timeout => Self::Timeout { operation, reason },
            FailureKind::EnvironmentMissing => Self::EnvironmentMissing { message: reason },
            FailureKind::Failed => Self::OperationFailed { operation, reason },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::ProfileExists { name } => CliError::Conflict {
                resource_type: "profile".into(),
                identifier: name,
            },
            ConfigError::ProtectedProfile { name } => CliError::ProtectedProfile { name },
            ConfigError::NetworkNotFound { profile, network } => {
                CliError::NetworkNotFound { profile, network }
            }
            ConfigError::DuplicateNetwork { network, .. } => CliError::Conflict {
                resource_type: "network".into(),
                identifier: network,
            },
            ConfigError::Keyring(e) => CliError::Keyring {
                message: e.to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other @ (ConfigError::Serialization(_) | ConfigError::Figment(_)) => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AlreadyRunning { operation } => CliError::AlreadyRunning { operation },
            CoreError::EnvironmentMissing { message } => CliError::EnvironmentMissing { message },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Config { message },
            other => CliError::Internal(other.to_string()),
        }
    }
}
