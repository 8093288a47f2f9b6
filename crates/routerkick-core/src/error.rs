// ── Core error types ──
//
// Operation-level errors. Their Display strings double as the failure
// reasons reported to the presentation layer, so they name the step
// that failed rather than the driver call underneath it.

use thiserror::Error;

use crate::event::OperationKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Step failures ────────────────────────────────────────────────
    #[error("{step} timed out")]
    Timeout { step: String },

    #[error("{step} failed: {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Required dependency missing: {message}")]
    EnvironmentMissing { message: String },

    // ── Network join ─────────────────────────────────────────────────
    #[error("no configured networks")]
    NoConfiguredNetworks,

    #[error("all configured networks failed")]
    AllCandidatesExhausted,

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("{operation} is already running")]
    AlreadyRunning { operation: OperationKind },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Attribute a driver failure to the named step of a sequence.
    pub fn at_step(step: impl ToString, err: routerkick_driver::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                step: step.to_string(),
            }
        } else if err.is_environment_missing() {
            Self::EnvironmentMissing {
                message: format!("{}: {err}", step.to_string()),
            }
        } else {
            Self::StepFailed {
                step: step.to_string(),
                reason: err.to_string(),
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
