// ── Operations ──
//
// The two sub-operations the scheduler chains. Each is binary: it either
// succeeds or fails with a reason, never partially.

pub mod network_join;
pub mod reboot;

use crate::error::CoreError;

/// Coarse class of a failure, for callers that map outcomes to exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    #[default]
    Failed,
    Timeout,
    EnvironmentMissing,
}

impl From<&CoreError> for FailureKind {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::Timeout { .. } => Self::Timeout,
            CoreError::EnvironmentMissing { .. } => Self::EnvironmentMissing,
            _ => Self::Failed,
        }
    }
}

/// Outcome of one operation invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Optional detail, e.g. the network that was joined.
    Success(Option<String>),
    Failure { kind: FailureKind, reason: String },
}

impl OperationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Success(detail) => detail.as_deref(),
            Self::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { reason, .. } => Some(reason),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<&CoreError> for OperationResult {
    fn from(err: &CoreError) -> Self {
        Self::Failure {
            kind: FailureKind::from(err),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_keeps_error_class() {
        let result = OperationResult::from(&CoreError::Timeout {
            step: "confirm reboot".into(),
        });
        assert_eq!(result.failure_kind(), Some(FailureKind::Timeout));
        assert_eq!(result.failure_reason(), Some("confirm reboot timed out"));
        assert_eq!(result.detail(), None);

        let result = OperationResult::from(&CoreError::AllCandidatesExhausted);
        assert_eq!(result.failure_kind(), Some(FailureKind::Failed));
    }
}
