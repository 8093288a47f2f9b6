use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the `routerkick-driver` crate.
///
/// Covers browser launch and page interaction failures as well as the OS
/// network-join command. `routerkick-core` maps these into operation failures.
#[derive(Debug, Error)]
pub enum Error {
    // ── Environment ─────────────────────────────────────────────────
    /// A configured browser executable does not exist.
    #[error("Browser executable not found at {}", path.display())]
    MissingExecutable { path: PathBuf },

    /// No browser was configured and none could be found on this host.
    #[error("no Chrome or Chromium installation found ({reason})")]
    MissingBrowser { reason: String },

    /// The network-join program is not installed or not on PATH.
    #[error("`{program}` is not installed or not on PATH")]
    MissingTool { program: String },

    // ── Browser ─────────────────────────────────────────────────────
    /// The browser process could not be configured or started.
    #[error("Browser launch failed: {0}")]
    Launch(String),

    /// Chrome DevTools protocol failure.
    #[error("DevTools protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    /// An element lookup failed outside of a wait.
    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    /// The session was used after `quit()`.
    #[error("Browser session already closed")]
    SessionClosed,

    // ── Waiting ─────────────────────────────────────────────────────
    /// A bounded wait elapsed before its condition held.
    #[error("Timed out after {timeout_secs}s waiting for {what}")]
    Timeout { what: String, timeout_secs: u64 },

    // ── Network join ────────────────────────────────────────────────
    /// The OS refused to join the named network.
    #[error("Joining '{network}' failed: {reason}")]
    JoinRejected { network: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if a required external program or binary is absent.
    pub fn is_environment_missing(&self) -> bool {
        matches!(
            self,
            Self::MissingExecutable { .. } | Self::MissingBrowser { .. } | Self::MissingTool { .. }
        )
    }

    /// Returns `true` if this error came from a bounded wait elapsing.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
