// ── Progress / log / status port ──
//
// Operations never talk to a UI. They push `AutomationEvent`s into a
// broadcast channel through a `ProgressSink`; any presentation layer
// subscribes and renders them however it likes.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::operation::OperationResult;

/// The two one-off operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum OperationKind {
    #[strum(to_string = "router reboot")]
    Reboot,
    #[strum(to_string = "wifi join")]
    WifiJoin,
}

/// Lifecycle of the scheduled loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum LoopState {
    #[default]
    Idle,
    Running,
    Stopping,
}

/// Published on start, on stop, and at the beginning of every wait.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScheduleStatus {
    pub state: LoopState,
    pub next_run_at: Option<DateTime<Local>>,
}

/// One timestamped, append-only log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub at: DateTime<Local>,
    pub message: String,
}

impl LogLine {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            at: Local::now(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomationEvent {
    /// Not cumulative: each replaces the previous progress of `operation`.
    Progress {
        operation: OperationKind,
        percent: u8,
        message: String,
    },
    Log(LogLine),
    Finished {
        operation: OperationKind,
        result: OperationResult,
    },
    Schedule(ScheduleStatus),
}

/// Write side of the event channel, optionally tagged with the operation
/// it reports for.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: broadcast::Sender<Arc<AutomationEvent>>,
    operation: Option<OperationKind>,
}

impl ProgressSink {
    pub fn new(tx: broadcast::Sender<Arc<AutomationEvent>>) -> Self {
        Self {
            tx,
            operation: None,
        }
    }

    /// A sink whose progress and completion events belong to `operation`.
    pub fn for_operation(&self, operation: OperationKind) -> Self {
        Self {
            tx: self.tx.clone(),
            operation: Some(operation),
        }
    }

    pub fn operation(&self) -> Option<OperationKind> {
        self.operation
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<AutomationEvent>> {
        self.tx.subscribe()
    }

    fn emit(&self, event: AutomationEvent) {
        // No subscribers is fine: nobody is watching.
        let _ = self.tx.send(Arc::new(event));
    }

    pub fn progress(&self, percent: u8, message: impl Into<String>) {
        if let Some(operation) = self.operation {
            self.emit(AutomationEvent::Progress {
                operation,
                percent: percent.min(100),
                message: message.into(),
            });
        }
    }

    pub fn log(&self, message: impl Into<String>) {
        let line = LogLine::now(message);
        info!(operation = ?self.operation, "{}", line.message);
        self.emit(AutomationEvent::Log(line));
    }

    /// Like [`log`](Self::log), but traced at warn level.
    pub fn warn(&self, message: impl Into<String>) {
        let line = LogLine::now(message);
        warn!(operation = ?self.operation, "{}", line.message);
        self.emit(AutomationEvent::Log(line));
    }

    /// Report a failed operation: one log line, progress reset to zero.
    pub fn fail(&self, err: &CoreError) -> OperationResult {
        match self.operation {
            Some(op) => self.warn(format!("{op} failed: {err}")),
            None => self.warn(format!("failed: {err}")),
        }
        self.progress(0, format!("failed: {err}"));
        OperationResult::from(err)
    }

    pub fn finished(&self, result: &OperationResult) {
        if let Some(operation) = self.operation {
            self.emit(AutomationEvent::Finished {
                operation,
                result: result.clone(),
            });
        }
    }

    pub fn schedule(&self, status: ScheduleStatus) {
        self.emit(AutomationEvent::Schedule(status));
    }
}
