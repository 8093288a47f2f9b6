// routerkick-core: Wi-Fi reconnection, browser-driven router reboot, and the
// scheduled loop that chains them. Presentation layers (CLI today) drive it
// through `Automation` and observe it through `AutomationEvent`s.

pub mod automation;
pub mod config;
pub mod error;
pub mod event;
pub mod operation;
pub mod schedule;

// ── Primary re-exports ──────────────────────────────────────────────
pub use automation::Automation;
pub use config::{
    BrowserOptions, ConfigSource, Endpoints, IntervalUnit, ROUTER_IP_PLACEHOLDER, RouterConfig,
    ScheduleInterval, SharedConfig, Timing, resolve_to_duration,
};
pub use error::CoreError;
pub use event::{
    AutomationEvent, LogLine, LoopState, OperationKind, ProgressSink, ScheduleStatus,
};
pub use operation::network_join::NetworkJoin;
pub use operation::reboot::{DeviceReboot, PageFlow, RebootStep};
pub use operation::{FailureKind, OperationResult};
pub use schedule::ScheduledRecoveryLoop;

// Capabilities consumers plug in.
pub use routerkick_driver::{
    BrowserLauncher, BrowserSession, ChromeLauncher, JoinProgram, LaunchOptions, NetworkJoiner,
    Selector, SystemNetworkJoiner, WaitCondition,
};
