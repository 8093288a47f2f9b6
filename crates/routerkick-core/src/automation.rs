// ── Automation facade ──
//
// The single entry point for presentation layers. Cheaply cloneable;
// every trigger is fire-and-forget and returns as soon as the work has
// been handed to a background task. Progress and status flow back only
// through the event channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use routerkick_driver::{BrowserLauncher, NetworkJoiner};

use crate::config::ConfigSource;
use crate::error::CoreError;
use crate::event::{AutomationEvent, OperationKind, ProgressSink, ScheduleStatus};
use crate::operation::OperationResult;
use crate::operation::network_join::NetworkJoin;
use crate::operation::reboot::DeviceReboot;
use crate::schedule::ScheduledRecoveryLoop;

const EVENT_CHANNEL_SIZE: usize = 256;

#[derive(Clone)]
pub struct Automation {
    inner: Arc<AutomationInner>,
}

struct AutomationInner {
    source: Arc<dyn ConfigSource>,
    reboot: DeviceReboot,
    join: NetworkJoin,
    sink: ProgressSink,
    schedule: ScheduledRecoveryLoop,
    reboot_busy: AtomicBool,
    join_busy: AtomicBool,
    cancel: CancellationToken,
}

impl AutomationInner {
    fn busy_flag(&self, operation: OperationKind) -> &AtomicBool {
        match operation {
            OperationKind::Reboot => &self.reboot_busy,
            OperationKind::WifiJoin => &self.join_busy,
        }
    }
}

impl Automation {
    pub fn new(
        source: Arc<dyn ConfigSource>,
        launcher: Arc<dyn BrowserLauncher>,
        joiner: Arc<dyn NetworkJoiner>,
    ) -> Self {
        Self::with_operations(source, DeviceReboot::new(launcher), NetworkJoin::new(joiner))
    }

    pub fn with_operations(
        source: Arc<dyn ConfigSource>,
        reboot: DeviceReboot,
        join: NetworkJoin,
    ) -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let sink = ProgressSink::new(tx);
        let schedule = ScheduledRecoveryLoop::new(
            Arc::clone(&source),
            reboot.clone(),
            join.clone(),
            sink.clone(),
        );

        Self {
            inner: Arc::new(AutomationInner {
                source,
                reboot,
                join,
                sink,
                schedule,
                reboot_busy: AtomicBool::new(false),
                join_busy: AtomicBool::new(false),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Subscribe to progress, log, completion, and schedule events.
    pub fn events(&self) -> broadcast::Receiver<Arc<AutomationEvent>> {
        self.inner.sink.subscribe()
    }

    /// Subscribe to the latest schedule status.
    pub fn schedule_status(&self) -> watch::Receiver<ScheduleStatus> {
        self.inner.schedule.subscribe()
    }

    // ── One-off triggers ─────────────────────────────────────────

    /// Reboot the router once, in the background.
    ///
    /// Fails with [`CoreError::AlreadyRunning`] if a one-off reboot is still
    /// in flight.
    pub fn start_reboot(&self) -> Result<JoinHandle<OperationResult>, CoreError> {
        self.spawn_one_off(OperationKind::Reboot)
    }

    /// Join the first reachable known network, in the background.
    pub fn start_wifi_join(&self) -> Result<JoinHandle<OperationResult>, CoreError> {
        self.spawn_one_off(OperationKind::WifiJoin)
    }

    fn spawn_one_off(
        &self,
        operation: OperationKind,
    ) -> Result<JoinHandle<OperationResult>, CoreError> {
        let busy = BusyGuard::acquire(&self.inner, operation)?;
        let inner = Arc::clone(&self.inner);
        debug!(%operation, "starting one-off operation");

        Ok(tokio::spawn(async move {
            let sink = inner.sink.for_operation(operation);
            let result = match inner.source.current() {
                Ok(config) => match operation {
                    OperationKind::Reboot => inner.reboot.execute(&config, &sink).await,
                    OperationKind::WifiJoin => inner.join.execute(&config, &sink).await,
                },
                Err(e) => sink.fail(&e),
            };
            // Release before announcing so a listener may re-trigger at once.
            drop(busy);
            sink.finished(&result);
            result
        }))
    }

    // ── Schedule ─────────────────────────────────────────────────

    /// Start the recurring join-then-reboot loop. `Ok(false)` if one is
    /// already active.
    pub fn start_schedule(&self) -> Result<bool, CoreError> {
        self.inner.schedule.start(&self.inner.cancel)
    }

    /// Ask the loop to stop. `false` if it was not running.
    pub fn stop_schedule(&self) -> bool {
        self.inner.schedule.stop()
    }

    pub async fn wait_schedule_idle(&self) {
        self.inner.schedule.wait_idle().await;
    }

    /// Stop the loop and cancel everything derived from this facade.
    pub async fn shutdown(&self) {
        self.inner.schedule.stop();
        self.inner.cancel.cancel();
        self.inner.schedule.wait_idle().await;
    }
}

/// Marks a one-off operation as in flight until dropped.
struct BusyGuard {
    inner: Arc<AutomationInner>,
    operation: OperationKind,
}

impl BusyGuard {
    fn acquire(inner: &Arc<AutomationInner>, operation: OperationKind) -> Result<Self, CoreError> {
        inner
            .busy_flag(operation)
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CoreError::AlreadyRunning { operation })?;
        Ok(Self {
            inner: Arc::clone(inner),
            operation,
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner
            .busy_flag(self.operation)
            .store(false, Ordering::Release);
    }
}
