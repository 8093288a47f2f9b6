// ── ScheduledRecoveryLoop ──
//
// Idle -> Running on start, Running -> Stopping on stop, back to Idle once
// the loop task exits. Each cycle joins Wi-Fi and, only if that worked,
// reboots the router. Cycles never overlap: both operations run inline on
// the loop's own task. Cancellation is observed at the top of a cycle and
// during the inter-cycle wait; an in-flight operation runs to completion.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Local, TimeDelta};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{ConfigSource, ScheduleInterval};
use crate::error::CoreError;
use crate::event::{LoopState, OperationKind, ProgressSink, ScheduleStatus};
use crate::operation::network_join::NetworkJoin;
use crate::operation::reboot::DeviceReboot;

/// Owns the loop state and the background task that runs cycles.
pub struct ScheduledRecoveryLoop {
    cycle: Arc<Cycle>,
    status: Arc<watch::Sender<ScheduleStatus>>,
    task: Mutex<Option<LoopTask>>,
}

struct LoopTask {
    cancel: CancellationToken,
    // Held so the task is observable; never joined directly -- callers wait on status.
    _handle: JoinHandle<()>,
}

impl ScheduledRecoveryLoop {
    pub fn new(
        source: Arc<dyn ConfigSource>,
        reboot: DeviceReboot,
        join: NetworkJoin,
        sink: ProgressSink,
    ) -> Self {
        let (status, _) = watch::channel(ScheduleStatus::default());
        Self {
            cycle: Arc::new(Cycle {
                source,
                reboot,
                join,
                sink,
            }),
            status: Arc::new(status),
            task: Mutex::new(None),
        }
    }

    pub fn status(&self) -> ScheduleStatus {
        ScheduleStatus::clone(&self.status.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<ScheduleStatus> {
        self.status.subscribe()
    }

    /// Start the loop. Returns `Ok(false)` without side effects if a loop
    /// is already running or still stopping.
    ///
    /// The first cycle begins immediately. Must be called from within a
    /// tokio runtime.
    pub fn start(&self, parent: &CancellationToken) -> Result<bool, CoreError> {
        let mut slot = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if self.status.borrow().state != LoopState::Idle {
            debug!("scheduled loop already active, ignoring start");
            return Ok(false);
        }

        let interval = self.cycle.source.current()?.interval;
        let cancel = parent.child_token();

        publish(
            &self.status,
            &self.cycle.sink,
            ScheduleStatus {
                state: LoopState::Running,
                next_run_at: None,
            },
        );

        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.cycle),
            Arc::clone(&self.status),
            cancel.clone(),
            interval,
        ));
        *slot = Some(LoopTask {
            cancel,
            _handle: handle,
        });
        Ok(true)
    }

    /// Request the loop to stop. Returns `false` if it was not running.
    ///
    /// Wakes the inter-cycle wait immediately; use
    /// [`wait_idle`](Self::wait_idle) to observe the task exiting.
    pub fn stop(&self) -> bool {
        let slot = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if self.status.borrow().state != LoopState::Running {
            return false;
        }

        publish(
            &self.status,
            &self.cycle.sink,
            ScheduleStatus {
                state: LoopState::Stopping,
                next_run_at: None,
            },
        );
        if let Some(task) = slot.as_ref() {
            task.cancel.cancel();
        }
        true
    }

    /// Resolve once the loop is [`Idle`](LoopState::Idle).
    pub async fn wait_idle(&self) {
        let mut rx = self.status.subscribe();
        let _ = rx.wait_for(|s| s.state == LoopState::Idle).await;
    }
}

fn publish(
    status: &watch::Sender<ScheduleStatus>,
    sink: &ProgressSink,
    next: ScheduleStatus,
) {
    status.send_replace(next.clone());
    sink.schedule(next);
}

/// Resets the published state to Idle when the loop task ends, including
/// by panic.
struct IdleOnExit {
    status: Arc<watch::Sender<ScheduleStatus>>,
    sink: ProgressSink,
}

impl Drop for IdleOnExit {
    fn drop(&mut self) {
        publish(&self.status, &self.sink, ScheduleStatus::default());
        self.sink.log("scheduled task stopped");
    }
}

async fn run_loop(
    cycle: Arc<Cycle>,
    status: Arc<watch::Sender<ScheduleStatus>>,
    cancel: CancellationToken,
    mut interval: ScheduleInterval,
) {
    let sink = cycle.sink.clone();
    let _idle = IdleOnExit {
        status: Arc::clone(&status),
        sink: sink.clone(),
    };
    sink.log(format!("scheduled task started, every {interval}"));

    while !cancel.is_cancelled() {
        if let Some(next) = cycle.run().await {
            interval = next;
        }

        let wait = interval.duration();
        let next_run_at = TimeDelta::from_std(wait)
            .ok()
            .and_then(|d| Local::now().checked_add_signed(d));

        // A stop requested mid-cycle already published Stopping; keep it.
        let rescheduled = status.send_if_modified(|s| {
            if s.state == LoopState::Running {
                s.next_run_at = next_run_at;
                true
            } else {
                false
            }
        });
        if rescheduled {
            sink.schedule(ScheduleStatus::clone(&status.borrow()));
            match next_run_at {
                Some(at) => sink.log(format!(
                    "waiting {interval}, next run at {}",
                    at.format("%Y-%m-%d %H:%M:%S")
                )),
                None => sink.log(format!("waiting {interval} before the next run")),
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(wait) => {}
        }
    }
}

// ── Cycle ────────────────────────────────────────────────────────

struct Cycle {
    source: Arc<dyn ConfigSource>,
    reboot: DeviceReboot,
    join: NetworkJoin,
    sink: ProgressSink,
}

impl Cycle {
    /// One pass: join, then reboot only if the join succeeded.
    ///
    /// Returns the interval to wait next, read from the configuration as it
    /// stands after the cycle, or `None` if no configuration was readable.
    async fn run(&self) -> Option<ScheduleInterval> {
        let sink = &self.sink;
        sink.log("===== scheduled run started =====");

        let config = match self.source.current() {
            Ok(config) => config,
            Err(e) => {
                sink.warn(format!("could not read configuration, skipping this run: {e}"));
                return None;
            }
        };

        let join_sink = sink.for_operation(OperationKind::WifiJoin);
        let joined = self.join.execute(&config, &join_sink).await;
        join_sink.finished(&joined);

        if joined.is_success() {
            sink.log("wifi connected, rebooting router shortly...");
            tokio::time::sleep(config.timing.post_join_settle).await;

            match self.source.current() {
                Ok(fresh) => {
                    let reboot_sink = sink.for_operation(OperationKind::Reboot);
                    let rebooted = self.reboot.execute(&fresh, &reboot_sink).await;
                    reboot_sink.finished(&rebooted);
                }
                Err(e) => sink.warn(format!("could not read configuration, skipping reboot: {e}")),
            }
        } else {
            sink.warn("wifi join failed, skipping router reboot this run");
        }

        sink.log("===== scheduled run finished =====");
        Some(
            self.source
                .current()
                .map_or(config.interval, |latest| latest.interval),
        )
    }
}
