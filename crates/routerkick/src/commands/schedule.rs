//! `schedule run`: the join-then-reboot loop in the foreground.

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use routerkick_core::{AutomationEvent, LoopState};

use crate::cli::{GlobalOpts, ScheduleRunArgs};
use crate::config::Overrides;
use crate::error::CliError;
use crate::output::{self, EventRenderer};

pub async fn run(args: ScheduleRunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let overrides = Overrides::from_browser(&args.browser).with_interval(args.interval, args.unit);
    let session = super::connect(global, overrides)?;
    // Networks may still be added while the loop runs; each cycle re-reads them.
    if session.networks == 0 {
        warn!(profile = %session.profile, "schedule started with no known networks");
        if !global.quiet {
            eprintln!(
                "warning: profile '{}' has no known networks, so every run will skip the reboot \
                 until one is added with `routerkick networks add <SSID>`",
                session.profile
            );
        }
    }

    let automation = session.automation;
    let mut events = automation.events();
    let mut renderer = EventRenderer::new(global);

    automation.start_schedule()?;
    info!(profile = %session.profile, "schedule started");
    if !global.quiet {
        eprintln!("Running profile '{}'. Press Ctrl-C to stop.", session.profile);
    }

    let mut stopping = false;
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                if stopping {
                    // Second Ctrl-C: abandon the in-flight operation.
                    return Err(CliError::Interrupted);
                }
                stopping = true;
                automation.stop_schedule();
                output::print_done(global, "stop requested, finishing the current step...");
            }
            event = events.recv() => match event {
                Ok(event) => {
                    renderer.render(&event);
                    if matches!(&*event, AutomationEvent::Schedule(s) if s.state == LoopState::Idle) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "dropped schedule events"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}
