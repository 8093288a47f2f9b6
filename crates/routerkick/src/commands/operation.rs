//! One-off `reboot` and `wifi connect` handlers.

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use routerkick_core::{AutomationEvent, OperationKind, OperationResult};

use crate::cli::{BrowserArgs, GlobalOpts};
use crate::config::Overrides;
use crate::error::CliError;
use crate::output::EventRenderer;

/// Trigger one operation and render its events until it finishes.
pub async fn run(
    operation: OperationKind,
    browser: &BrowserArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = super::connect(global, Overrides::from_browser(browser))?;
    if operation == OperationKind::WifiJoin && session.networks == 0 {
        return Err(CliError::NoNetworks {
            profile: session.profile,
        });
    }

    let mut events = session.automation.events();
    let handle = match operation {
        OperationKind::Reboot => session.automation.start_reboot()?,
        OperationKind::WifiJoin => session.automation.start_wifi_join()?,
    };
    debug!(%operation, profile = %session.profile, "operation started");

    let mut renderer = EventRenderer::new(global);
    loop {
        match events.recv().await {
            Ok(event) => {
                renderer.render(&event);
                if matches!(*event, AutomationEvent::Finished { operation: op, .. } if op == operation)
                {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "dropped progress events"),
            Err(RecvError::Closed) => break,
        }
    }

    let result = handle
        .await
        .map_err(|e| CliError::Internal(format!("{operation} task failed: {e}")))?;

    match result {
        OperationResult::Success(_) => Ok(()),
        OperationResult::Failure { kind, reason } => {
            Err(CliError::from_failure(operation, kind, reason))
        }
    }
}
