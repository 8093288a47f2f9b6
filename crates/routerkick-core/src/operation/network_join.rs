// ── NetworkJoinOperation ──
//
// Walks the known-network list in priority order until one join succeeds.
// A single failed attempt is logged and skipped; only exhausting the
// whole list fails the operation.

use std::sync::Arc;

use tracing::debug;

use routerkick_driver::NetworkJoiner;

use crate::config::RouterConfig;
use crate::error::CoreError;
use crate::event::ProgressSink;
use crate::operation::OperationResult;

const BASE_PERCENT: usize = 10;
const SPAN_PERCENT: usize = 80;

#[derive(Clone)]
pub struct NetworkJoin {
    joiner: Arc<dyn NetworkJoiner>,
}

impl NetworkJoin {
    pub fn new(joiner: Arc<dyn NetworkJoiner>) -> Self {
        Self { joiner }
    }

    pub async fn execute(&self, config: &RouterConfig, sink: &ProgressSink) -> OperationResult {
        let networks = &config.known_networks;
        if networks.is_empty() {
            return sink.fail(&CoreError::NoConfiguredNetworks);
        }

        sink.log("connecting to wifi...");
        sink.progress(10, "starting wifi join");

        for (index, network) in networks.iter().enumerate() {
            sink.progress(
                attempt_percent(index, networks.len()),
                format!("trying {network}"),
            );
            debug!(network = %network, attempt = index + 1, "joining network");

            match self.joiner.join(network).await {
                Ok(()) => {
                    sink.log(format!("connected to {network}"));
                    sink.progress(100, format!("connected: {network}"));
                    return OperationResult::Success(Some(network.clone()));
                }
                Err(e) => sink.warn(format!("failed to join {network}: {e}")),
            }
        }

        sink.fail(&CoreError::AllCandidatesExhausted)
    }
}

/// Progress shown while attempt `index` (0-based) of `total` is in flight.
fn attempt_percent(index: usize, total: usize) -> u8 {
    let percent = BASE_PERCENT + index * SPAN_PERCENT / total.max(1);
    u8::try_from(percent).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::attempt_percent;

    #[test]
    fn attempts_advance_evenly_from_ten() {
        assert_eq!(attempt_percent(0, 1), 10);
        assert_eq!(attempt_percent(0, 4), 10);
        assert_eq!(attempt_percent(1, 4), 30);
        assert_eq!(attempt_percent(3, 4), 70);
        assert_eq!(attempt_percent(2, 3), 63);
    }
}
