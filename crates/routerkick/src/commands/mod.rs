//! Command handlers: bridge CLI args to the automation core and output.

pub mod config_cmd;
pub mod networks;
pub mod operation;
pub mod schedule;
pub mod util;

use std::sync::Arc;

use tracing::debug;

use routerkick_core::{
    Automation, ChromeLauncher, ConfigSource, JoinProgram, SystemNetworkJoiner,
};

use crate::cli::GlobalOpts;
use crate::config::{self, Overrides};
use crate::error::CliError;

/// A ready-to-trigger automation bound to one profile.
pub struct Session {
    pub automation: Automation,
    pub profile: String,
    pub networks: usize,
}

/// Resolve the profile, validate it once up front, and wire the real
/// browser and network capabilities into an [`Automation`].
pub fn connect(global: &GlobalOpts, overrides: Overrides) -> Result<Session, CliError> {
    let cfg = config::load(global)?;
    let (profile, source) = config::source(global, &cfg, overrides)?;

    // Fail fast on a bad profile instead of inside the first operation.
    let router = source.current()?;
    let joiner = SystemNetworkJoiner::new(JoinProgram::for_host(), router.timing.join_timeout);
    debug!(
        profile = %profile,
        router = %router.router_address,
        program = joiner.program().program(),
        "automation ready"
    );

    Ok(Session {
        automation: Automation::new(source, Arc::new(ChromeLauncher), Arc::new(joiner)),
        profile,
        networks: router.known_networks.len(),
    })
}
