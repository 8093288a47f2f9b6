// ── OS network-join capability ──
//
// Joins a wireless network the host already has credentials for, by name,
// through the platform's network tooling. No scanning, no passwords: the
// OS must already know the network.

use std::io;
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::Error;

/// Joins one known network by name.
#[async_trait]
pub trait NetworkJoiner: Send + Sync {
    /// `Ok(())` once the OS reports the join succeeded.
    async fn join(&self, network: &str) -> Result<(), Error>;
}

/// Which platform tool performs the join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinProgram {
    /// NetworkManager: `nmcli connection up id <name>`.
    Nmcli,
    /// Windows WLAN service: `netsh wlan connect name=<name>`.
    Netsh,
    /// macOS: `networksetup -setairportnetwork <interface> <name>`.
    Networksetup { interface: String },
}

impl JoinProgram {
    /// The default tool for the platform this binary was built for.
    pub fn for_host() -> Self {
        if cfg!(target_os = "windows") {
            Self::Netsh
        } else if cfg!(target_os = "macos") {
            Self::Networksetup {
                interface: "en0".into(),
            }
        } else {
            Self::Nmcli
        }
    }

    pub fn program(&self) -> &'static str {
        match self {
            Self::Nmcli => "nmcli",
            Self::Netsh => "netsh",
            Self::Networksetup { .. } => "networksetup",
        }
    }

    pub fn args(&self, network: &str) -> Vec<String> {
        match self {
            Self::Nmcli => vec![
                "connection".into(),
                "up".into(),
                "id".into(),
                network.into(),
            ],
            Self::Netsh => vec!["wlan".into(), "connect".into(), format!("name={network}")],
            Self::Networksetup { interface } => vec![
                "-setairportnetwork".into(),
                interface.clone(),
                network.into(),
            ],
        }
    }
}

/// Runs the platform join command as a child process.
#[derive(Debug, Clone)]
pub struct SystemNetworkJoiner {
    program: JoinProgram,
    timeout: Duration,
}

impl SystemNetworkJoiner {
    pub fn new(program: JoinProgram, timeout: Duration) -> Self {
        Self { program, timeout }
    }

    pub fn program(&self) -> &JoinProgram {
        &self.program
    }
}

impl Default for SystemNetworkJoiner {
    fn default() -> Self {
        Self::new(JoinProgram::for_host(), Duration::from_secs(30))
    }
}

#[async_trait]
impl NetworkJoiner for SystemNetworkJoiner {
    async fn join(&self, network: &str) -> Result<(), Error> {
        let program = self.program.program();
        let args = self.program.args(network);
        debug!(program, ?args, "running network join command");

        let run = Command::new(program)
            .args(&args)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| Error::Timeout {
                what: format!("`{program}` to join '{network}'"),
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| spawn_error(program, e))?;

        interpret_output(network, &output)
    }
}

fn spawn_error(program: &str, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        Error::MissingTool {
            program: program.into(),
        }
    } else {
        Error::Io(err)
    }
}

fn interpret_output(network: &str, output: &Output) -> Result<(), Error> {
    if output.status.success() {
        return Ok(());
    }

    // netsh reports its errors on stdout
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let reason = [stderr.trim(), stdout.trim()]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or("connection failed")
        .to_owned();

    Err(Error::JoinRejected {
        network: network.into(),
        reason,
    })
}
