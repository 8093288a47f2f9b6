// Scripted stand-ins for the browser and network-join capabilities.
#![allow(dead_code, clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use routerkick_core::{
    AutomationEvent, BrowserLauncher, BrowserSession, FailureKind, LaunchOptions, NetworkJoiner,
    OperationResult, ProgressSink, RouterConfig, Selector, WaitCondition,
};
use routerkick_driver::Error;

pub const LANDING_URL: &str = "http://192.168.1.1/landing.htm";

// ── Browser ─────────────────────────────────────────────────────────

/// What the fake browser did, shared across every session it launched.
#[derive(Debug, Default)]
pub struct BrowserLog {
    pub launches: AtomicUsize,
    pub quits: AtomicUsize,
    pub actions: Mutex<Vec<String>>,
}

impl BrowserLog {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    fn record(&self, action: String) {
        self.actions.lock().unwrap().push(action);
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    pub log: Arc<BrowserLog>,
    /// Waits on this selector time out.
    pub missing: Option<String>,
    /// The post-login redirect never happens.
    pub stuck_after_login: bool,
    pub launch_fails: bool,
    /// The action whose log entry starts with this fails. Navigation
    /// reports a closed session, clicks and fills a vanished element.
    pub fault: Option<String>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing(selector: &str) -> Self {
        Self {
            missing: Some(selector.into()),
            ..Self::default()
        }
    }

    pub fn faulting(action: &str) -> Self {
        Self {
            fault: Some(action.into()),
            ..Self::default()
        }
    }

    /// Record `action` and report whether it should fail.
    fn act(&self, action: String) -> bool {
        let faulted = self
            .fault
            .as_deref()
            .is_some_and(|prefix| action.starts_with(prefix));
        self.log.record(action);
        faulted
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, _options: &LaunchOptions) -> Result<Box<dyn BrowserSession>, Error> {
        self.log.launches.fetch_add(1, Ordering::SeqCst);
        if self.launch_fails {
            return Err(Error::MissingExecutable {
                path: "/nonexistent/chrome".into(),
            });
        }
        Ok(Box::new(FakeSession {
            launcher: self.clone(),
            url: "about:blank".into(),
        }))
    }
}

struct FakeSession {
    launcher: FakeLauncher,
    url: String,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), Error> {
        if self.launcher.act(format!("navigate {url}")) {
            return Err(Error::SessionClosed);
        }
        self.url = url.into();
        Ok(())
    }

    async fn wait_for(
        &mut self,
        selector: &Selector,
        _condition: WaitCondition,
        timeout: Duration,
    ) -> Result<(), Error> {
        if self.launcher.missing.as_deref() == Some(selector.as_str()) {
            tokio::time::sleep(timeout).await;
            return Err(Error::Timeout {
                what: selector.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
        Ok(())
    }

    async fn click(&mut self, selector: &Selector) -> Result<(), Error> {
        if self.launcher.act(format!("click {selector}")) {
            return Err(Error::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        if selector.as_str() == "input[type='submit']" && !self.launcher.stuck_after_login {
            self.url = LANDING_URL.into();
        }
        Ok(())
    }

    async fn fill(&mut self, selector: &Selector, text: &str) -> Result<(), Error> {
        if self.launcher.act(format!("fill {selector} {text}")) {
            return Err(Error::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, Error> {
        Ok(self.url.clone())
    }

    async fn quit(&mut self) -> Result<(), Error> {
        self.launcher.log.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Network join ────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeJoiner {
    /// Networks that accept a join.
    pub reachable: Vec<String>,
    /// How long every join attempt takes.
    pub delay: Duration,
    pub attempts: Mutex<Vec<String>>,
}

impl FakeJoiner {
    pub fn reaching(networks: &[&str]) -> Self {
        Self {
            reachable: networks.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl NetworkJoiner for FakeJoiner {
    async fn join(&self, network: &str) -> Result<(), Error> {
        self.attempts.lock().unwrap().push(network.into());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.reachable.iter().any(|n| n == network) {
            Ok(())
        } else {
            Err(Error::JoinRejected {
                network: network.into(),
                reason: "network not in range".into(),
            })
        }
    }
}

// ── Config / events ─────────────────────────────────────────────────

pub fn failed(kind: FailureKind, reason: &str) -> OperationResult {
    OperationResult::Failure {
        kind,
        reason: reason.into(),
    }
}

pub fn router_config(networks: &[&str]) -> RouterConfig {
    RouterConfig {
        landing_url: "http://{router_ip}/landing.htm".into(),
        manage_url: "http://{router_ip}/manage.htm".into(),
        password: "hunter2".to_string().into(),
        known_networks: networks.iter().map(ToString::to_string).collect(),
        ..RouterConfig::default()
    }
}

pub fn channel() -> (ProgressSink, broadcast::Receiver<Arc<AutomationEvent>>) {
    let (tx, rx) = broadcast::channel(512);
    (ProgressSink::new(tx), rx)
}

/// Everything currently buffered on `rx`.
pub fn drain(rx: &mut broadcast::Receiver<Arc<AutomationEvent>>) -> Vec<Arc<AutomationEvent>> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn log_messages(events: &[Arc<AutomationEvent>]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e.as_ref() {
            AutomationEvent::Log(line) => Some(line.message.clone()),
            _ => None,
        })
        .collect()
}

pub fn progress_values(events: &[Arc<AutomationEvent>]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e.as_ref() {
            AutomationEvent::Progress { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect()
}
