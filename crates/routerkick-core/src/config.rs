// ── Runtime automation configuration ──
//
// These types describe *what* to automate: which router, which page
// flow credentials, which known networks, and how often. They never touch
// disk. The config crate builds a `RouterConfig` and hands it in through a
// `ConfigSource`, which operations query fresh each time they start.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use secrecy::SecretString;
use tracing::warn;

use routerkick_driver::LaunchOptions;

use crate::error::CoreError;

/// Placeholder substituted with `router_address` in the URL templates.
pub const ROUTER_IP_PLACEHOLDER: &str = "{router_ip}";

// ── Interval ─────────────────────────────────────────────────────

/// Unit of the scheduler interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum IntervalUnit {
    Seconds,
    Minutes,
    #[default]
    Hours,
}

impl IntervalUnit {
    /// Parse a unit label, falling back to [`Hours`](Self::Hours) for
    /// anything unrecognized. Never fails.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => Self::Seconds,
            "minutes" | "minute" | "mins" | "min" | "m" => Self::Minutes,
            "hours" | "hour" | "hrs" | "hr" | "h" => Self::Hours,
            other => {
                warn!(unit = other, "unrecognized interval unit, treating as hours");
                Self::Hours
            }
        }
    }

    pub fn as_secs(self) -> u64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 3600,
        }
    }
}

/// Resolve a raw `(value, unit label)` pair to a duration.
///
/// Unknown unit labels resolve as hours.
pub fn resolve_to_duration(value: u64, unit: &str) -> Duration {
    Duration::from_secs(value.saturating_mul(IntervalUnit::from_label(unit).as_secs()))
}

/// How long the scheduler waits between cycles. `value` is always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleInterval {
    value: u64,
    unit: IntervalUnit,
}

impl ScheduleInterval {
    pub fn new(value: u64, unit: IntervalUnit) -> Result<Self, CoreError> {
        if value == 0 {
            return Err(CoreError::ValidationFailed {
                message: "interval must be at least 1".into(),
            });
        }
        Ok(Self { value, unit })
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn unit(&self) -> IntervalUnit {
        self.unit
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.value.saturating_mul(self.unit.as_secs()))
    }
}

impl Default for ScheduleInterval {
    fn default() -> Self {
        Self {
            value: 24,
            unit: IntervalUnit::Hours,
        }
    }
}

impl fmt::Display for ScheduleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

// ── Timing ───────────────────────────────────────────────────────

/// Step timeouts and settle delays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    /// Bound on each wait-for-element step.
    pub element_timeout: Duration,
    /// Bound on the post-login redirect to the landing page.
    pub login_timeout: Duration,
    /// Pause between a successful Wi-Fi join and the reboot.
    pub post_join_settle: Duration,
    /// Pause after confirming the reboot before declaring success.
    pub post_reboot_settle: Duration,
    /// Bound on one OS network-join command.
    pub join_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            element_timeout: Duration::from_secs(10),
            login_timeout: Duration::from_secs(15),
            post_join_settle: Duration::from_secs(5),
            post_reboot_settle: Duration::from_secs(3),
            join_timeout: Duration::from_secs(30),
        }
    }
}

/// Browser process settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub window_size: (u32, u32),
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            window_size: (1920, 1080),
        }
    }
}

// ── RouterConfig ─────────────────────────────────────────────────

/// Concrete URLs after placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub login: String,
    pub landing: String,
    pub manage: String,
}

/// Everything one operation invocation needs. Immutable once built.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Host or IP of the router (e.g., `192.168.1.1`).
    pub router_address: String,
    pub login_url: String,
    pub landing_url: String,
    pub manage_url: String,
    pub username: String,
    /// May be empty; bad credentials surface as a runtime failure.
    pub password: SecretString,
    /// Attempt order == priority. No duplicates.
    pub known_networks: Vec<String>,
    pub interval: ScheduleInterval,
    pub timing: Timing,
    pub browser: BrowserOptions,
}

impl Default for RouterConfig {
    fn default() -> Self {
        let url = format!("http://{ROUTER_IP_PLACEHOLDER}/");
        Self {
            router_address: "192.168.1.1".into(),
            login_url: url.clone(),
            landing_url: url.clone(),
            manage_url: url,
            username: "user".into(),
            password: SecretString::from(String::new()),
            known_networks: Vec::new(),
            interval: ScheduleInterval::default(),
            timing: Timing::default(),
            browser: BrowserOptions::default(),
        }
    }
}

impl RouterConfig {
    /// Substitute `router_address` into the three URL templates.
    pub fn endpoints(&self) -> Endpoints {
        let resolve = |template: &str| template.replace(ROUTER_IP_PLACEHOLDER, &self.router_address);
        Endpoints {
            login: resolve(&self.login_url),
            landing: resolve(&self.landing_url),
            manage: resolve(&self.manage_url),
        }
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            executable: self.browser.executable.clone(),
            headless: self.browser.headless,
            window_size: self.browser.window_size,
            request_timeout: self.timing.login_timeout.max(self.timing.element_timeout),
        }
    }
}

// ── ConfigSource ─────────────────────────────────────────────────

/// Supplies the current configuration. Called once at the start of every
/// operation, so edits take effect on the next invocation.
pub trait ConfigSource: Send + Sync {
    fn current(&self) -> Result<RouterConfig, CoreError>;
}

/// In-memory source whose snapshot can be swapped at any time.
///
/// Readers get whatever snapshot was visible when they called
/// [`current`](ConfigSource::current); there is no further isolation.
#[derive(Debug)]
pub struct SharedConfig {
    inner: ArcSwap<RouterConfig>,
}

impl SharedConfig {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            inner: ArcSwap::from_pointee(config),
        }
    }

    pub fn replace(&self, config: RouterConfig) {
        self.inner.store(Arc::new(config));
    }

    pub fn snapshot(&self) -> Arc<RouterConfig> {
        self.inner.load_full()
    }
}

impl ConfigSource for SharedConfig {
    fn current(&self) -> Result<RouterConfig, CoreError> {
        Ok(RouterConfig::clone(&self.inner.load()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_each_unit() {
        assert_eq!(resolve_to_duration(5, "seconds"), Duration::from_secs(5));
        assert_eq!(resolve_to_duration(5, "minutes"), Duration::from_secs(300));
        assert_eq!(resolve_to_duration(5, "hours"), Duration::from_secs(18_000));
    }

    #[test]
    fn unrecognized_unit_falls_back_to_hours() {
        assert_eq!(
            resolve_to_duration(5, "unrecognized"),
            Duration::from_secs(18_000)
        );
        assert_eq!(IntervalUnit::from_label("fortnights"), IntervalUnit::Hours);
    }

    #[test]
    fn unit_labels_are_lenient() {
        assert_eq!(IntervalUnit::from_label(" Minutes "), IntervalUnit::Minutes);
        assert_eq!(IntervalUnit::from_label("s"), IntervalUnit::Seconds);
        assert_eq!(IntervalUnit::from_label("HR"), IntervalUnit::Hours);
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(ScheduleInterval::new(0, IntervalUnit::Seconds).is_err());
        let iv = ScheduleInterval::new(6, IntervalUnit::Hours).expect("valid");
        assert_eq!(iv.duration(), Duration::from_secs(6 * 3600));
        assert_eq!(iv.to_string(), "6 hours");
    }

    #[test]
    fn endpoints_substitute_router_address() {
        let config = RouterConfig {
            router_address: "10.0.0.1".into(),
            login_url: "http://{router_ip}/login.html".into(),
            landing_url: "http://{router_ip}/start.ghtml".into(),
            manage_url: "http://{router_ip}/mgmt/reboot.ghtml".into(),
            ..RouterConfig::default()
        };

        let ep = config.endpoints();
        assert_eq!(ep.login, "http://10.0.0.1/login.html");
        assert_eq!(ep.landing, "http://10.0.0.1/start.ghtml");
        assert_eq!(ep.manage, "http://10.0.0.1/mgmt/reboot.ghtml");
    }

    #[test]
    fn shared_config_serves_latest_snapshot() {
        let shared = SharedConfig::new(RouterConfig::default());
        assert!(shared.current().expect("config").known_networks.is_empty());

        shared.replace(RouterConfig {
            known_networks: vec!["Home-5G".into()],
            ..RouterConfig::default()
        });
        assert_eq!(
            shared.current().expect("config").known_networks,
            vec!["Home-5G".to_string()]
        );
    }
}
