//! Profile storage for routerkick.
//!
//! TOML profiles, password resolution (env + keyring + plaintext), profile
//! and known-network editing, and translation to
//! `routerkick_core::RouterConfig`. The CLI layers flag overrides on top.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use routerkick_core::{
    BrowserOptions, ConfigSource, CoreError, IntervalUnit, ROUTER_IP_PLACEHOLDER, RouterConfig,
    ScheduleInterval, Timing,
};

/// The profile that always exists and can never be removed.
pub const DEFAULT_PROFILE: &str = "default";

/// Overrides every other password source when set.
pub const PASSWORD_ENV: &str = "ROUTERKICK_PASSWORD";

const KEYRING_SERVICE: &str = "routerkick";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("profile '{name}' already exists")]
    ProfileExists { name: String },

    #[error("the '{name}' profile cannot be removed")]
    ProtectedProfile { name: String },

    #[error("network '{network}' is not in profile '{profile}'")]
    NetworkNotFound { profile: String, network: String },

    #[error("network '{network}' is already in profile '{profile}'")]
    DuplicateNetwork { profile: String, network: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<ConfigError> for CoreError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { .. } => CoreError::ValidationFailed {
                message: err.to_string(),
            },
            other => CoreError::Config {
                message: other.to_string(),
            },
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    /// Named router profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            profiles: BTreeMap::from([(DEFAULT_PROFILE.to_string(), Profile::default())]),
        }
    }
}

/// One router plus the networks and schedule that go with it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Profile {
    /// Router host or IP (e.g., "192.168.1.1").
    pub router_ip: String,

    /// URL templates; `{router_ip}` is substituted at run time.
    pub login_url: String,
    pub start_page_url: String,
    pub manage_url: String,

    pub username: String,

    /// Plaintext password (prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Known networks, in join priority order.
    pub wifi_list: Vec<String>,

    pub auto_interval: u64,

    /// "seconds", "minutes" or "hours"; anything else counts as hours.
    pub interval_unit: String,

    /// Browser executable; auto-detected when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,

    /// Show the browser window while rebooting.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub show_browser: bool,

    #[serde(skip_serializing_if = "TimingOverrides::is_empty")]
    pub timing: TimingOverrides,
}

impl Default for Profile {
    fn default() -> Self {
        let url = format!("http://{ROUTER_IP_PLACEHOLDER}/");
        Self {
            router_ip: "192.168.1.1".into(),
            login_url: url.clone(),
            start_page_url: url.clone(),
            manage_url: url,
            username: "user".into(),
            password: None,
            wifi_list: Vec::new(),
            auto_interval: 24,
            interval_unit: IntervalUnit::Hours.to_string(),
            chrome_path: None,
            show_browser: false,
            timing: TimingOverrides::default(),
        }
    }
}

/// Per-profile overrides of step timeouts and settle delays, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_join_settle: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_reboot_settle: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_timeout: Option<u64>,
}

impl TimingOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, base: Timing) -> Timing {
        let or = |value: Option<u64>, fallback: Duration| value.map_or(fallback, Duration::from_secs);
        Timing {
            element_timeout: or(self.element_timeout, base.element_timeout),
            login_timeout: or(self.login_timeout, base.login_timeout),
            post_join_settle: or(self.post_join_settle, base.post_join_settle),
            post_reboot_settle: or(self.post_reboot_settle, base.post_reboot_settle),
            join_timeout: or(self.join_timeout, base.join_timeout),
        }
    }
}

// ── Profile editing ─────────────────────────────────────────────────

impl Profile {
    /// Validated scheduler interval.
    pub fn interval(&self) -> Result<ScheduleInterval, ConfigError> {
        ScheduleInterval::new(self.auto_interval, IntervalUnit::from_label(&self.interval_unit))
            .map_err(|_| ConfigError::Validation {
                field: "auto_interval".into(),
                reason: "must be at least 1".into(),
            })
    }

    pub fn add_network(&mut self, profile: &str, network: &str) -> Result<(), ConfigError> {
        let network = non_empty_network(network)?;
        if self.wifi_list.iter().any(|n| n == network) {
            return Err(ConfigError::DuplicateNetwork {
                profile: profile.into(),
                network: network.into(),
            });
        }
        self.wifi_list.push(network.into());
        Ok(())
    }

    /// Rename in place, keeping the network's priority.
    pub fn rename_network(&mut self, profile: &str, from: &str, to: &str) -> Result<(), ConfigError> {
        let to = non_empty_network(to)?;
        let index = self.network_index(profile, from)?;
        if from != to && self.wifi_list.iter().any(|n| n == to) {
            return Err(ConfigError::DuplicateNetwork {
                profile: profile.into(),
                network: to.into(),
            });
        }
        self.wifi_list[index] = to.into();
        Ok(())
    }

    pub fn remove_network(&mut self, profile: &str, network: &str) -> Result<(), ConfigError> {
        let index = self.network_index(profile, network)?;
        self.wifi_list.remove(index);
        Ok(())
    }

    fn network_index(&self, profile: &str, network: &str) -> Result<usize, ConfigError> {
        self.wifi_list
            .iter()
            .position(|n| n == network)
            .ok_or_else(|| ConfigError::NetworkNotFound {
                profile: profile.into(),
                network: network.into(),
            })
    }

    /// Copy safe to print: any plaintext password is masked.
    pub fn redacted(&self) -> Self {
        Self {
            password: self.password.as_ref().map(|_| "********".into()),
            ..self.clone()
        }
    }
}

fn non_empty_network(network: &str) -> Result<&str, ConfigError> {
    let trimmed = network.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Validation {
            field: "network".into(),
            reason: "name must not be empty".into(),
        });
    }
    Ok(trimmed)
}

impl Config {
    /// The profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles.get(name).ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }

    pub fn profile_mut(&mut self, name: &str) -> Result<&mut Profile, ConfigError> {
        self.profiles
            .get_mut(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }

    pub fn set_default(&mut self, name: &str) -> Result<(), ConfigError> {
        self.profile(name)?;
        self.default_profile = Some(name.into());
        Ok(())
    }

    /// Save `from` under a new name.
    pub fn copy_profile(&mut self, from: &str, to: &str) -> Result<(), ConfigError> {
        let to = to.trim();
        if to.is_empty() {
            return Err(ConfigError::Validation {
                field: "profile".into(),
                reason: "name must not be empty".into(),
            });
        }
        if self.profiles.contains_key(to) {
            return Err(ConfigError::ProfileExists { name: to.into() });
        }
        let copy = self.profile(from)?.clone();
        self.profiles.insert(to.into(), copy);
        Ok(())
    }

    /// Remove a profile. If it was the default, `default` takes over.
    pub fn remove_profile(&mut self, name: &str) -> Result<Profile, ConfigError> {
        if name == DEFAULT_PROFILE {
            return Err(ConfigError::ProtectedProfile { name: name.into() });
        }
        let removed = self
            .profiles
            .remove(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })?;
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = Some(DEFAULT_PROFILE.into());
        }
        Ok(removed)
    }

    /// Restore defaults for every field except the known-network list.
    pub fn reset_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        let profile = self.profile_mut(name)?;
        let wifi_list = std::mem::take(&mut profile.wifi_list);
        *profile = Profile {
            wifi_list,
            ..Profile::default()
        };
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "routerkick", "routerkick").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("routerkick");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load config from `path` + environment. A missing file yields defaults.
///
/// Environment keys nest with a double underscore, e.g.
/// `ROUTERKICK_PROFILES__HOME__ROUTER_IP`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ROUTERKICK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))?)
}

/// Resolve the router password: env var, then keyring, then plaintext.
///
/// An unset password resolves to empty; a wrong one only surfaces when
/// the login page rejects it.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> SecretString {
    let from_keyring = || {
        keyring_entry(profile_name)
            .ok()
            .and_then(|entry| entry.get_password().ok())
    };
    password_chain(
        std::env::var(PASSWORD_ENV).ok(),
        from_keyring,
        profile.password.as_deref(),
    )
}

fn password_chain(
    env: Option<String>,
    from_keyring: impl FnOnce() -> Option<String>,
    plaintext: Option<&str>,
) -> SecretString {
    // 1. Env var
    if let Some(pw) = env {
        return SecretString::from(pw);
    }

    // 2. Keyring
    if let Some(pw) = from_keyring() {
        return SecretString::from(pw);
    }

    // 3. Plaintext in config
    SecretString::from(plaintext.unwrap_or_default().to_owned())
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Forget a profile's keyring password. Absent entries are not an error.
pub fn delete_password(profile_name: &str) -> Result<(), ConfigError> {
    match keyring_entry(profile_name)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

// ── Translation to core ─────────────────────────────────────────────

/// Build a `RouterConfig` from a profile, resolving its password.
pub fn profile_to_router_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<RouterConfig, ConfigError> {
    build_router_config(profile, resolve_password(profile, profile_name))
}

fn build_router_config(profile: &Profile, password: SecretString) -> Result<RouterConfig, ConfigError> {
    for (field, value) in [
        ("router_ip", &profile.router_ip),
        ("login_url", &profile.login_url),
        ("start_page_url", &profile.start_page_url),
        ("manage_url", &profile.manage_url),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: field.into(),
                reason: "must not be empty".into(),
            });
        }
    }

    if let Some(network) = first_duplicate(&profile.wifi_list) {
        return Err(ConfigError::Validation {
            field: "wifi_list".into(),
            reason: format!("network '{network}' is listed more than once"),
        });
    }

    let base = RouterConfig::default();
    Ok(RouterConfig {
        router_address: profile.router_ip.trim().to_owned(),
        login_url: profile.login_url.clone(),
        landing_url: profile.start_page_url.clone(),
        manage_url: profile.manage_url.clone(),
        username: profile.username.clone(),
        password,
        known_networks: profile.wifi_list.clone(),
        interval: profile.interval()?,
        timing: profile.timing.apply(base.timing),
        browser: BrowserOptions {
            executable: profile.chrome_path.clone(),
            headless: !profile.show_browser,
            ..base.browser
        },
    })
}

fn first_duplicate(networks: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    networks
        .iter()
        .map(String::as_str)
        .find(|n| !seen.insert(*n))
}

// ── ConfigSource over the file ──────────────────────────────────────

/// Re-reads the config file on every `current()` call, so edits made
/// while the scheduler runs apply from the next operation on.
#[derive(Debug, Clone)]
pub struct FileProfileSource {
    path: PathBuf,
    /// `None` follows whatever `default_profile` says at read time.
    profile: Option<String>,
}

impl FileProfileSource {
    pub fn new(path: impl Into<PathBuf>, profile: Option<String>) -> Self {
        Self {
            path: path.into(),
            profile,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file and pick the profile this source follows.
    pub fn load(&self) -> Result<(String, Profile), ConfigError> {
        let cfg = load_config_from(&self.path)?;
        let name = self
            .profile
            .clone()
            .unwrap_or_else(|| cfg.active_profile_name().to_owned());
        let profile = cfg.profile(&name)?.clone();
        Ok((name, profile))
    }
}

impl ConfigSource for FileProfileSource {
    fn current(&self) -> Result<RouterConfig, CoreError> {
        let (name, profile) = self.load()?;
        Ok(profile_to_router_config(&profile, &name)?)
    }
}
