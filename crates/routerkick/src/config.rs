//! CLI configuration: thin wrapper around `routerkick_config`.
//!
//! Adds `GlobalOpts`-aware resolution (--config, --profile) and the
//! per-invocation overrides (--interval, --unit, --chrome, --show-browser)
//! that are layered over every configuration read.

use std::path::PathBuf;
use std::sync::Arc;

use routerkick_core::{ConfigSource, CoreError, IntervalUnit, RouterConfig, ScheduleInterval};

use crate::cli::{BrowserArgs, GlobalOpts, IntervalUnitArg};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use routerkick_config::{Config, DEFAULT_PROFILE, FileProfileSource, Profile};

// ── File resolution ─────────────────────────────────────────────────

/// `--config` / `ROUTERKICK_CONFIG`, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(routerkick_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = config_path(global);
    routerkick_config::load_config_from(&path).map_err(|source| CliError::ConfigLoad {
        path: path.display().to_string(),
        source,
    })
}

pub fn save(global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    routerkick_config::save_config_to(cfg, &config_path(global))?;
    Ok(())
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| cfg.active_profile_name().to_owned())
}

/// Like [`active_profile_name`], but the profile must exist.
pub fn require_profile(global: &GlobalOpts, cfg: &Config) -> Result<String, CliError> {
    let name = active_profile_name(global, cfg);
    if cfg.profiles.contains_key(&name) {
        Ok(name)
    } else {
        Err(CliError::ProfileNotFound {
            name,
            available: cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
        })
    }
}

// ── Per-invocation overrides ────────────────────────────────────────

/// Flag values that win over whatever the profile says.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub interval: Option<u64>,
    pub unit: Option<IntervalUnit>,
    pub chrome: Option<PathBuf>,
    pub show_browser: bool,
}

impl Overrides {
    pub fn from_browser(args: &BrowserArgs) -> Self {
        Self {
            chrome: args.chrome.clone(),
            show_browser: args.show_browser,
            ..Self::default()
        }
    }

    pub fn with_interval(mut self, interval: Option<u64>, unit: Option<IntervalUnitArg>) -> Self {
        self.interval = interval;
        self.unit = unit.map(|u| match u {
            IntervalUnitArg::Seconds => IntervalUnit::Seconds,
            IntervalUnitArg::Minutes => IntervalUnit::Minutes,
            IntervalUnitArg::Hours => IntervalUnit::Hours,
        });
        self
    }

    pub fn apply(&self, cfg: &mut RouterConfig) -> Result<(), CoreError> {
        if self.interval.is_some() || self.unit.is_some() {
            cfg.interval = ScheduleInterval::new(
                self.interval.unwrap_or(cfg.interval.value()),
                self.unit.unwrap_or(cfg.interval.unit()),
            )?;
        }
        if let Some(ref chrome) = self.chrome {
            cfg.browser.executable = Some(chrome.clone());
        }
        if self.show_browser {
            cfg.browser.headless = false;
        }
        Ok(())
    }
}

/// The profile file, re-read on every access, with flag overrides on top.
#[derive(Debug)]
pub struct CliSource {
    file: FileProfileSource,
    overrides: Overrides,
}

impl CliSource {
    pub fn new(file: FileProfileSource, overrides: Overrides) -> Self {
        Self { file, overrides }
    }
}

impl ConfigSource for CliSource {
    fn current(&self) -> Result<RouterConfig, CoreError> {
        let mut cfg = self.file.current()?;
        self.overrides.apply(&mut cfg)?;
        Ok(cfg)
    }
}

/// Pin the active profile and build the source automation reads from.
pub fn source(
    global: &GlobalOpts,
    cfg: &Config,
    overrides: Overrides,
) -> Result<(String, Arc<CliSource>), CliError> {
    let profile = require_profile(global, cfg)?;
    let file = FileProfileSource::new(config_path(global), Some(profile.clone()));
    Ok((profile, Arc::new(CliSource::new(file, overrides))))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn unit_override_keeps_profile_value() {
        let mut cfg = RouterConfig::default();
        Overrides::default()
            .with_interval(None, Some(IntervalUnitArg::Minutes))
            .apply(&mut cfg)
            .expect("valid override");
        assert_eq!(cfg.interval.duration(), Duration::from_secs(24 * 60));
    }

    #[test]
    fn interval_override_keeps_profile_unit() {
        let mut cfg = RouterConfig::default();
        Overrides::default()
            .with_interval(Some(6), None)
            .apply(&mut cfg)
            .expect("valid override");
        assert_eq!(cfg.interval.duration(), Duration::from_secs(6 * 3600));
    }

    #[test]
    fn browser_overrides_apply() {
        let mut cfg = RouterConfig::default();
        let args = BrowserArgs {
            show_browser: true,
            chrome: Some("/opt/chromium/chrome".into()),
        };
        Overrides::from_browser(&args).apply(&mut cfg).expect("valid override");
        assert!(!cfg.browser.headless);
        assert_eq!(cfg.browser.executable, Some(PathBuf::from("/opt/chromium/chrome")));
    }

    #[test]
    fn no_overrides_leave_config_untouched() {
        let mut cfg = RouterConfig::default();
        Overrides::default().apply(&mut cfg).expect("valid");
        assert_eq!(cfg.interval, ScheduleInterval::default());
        assert!(cfg.browser.headless);
    }
}
