#![allow(clippy::unwrap_used)]
// Integration tests for profile loading, editing, and the file-backed
// `ConfigSource`, against throwaway config files.

use std::path::PathBuf;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use routerkick_config::{
    Config, ConfigError, DEFAULT_PROFILE, FileProfileSource, Profile, load_config_from,
    save_config_to,
};
use routerkick_core::{ConfigSource, CoreError};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_file(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

// ── Loading ─────────────────────────────────────────────────────────

#[test]
fn test_missing_file_yields_default_profile() {
    let dir = TempDir::new().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.active_profile_name(), DEFAULT_PROFILE);
    assert_eq!(cfg.profile(DEFAULT_PROFILE).unwrap(), &Profile::default());
}

#[test]
fn test_partial_profile_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = config_file(
        &dir,
        r#"
default_profile = "lab"

[profiles.lab]
router_ip = "10.0.0.1"
wifi_list = ["Lab-5G", "Lab-2G"]
auto_interval = 30
interval_unit = "minutes"
"#,
    );

    let cfg = load_config_from(&path).unwrap();
    let lab = cfg.profile("lab").unwrap();

    assert_eq!(cfg.active_profile_name(), "lab");
    assert_eq!(lab.router_ip, "10.0.0.1");
    assert_eq!(lab.username, "user");
    assert_eq!(lab.wifi_list, vec!["Lab-5G", "Lab-2G"]);
    assert_eq!(lab.interval().unwrap().duration(), Duration::from_secs(1800));
    assert!(cfg.profiles.contains_key(DEFAULT_PROFILE), "default always present");
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir, "profiles = [\n");

    let err = load_config_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Figment(_)), "{err}");
}

#[test]
fn test_save_then_load_preserves_edits() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    let profile = cfg.profile_mut(DEFAULT_PROFILE).unwrap();
    profile.add_network(DEFAULT_PROFILE, "Home-5G").unwrap();
    profile.add_network(DEFAULT_PROFILE, "Home-2G").unwrap();
    profile.auto_interval = 6;
    cfg.copy_profile(DEFAULT_PROFILE, "office").unwrap();
    cfg.set_default("office").unwrap();
    save_config_to(&cfg, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(!written.contains("password"), "no password key when unset");

    assert_eq!(load_config_from(&path).unwrap(), cfg);
}

// ── Profile editing ─────────────────────────────────────────────────

#[test]
fn test_default_profile_cannot_be_removed() {
    let mut cfg = Config::default();
    let err = cfg.remove_profile(DEFAULT_PROFILE).unwrap_err();
    assert!(matches!(err, ConfigError::ProtectedProfile { .. }));
}

#[test]
fn test_removing_active_profile_falls_back_to_default() {
    let mut cfg = Config::default();
    cfg.copy_profile(DEFAULT_PROFILE, "lab").unwrap();
    cfg.set_default("lab").unwrap();

    cfg.remove_profile("lab").unwrap();

    assert_eq!(cfg.active_profile_name(), DEFAULT_PROFILE);
    assert!(matches!(
        cfg.remove_profile("lab").unwrap_err(),
        ConfigError::ProfileNotFound { .. }
    ));
}

#[test]
fn test_copy_refuses_existing_name() {
    let mut cfg = Config::default();
    cfg.copy_profile(DEFAULT_PROFILE, "lab").unwrap();
    let err = cfg.copy_profile(DEFAULT_PROFILE, "lab").unwrap_err();
    assert_eq!(err.to_string(), "profile 'lab' already exists");
}

#[test]
fn test_reset_keeps_known_networks() {
    let mut cfg = Config::default();
    let profile = cfg.profile_mut(DEFAULT_PROFILE).unwrap();
    profile.router_ip = "10.0.0.1".into();
    profile.password = Some("hunter2".into());
    profile.wifi_list = vec!["Home-5G".into()];

    cfg.reset_profile(DEFAULT_PROFILE).unwrap();

    let profile = cfg.profile(DEFAULT_PROFILE).unwrap();
    assert_eq!(profile.router_ip, "192.168.1.1");
    assert_eq!(profile.password, None);
    assert_eq!(profile.wifi_list, vec!["Home-5G"]);
}

// ── Known networks ──────────────────────────────────────────────────

#[test]
fn test_network_list_rejects_duplicates_and_keeps_order() {
    let mut profile = Profile::default();
    profile.add_network("home", "Home-5G").unwrap();
    profile.add_network("home", "Home-2G").unwrap();
    profile.add_network("home", "Guest").unwrap();

    let err = profile.add_network("home", "Home-2G").unwrap_err();
    assert_eq!(err.to_string(), "network 'Home-2G' is already in profile 'home'");

    profile.rename_network("home", "Home-2G", "Home-2.4G").unwrap();
    assert!(matches!(
        profile.rename_network("home", "Guest", "Home-5G").unwrap_err(),
        ConfigError::DuplicateNetwork { .. }
    ));
    profile.remove_network("home", "Home-5G").unwrap();
    assert!(matches!(
        profile.remove_network("home", "Home-5G").unwrap_err(),
        ConfigError::NetworkNotFound { .. }
    ));

    assert_eq!(profile.wifi_list, vec!["Home-2.4G", "Guest"]);
}

#[test]
fn test_blank_network_name_is_rejected() {
    let mut profile = Profile::default();
    assert!(matches!(
        profile.add_network("home", "   ").unwrap_err(),
        ConfigError::Validation { .. }
    ));
}

// ── FileProfileSource ───────────────────────────────────────────────

#[test]
fn test_file_source_sees_edits_between_reads() {
    let dir = TempDir::new().unwrap();
    let path = config_file(
        &dir,
        "[profiles.default]\nwifi_list = [\"Home-5G\"]\n",
    );
    let source = FileProfileSource::new(&path, None);

    assert_eq!(source.current().unwrap().known_networks, vec!["Home-5G"]);

    std::fs::write(
        &path,
        "[profiles.default]\nwifi_list = [\"Home-2G\"]\nauto_interval = 2\n",
    )
    .unwrap();
    let cfg = source.current().unwrap();

    assert_eq!(cfg.known_networks, vec!["Home-2G"]);
    assert_eq!(cfg.interval.duration(), Duration::from_secs(7200));
}

#[test]
fn test_file_source_unknown_profile() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir, "");
    let source = FileProfileSource::new(&path, Some("lab".into()));

    let err = source.current().unwrap_err();
    assert!(
        matches!(err, CoreError::Config { ref message } if message == "profile 'lab' not found"),
        "{err}"
    );
}

#[test]
fn test_file_source_rejects_zero_interval() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir, "[profiles.default]\nauto_interval = 0\n");

    let err = FileProfileSource::new(&path, None).current().unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }), "{err}");
}

#[test]
fn test_file_source_rejects_hand_edited_duplicate_network() {
    let dir = TempDir::new().unwrap();
    let path = config_file(
        &dir,
        "[profiles.default]\nwifi_list = [\"Home\", \"Home\"]\n",
    );

    let err = FileProfileSource::new(&path, None).current().unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }), "{err}");
    assert!(err.to_string().contains("wifi_list"), "{err}");
}
