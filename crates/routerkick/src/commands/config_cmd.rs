//! Config subcommand handlers.

use std::collections::BTreeMap;

use dialoguer::{Confirm, Input, Select};
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use routerkick_config::ConfigError;
use routerkick_core::IntervalUnit;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::commands::util::{confirm, prompt_err};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const UNITS: [IntervalUnit; 3] = [IntervalUnit::Hours, IntervalUnit::Minutes, IntervalUnit::Seconds];

// ── Helpers ─────────────────────────────────────────────────────────

/// Convert a config error, listing the existing profiles on a bad name.
fn lift(cfg: &Config, err: ConfigError) -> CliError {
    match err {
        ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
            name,
            available: cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
        },
        other => other.into(),
    }
}

fn interval_label(profile: &Profile) -> String {
    format!(
        "{} {}",
        profile.auto_interval,
        IntervalUnit::from_label(&profile.interval_unit)
    )
}

/// Offer the keyring or plaintext for a newly entered password.
///
/// Returns `Some(password)` if the user chose plaintext, `None` if it went
/// to the keyring.
fn prompt_password_storage(profile: &str, password: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        routerkick_config::store_password(profile, password)?;
        eprintln!("   ✓ password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password.to_owned()))
    }
}

// ── Listing types ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ProfileSummary {
    name: String,
    default: bool,
    router_ip: String,
    networks: Vec<String>,
    interval: String,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Default")]
    default: &'static str,
    #[tabled(rename = "Router")]
    router_ip: String,
    #[tabled(rename = "Networks")]
    networks: usize,
    #[tabled(rename = "Interval")]
    interval: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),
        ConfigCommand::Show => show(global),
        ConfigCommand::Profiles => profiles(global),

        ConfigCommand::Use { name } => {
            let mut cfg = config::load(global)?;
            cfg.set_default(&name).map_err(|e| lift(&cfg, e))?;
            config::save(global, &cfg)?;
            output::print_done(global, &format!("default profile is now '{name}'"));
            Ok(())
        }

        ConfigCommand::Copy { name, from } => {
            let mut cfg = config::load(global)?;
            let from = from.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            cfg.copy_profile(&from, &name).map_err(|e| lift(&cfg, e))?;
            config::save(global, &cfg)?;
            output::print_done(global, &format!("saved '{from}' as '{}'", name.trim()));
            Ok(())
        }

        ConfigCommand::Remove { name } => {
            let mut cfg = config::load(global)?;
            if name == config::DEFAULT_PROFILE {
                return Err(CliError::ProtectedProfile { name });
            }
            cfg.profile(&name).map_err(|e| lift(&cfg, e))?;
            if !confirm(&format!("Remove profile '{name}'?"), "config remove", global.yes)? {
                return Ok(());
            }
            cfg.remove_profile(&name).map_err(|e| lift(&cfg, e))?;
            config::save(global, &cfg)?;
            if let Err(e) = routerkick_config::delete_password(&name) {
                debug!(profile = %name, error = %e, "could not clear keyring entry");
            }
            output::print_done(global, &format!("removed profile '{name}'"));
            Ok(())
        }

        ConfigCommand::Reset => {
            let mut cfg = config::load(global)?;
            let name = config::require_profile(global, &cfg)?;
            let prompt = format!("Reset profile '{name}' to defaults (known networks are kept)?");
            if !confirm(&prompt, "config reset", global.yes)? {
                return Ok(());
            }
            cfg.reset_profile(&name)?;
            config::save(global, &cfg)?;
            output::print_done(global, &format!("profile '{name}' reset to defaults"));
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = config::load(global)?;
            let name = config::require_profile(global, &cfg)?;
            let password = rpassword::prompt_password(format!("Router password for '{name}': "))
                .map_err(prompt_err)?;
            routerkick_config::store_password(&name, &password)?;
            output::print_done(global, &format!("password for '{name}' stored in system keyring"));
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), global.quiet);
            Ok(())
        }
    }
}

// ── Show / list ─────────────────────────────────────────────────────

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;

    let profiles: BTreeMap<String, Profile> = match global.profile {
        Some(ref name) => {
            let profile = cfg.profile(name).map_err(|e| lift(&cfg, e))?;
            BTreeMap::from([(name.clone(), profile.redacted())])
        }
        None => cfg
            .profiles
            .iter()
            .map(|(name, p)| (name.clone(), p.redacted()))
            .collect(),
    };
    let shown = Config {
        default_profile: cfg.default_profile.clone(),
        profiles,
    };

    let out = match global.output {
        OutputFormat::Json => output::render_json(&shown),
        OutputFormat::Table | OutputFormat::Plain => {
            toml::to_string_pretty(&shown).map_err(|e| CliError::from(ConfigError::from(e)))?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

fn profiles(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let active = cfg.active_profile_name();

    let summaries: Vec<ProfileSummary> = cfg
        .profiles
        .iter()
        .map(|(name, p)| ProfileSummary {
            name: name.clone(),
            default: name == active,
            router_ip: p.router_ip.clone(),
            networks: p.wifi_list.clone(),
            interval: interval_label(p),
        })
        .collect();

    let out = output::render_list(
        global.output,
        &summaries,
        |s| ProfileRow {
            name: s.name.clone(),
            default: if s.default { "*" } else { "" },
            router_ip: s.router_ip.clone(),
            networks: s.networks.len(),
            interval: s.interval.clone(),
        },
        |s| s.name.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);
    let mut cfg = config::load(global)?;
    eprintln!("routerkick configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    // 1. Profile name
    let name: String = Input::new()
        .with_prompt("Profile name")
        .default(config::active_profile_name(global, &cfg))
        .interact_text()
        .map_err(prompt_err)?;
    let base = cfg.profiles.get(&name).cloned().unwrap_or_default();

    // 2. Router
    let router_ip: String = Input::new()
        .with_prompt("Router address")
        .default(base.router_ip.clone())
        .interact_text()
        .map_err(prompt_err)?;
    let username: String = Input::new()
        .with_prompt("Router username")
        .default(base.username.clone())
        .interact_text()
        .map_err(prompt_err)?;

    // 3. Password
    let password = rpassword::prompt_password("Router password (empty keeps the current one): ")
        .map_err(prompt_err)?;
    let plaintext = if password.is_empty() {
        base.password.clone()
    } else {
        prompt_password_storage(&name, &password)?
    };

    // 4. Networks
    let networks: String = Input::new()
        .with_prompt("Known networks, highest priority first (comma-separated)")
        .default(base.wifi_list.join(", "))
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    // 5. Schedule
    let auto_interval: u64 = Input::new()
        .with_prompt("Wait between scheduled runs")
        .default(base.auto_interval.max(1))
        .validate_with(|v: &u64| if *v >= 1 { Ok(()) } else { Err("must be at least 1") })
        .interact_text()
        .map_err(prompt_err)?;
    let current_unit = IntervalUnit::from_label(&base.interval_unit);
    let unit_index = Select::new()
        .with_prompt("Unit")
        .items(&UNITS.map(|u| u.to_string()))
        .default(UNITS.iter().position(|u| *u == current_unit).unwrap_or(0))
        .interact()
        .map_err(prompt_err)?;
    let unit = UNITS.get(unit_index).copied().unwrap_or_default();

    // 6. Build profile and config
    let mut profile = Profile {
        router_ip,
        username,
        password: plaintext,
        wifi_list: Vec::new(),
        auto_interval,
        interval_unit: unit.to_string(),
        ..base
    };
    for network in networks.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        profile.add_network(&name, network)?;
    }
    cfg.profiles.insert(name.clone(), profile);

    if cfg.active_profile_name() != name
        && Confirm::new()
            .with_prompt(format!("Make '{name}' the default profile?"))
            .default(true)
            .interact()
            .map_err(prompt_err)?
    {
        cfg.default_profile = Some(name.clone());
    }

    config::save(global, &cfg)?;
    output::print_done(global, &format!("profile '{name}' saved to {}", path.display()));
    Ok(())
}
