//! Clap derive structures for the `routerkick` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// routerkick -- keep a flaky router reachable
#[derive(Debug, Parser)]
#[command(
    name = "routerkick",
    version,
    about = "Rejoin Wi-Fi and reboot your router on a schedule",
    long_about = "Unattended recovery for consumer routers.\n\n\
        Joins the first reachable known Wi-Fi network, then logs into the\n\
        router's web console with a headless browser and triggers a reboot.\n\
        Run either step once, or loop both on a fixed interval.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Router profile to use
    #[arg(long, short = 'p', env = "ROUTERKICK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "ROUTERKICK_CONFIG", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Output format for listings
    #[arg(
        long,
        short = 'o',
        env = "ROUTERKICK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reboot the router once through its web console
    Reboot(RebootArgs),

    /// Join a known Wi-Fi network
    #[command(alias = "w")]
    Wifi(WifiArgs),

    /// Run the join-then-reboot loop
    #[command(alias = "sched")]
    Schedule(ScheduleArgs),

    /// Manage the known-network list of a profile
    #[command(alias = "net", alias = "n")]
    Networks(NetworksArgs),

    /// Manage configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Browser overrides for commands that reboot.
#[derive(Debug, Default, Args)]
pub struct BrowserArgs {
    /// Show the browser window instead of running headless
    #[arg(long)]
    pub show_browser: bool,

    /// Chrome or Chromium executable (auto-detected when omitted)
    #[arg(long, env = "ROUTERKICK_CHROME", value_name = "PATH")]
    pub chrome: Option<PathBuf>,
}

// ── Reboot ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RebootArgs {
    #[command(flatten)]
    pub browser: BrowserArgs,
}

// ── Wi-Fi ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WifiArgs {
    #[command(subcommand)]
    pub command: WifiCommand,
}

#[derive(Debug, Subcommand)]
pub enum WifiCommand {
    /// Join the first reachable network from the profile's list
    Connect,
}

// ── Schedule ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub command: ScheduleCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScheduleCommand {
    /// Run the loop in the foreground until interrupted (Ctrl-C)
    Run(ScheduleRunArgs),
}

#[derive(Debug, Args)]
pub struct ScheduleRunArgs {
    /// Wait between cycles, overriding the profile (at least 1)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Unit of --interval, overriding the profile
    #[arg(long, value_enum)]
    pub unit: Option<IntervalUnitArg>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IntervalUnitArg {
    #[value(alias = "s")]
    Seconds,
    #[value(alias = "m")]
    Minutes,
    #[value(alias = "h")]
    Hours,
}

// ── Networks ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NetworksArgs {
    #[command(subcommand)]
    pub command: NetworksCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworksCommand {
    /// List known networks in join order
    #[command(alias = "ls")]
    List,

    /// Append a network (lowest priority)
    Add {
        /// Network name (SSID) as the OS knows it
        name: String,
    },

    /// Rename a network, keeping its position
    Rename {
        /// Current name
        from: String,
        /// New name
        to: String,
    },

    /// Remove a network
    #[command(alias = "rm")]
    Remove {
        /// Network name
        name: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the current configuration (passwords redacted)
    Show,

    /// List profiles
    #[command(alias = "ls")]
    Profiles,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },

    /// Save a copy of a profile under a new name
    Copy {
        /// Name of the new profile
        name: String,

        /// Profile to copy (defaults to the active one)
        #[arg(long)]
        from: Option<String>,
    },

    /// Remove a profile (`default` cannot be removed)
    #[command(alias = "rm")]
    Remove {
        /// Profile name
        name: String,
    },

    /// Restore the active profile's defaults, keeping its networks
    Reset,

    /// Store the active profile's router password in the system keyring
    SetPassword,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
