mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::path::Path;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use routerkick_core::OperationKind;

use crate::cli::{Cli, Command, ScheduleCommand, WifiCommand};
use crate::error::{CliError, exit_code};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_dir = match cli.command {
        Command::Schedule(ref args) => match args.command {
            ScheduleCommand::Run(ref run) => run.log_dir.clone(),
        },
        _ => None,
    };

    let code = match init_tracing(cli.global.verbose, log_dir.as_deref()) {
        Ok(guard) => {
            let code = match run(cli).await {
                Ok(()) => exit_code::SUCCESS,
                Err(err) => report(err),
            };
            // Flush the file writer before exiting.
            drop(guard);
            code
        }
        Err(err) => report(err),
    };

    std::process::exit(code);
}

fn report(err: CliError) -> i32 {
    let code = err.exit_code();
    eprintln!("{:?}", miette::Report::new(err));
    code
}

/// Stderr logging by verbosity, plus an optional daily rolling file.
///
/// Core progress lines are already rendered by the event renderer, so at
/// the default verbosity only their errors reach stderr. The file layer
/// keeps everything at info and above.
fn init_tracing(verbosity: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, CliError> {
    let level = match verbosity {
        0 => "warn,routerkick_core=error",
        1 => "info,routerkick_core=warn",
        2 => "debug",
        _ => "trace",
    };
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("routerkick")
                .filename_suffix("log")
                .build(dir)
                .map_err(|e| CliError::Config {
                    message: format!("cannot open log directory {}: {e}", dir.display()),
                })?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_level = if verbosity >= 2 { "debug" } else { "info" };
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_filter(EnvFilter::new(file_level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Reboot(args) => {
            commands::operation::run(OperationKind::Reboot, &args.browser, &cli.global).await
        }

        Command::Wifi(args) => match args.command {
            WifiCommand::Connect => {
                let browser = cli::BrowserArgs::default();
                commands::operation::run(OperationKind::WifiJoin, &browser, &cli.global).await
            }
        },

        Command::Schedule(args) => match args.command {
            ScheduleCommand::Run(run) => commands::schedule::run(run, &cli.global).await,
        },

        // Profile edits never touch the router
        Command::Networks(args) => commands::networks::handle(args, &cli.global),
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "routerkick", &mut std::io::stdout());
            Ok(())
        }
    }
}
