//! Output formatting and live event rendering.
//!
//! Listings go to stdout as a table, JSON, or plain lines. Automation
//! events (progress, log lines, schedule status) go to stderr: progress as
//! an `indicatif` bar, log lines as `[HH:MM:SS] message`.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use routerkick_core::{
    AutomationEvent, LogLine, LoopState, OperationKind, OperationResult, ScheduleStatus,
};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Whether stderr output should be colored.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => render_json(data),
        OutputFormat::Plain => data.iter().map(id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Pretty-printed JSON. Serializing plain data structs cannot fail.
pub fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_default()
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Confirmation of a completed edit, on stderr.
pub fn print_done(global: &GlobalOpts, message: &str) {
    if global.quiet {
        return;
    }
    if should_color(global.color) {
        eprintln!("{} {message}", "✓".green());
    } else {
        eprintln!("✓ {message}");
    }
}

// ── Event lines ──────────────────────────────────────────────────────

pub fn render_log_line(line: &LogLine, color: bool) -> String {
    let stamp = format!("[{}]", line.at.format("%H:%M:%S"));
    if color {
        format!("{} {}", stamp.dimmed(), line.message)
    } else {
        format!("{stamp} {}", line.message)
    }
}

pub fn render_status(status: &ScheduleStatus, color: bool) -> String {
    let state = match status.state {
        LoopState::Idle => "idle",
        LoopState::Running => "running",
        LoopState::Stopping => "stopping",
    };
    let state = if color {
        match status.state {
            LoopState::Running => state.green().to_string(),
            LoopState::Stopping => state.yellow().to_string(),
            LoopState::Idle => state.dimmed().to_string(),
        }
    } else {
        state.to_owned()
    };

    match status.next_run_at {
        Some(at) => format!("schedule {state}, next run at {}", at.format("%Y-%m-%d %H:%M:%S")),
        None => format!("schedule {state}"),
    }
}

pub fn render_outcome(operation: OperationKind, result: &OperationResult, color: bool) -> String {
    let (mark, text) = match result {
        OperationResult::Success(detail) => {
            let text = match (operation, detail) {
                (OperationKind::WifiJoin, Some(network)) => format!("connected to {network}"),
                (OperationKind::Reboot, Some(router)) => format!("reboot sent to {router}"),
                (_, None) => format!("{operation} succeeded"),
            };
            ("✓", text)
        }
        OperationResult::Failure { reason, .. } => ("✗", format!("{operation} failed: {reason}")),
    };

    if !color {
        return format!("{mark} {text}");
    }
    if result.is_success() {
        format!("{} {text}", mark.green())
    } else {
        format!("{} {text}", mark.red())
    }
}

// ── Live rendering ───────────────────────────────────────────────────

/// Turns the automation event stream into terminal output.
pub struct EventRenderer {
    color: bool,
    quiet: bool,
    draw_bars: bool,
    bar: Option<ProgressBar>,
}

impl EventRenderer {
    pub fn new(global: &GlobalOpts) -> Self {
        Self {
            color: should_color(global.color),
            quiet: global.quiet,
            draw_bars: !global.quiet && io::stderr().is_terminal(),
            bar: None,
        }
    }

    pub fn render(&mut self, event: &AutomationEvent) {
        match event {
            AutomationEvent::Progress {
                operation,
                percent,
                message,
            } => {
                let visible = self.draw_bars;
                let bar = self.bar.get_or_insert_with(|| new_bar(*operation, visible));
                bar.set_position(u64::from(*percent));
                bar.set_message(message.clone());
            }
            AutomationEvent::Log(line) => {
                let text = render_log_line(line, self.color);
                self.print_line(&text);
            }
            AutomationEvent::Finished { operation, result } => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
                // Failures already arrived as a log line.
                if result.is_success() {
                    let text = render_outcome(*operation, result, self.color);
                    self.print_line(&text);
                }
            }
            AutomationEvent::Schedule(status) => {
                let text = render_status(status, self.color);
                self.print_line(&text);
            }
        }
    }

    fn print_line(&self, text: &str) {
        if self.quiet {
            return;
        }
        match &self.bar {
            // Keeps the bar pinned below the scrolling lines.
            Some(bar) if !bar.is_hidden() => bar.println(text),
            _ => eprintln!("{text}"),
        }
    }
}

fn new_bar(operation: OperationKind, visible: bool) -> ProgressBar {
    let target = if visible {
        ProgressDrawTarget::stderr()
    } else {
        ProgressDrawTarget::hidden()
    };
    let bar = ProgressBar::with_draw_target(Some(100), target);
    if let Ok(style) =
        ProgressStyle::with_template("{prefix:>14} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_prefix(operation.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}
