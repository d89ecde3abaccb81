//! Spinner, colored output, and summary formatting.
//!
//! Everything the updater prints to the console goes through this module.

use crate::config::Config;
use crate::constants::{PROGRESS_TICK_MS, SEPARATOR_WIDTH};
use crate::refs::{ParsedRefs, RefToken};
use crate::submodule::{
    UpdateCallbacks, UpdateOutcome, UpdatePlan, UpdateReport, UpdateResult, UpdateStep,
    UpdateTarget,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// No-op callbacks for when progress output is not needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpCallbacks;

impl UpdateCallbacks for NoOpCallbacks {
    fn on_step(&self, _step: &UpdateStep) {}
    fn on_complete(&self, _result: &UpdateResult) {}
}

/// Console reporter for a whole run.
///
/// Status lines go to stdout. In normal mode a spinner on stderr names the
/// git step in flight; it is paused around every printed line.
pub struct ConsoleReporter {
    spinner: ProgressBar,
}

impl ConsoleReporter {
    pub fn new(config: &Config) -> Self {
        Self {
            spinner: create_spinner(config),
        }
    }

    /// Handle to the spinner, for collaborators that print on their own.
    #[must_use]
    pub fn progress(&self) -> ProgressBar {
        self.spinner.clone()
    }

    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }

    fn say(&self, line: String) {
        self.spinner.suspend(|| println!("{}", line));
    }
}

impl UpdateCallbacks for ConsoleReporter {
    fn on_initializing(&self) {
        self.say("Initializing and cloning any missing submodules...".to_string());
        self.spinner.set_message("Initializing submodules...");
    }

    fn on_initialized(&self) {
        self.spinner.set_message("");
        self.say("Initialization complete.".to_string());
        self.say(separator());
    }

    fn on_discovered(&self, submodules: &[String]) {
        self.say(format!(
            "Found {} submodules. Starting update...\n",
            submodules.len()
        ));
    }

    fn on_planned(&self, plan: &UpdatePlan) {
        for path in &plan.unknown {
            self.say(format!(
                "{} {} is not a registered submodule, ignoring its ref",
                "Warning:".yellow().bold(),
                path
            ));
        }
    }

    fn on_start(&self, target: &UpdateTarget) {
        match target {
            UpdateTarget::Explicit { path, reference } => self.say(
                format!("--- Processing submodule: {} -> {} ---", path, reference)
                    .bold()
                    .to_string(),
            ),
            UpdateTarget::Latest { .. } => self.say(
                "--- Updating remaining submodules to latest ---"
                    .bold()
                    .to_string(),
            ),
        }
    }

    fn on_step(&self, step: &UpdateStep) {
        self.spinner.set_message(format_step_message(step));
    }

    fn on_complete(&self, result: &UpdateResult) {
        self.spinner.set_message("");
        if let UpdateOutcome::Failed(failure) = &result.outcome {
            self.say(format_failure(&result.target, &failure.step, &failure.error));
        }
        match &result.target {
            UpdateTarget::Explicit { path, reference } => {
                if result.is_success() {
                    self.say(format!(
                        "  {} {} is now at {}",
                        "✓".green(),
                        path,
                        reference.cyan()
                    ));
                }
                self.say(format!("--- Finished submodule: {} ---\n", path));
            }
            UpdateTarget::Latest { paths } => {
                if result.is_success() {
                    self.say(format!(
                        "  {} {} submodules moved to their tracked branch",
                        "✓".green(),
                        paths.len()
                    ));
                }
                self.say("--- Finished updating remaining submodules ---".to_string());
            }
        }
    }
}

/// Creates the step spinner, hidden in verbose mode where git streams its own output.
#[must_use]
pub fn create_spinner(config: &Config) -> ProgressBar {
    if config.is_verbose() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
    spinner
}

/// Echoes the parsed requests and warns about every rejected token.
pub fn print_requests(parsed: &ParsedRefs) {
    let lines = format_requests(parsed);
    if lines.is_empty() {
        return;
    }
    println!("Specific submodule updates:");
    for line in lines {
        println!("{}", line);
    }
    println!("{}", separator());
}

/// One line per command-line token, in the order the tokens were given.
fn format_requests(parsed: &ParsedRefs) -> Vec<String> {
    parsed
        .tokens
        .iter()
        .map(|token| match token {
            RefToken::Request { path, reference } => {
                format!("  - {} -> {}", path, reference.cyan())
            }
            RefToken::Rejected(raw) => format_invalid_argument(raw),
        })
        .collect()
}

pub fn print_fatal(error: &anyhow::Error) {
    println!("{} {:#}", "Error:".red().bold(), error);
}

pub fn print_report(report: &UpdateReport) {
    match report {
        UpdateReport::NoSubmodules => {
            println!("{}", "No submodules found.".yellow().bold());
        }
        UpdateReport::Updated { unknown, results } => {
            print_summary(results, unknown);
            println!("{}", "Submodule update process complete.".green().bold());
        }
    }
}

fn print_summary(results: &[UpdateResult], unknown: &[String]) {
    let (successes, failures): (Vec<_>, Vec<_>) = results.iter().partition(|r| r.is_success());

    print_section("Summary");

    if !successes.is_empty() {
        println!(
            "{}",
            format!("Succeeded ({}):", successes.len()).green().bold()
        );
        for result in &successes {
            println!(
                "  {} {} in {}",
                "OK".green().bold(),
                describe_target(&result.target).white(),
                format_duration(result.duration).dimmed()
            );
        }
        println!();
    }

    if !failures.is_empty() {
        println!("{}", format!("Failed ({}):", failures.len()).red().bold());
        for result in &failures {
            if let UpdateOutcome::Failed(failure) = &result.outcome {
                println!(
                    "  {} {} {} in {}",
                    "FAIL".red().bold(),
                    describe_target(&result.target).white(),
                    format!("at {}: {}", failure.step, failure.error).red(),
                    format_duration(result.duration).dimmed()
                );
            }
        }
        println!();
    }

    if !unknown.is_empty() {
        println!("{}", format!("Ignored ({}):", unknown.len()).yellow().bold());
        for path in unknown {
            println!("  {}", format_ignored(path));
        }
        println!();
    }
}

fn print_section(title: &str) {
    let line = "=".repeat(SEPARATOR_WIDTH).cyan().dimmed();
    let padding = SEPARATOR_WIDTH.saturating_sub(title.len()) / 2;
    let centered = format!("{:>width$}", title, width = padding + title.len());
    println!("\n{}\n{}\n{}\n", line, centered.cyan().bold(), line);
}

fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

fn format_invalid_argument(token: &str) -> String {
    format!(
        "{} Ignoring invalid argument: {}",
        "Warning:".yellow().bold(),
        token
    )
}

fn format_ignored(path: &str) -> String {
    format!("{} {} (not a registered submodule)", "SKIP".yellow().bold(), path)
}

fn format_failure(target: &UpdateTarget, step: &UpdateStep, error: &str) -> String {
    let message = match (target, step) {
        (UpdateTarget::Explicit { path, .. }, UpdateStep::Fetching) => {
            format!("Error fetching in {}: {}", path, error)
        }
        (UpdateTarget::Explicit { path, .. }, UpdateStep::CheckingOut { reference }) => {
            format!("Error checking out ref '{}' in {}: {}", reference, path, error)
        }
        (_, _) => format!("Error updating submodules to latest: {}", error),
    };
    message.red().to_string()
}

fn describe_target(target: &UpdateTarget) -> String {
    match target {
        UpdateTarget::Explicit { path, reference } => format!("{} -> {}", path, reference),
        UpdateTarget::Latest { paths } => format!("{} (latest)", paths.join(", ")),
    }
}

fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f32())
}

fn format_step_message(step: &UpdateStep) -> String {
    match step {
        UpdateStep::Fetching => "Fetching branches and tags...".to_string(),
        UpdateStep::CheckingOut { reference } => format!("Checking out {}...", reference),
        UpdateStep::UpdatingRemote => "Updating to tracked remote branches...".to_string(),
    }
}
