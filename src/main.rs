use clap::Parser;
use std::process::ExitCode;
use submodule_updater::config::{Config, Verbosity};
use submodule_updater::constants::{DEFAULT_LOG_LEVEL, EXIT_FATAL, LOG_ENV};
use submodule_updater::git::GitCli;
use submodule_updater::output::{self, ConsoleReporter};
use submodule_updater::{refs, submodule};

/// Update git submodules to their latest tracked commit, or to a specific ref.
///
/// By default every submodule is moved to the latest commit of its tracked
/// branch. Pass `path=ref` to pin a submodule to a commit, tag, or branch
/// instead (e.g. `libs/core=v1.2.3`).
#[derive(Parser, Debug)]
#[command(name = "update-submodules", version, about, long_about)]
struct Cli {
    /// Print every git command and stream its output
    #[arg(short = 'v', long = "v", visible_alias = "verbose")]
    verbose: bool,

    /// Submodules to pin, as path=ref (commit, tag, or branch)
    #[arg(value_name = "PATH=REF")]
    refs: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, DEFAULT_LOG_LEVEL))
        .init();

    let config = Config {
        verbosity: Verbosity::from(cli.verbose),
    };

    let parsed = refs::parse_refs(&cli.refs);
    output::print_requests(&parsed);

    let reporter = ConsoleReporter::new(&config);
    let git = GitCli::new(config).with_progress(reporter.progress());
    let result = submodule::run(&git, &parsed.requests, &reporter);
    reporter.finish();

    match result {
        Ok(report) => {
            output::print_report(&report);
            ExitCode::SUCCESS
        }
        Err(error) => {
            output::print_fatal(&error);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
