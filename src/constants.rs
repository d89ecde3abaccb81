//! Application-wide constants.
//!
//! Centralized configuration values to avoid magic strings throughout the codebase.

/// The version-control program every command is run through.
pub const GIT_PROGRAM: &str = "git";

/// Separator between a submodule path and its requested ref on the command line.
pub const REF_SEPARATOR: char = '=';

/// Environment variable read for the diagnostic log filter.
pub const LOG_ENV: &str = "SUBMODULE_UPDATER_LOG";

/// Log level used when `LOG_ENV` is not set.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Exit code for fatal errors (no repository, init or listing failed).
pub const EXIT_FATAL: u8 = 1;

/// Progress spinner tick interval in milliseconds.
pub const PROGRESS_TICK_MS: u64 = 80;

/// Width of the separator lines printed between phases.
pub const SEPARATOR_WIDTH: usize = 33;
