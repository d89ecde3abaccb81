//! Configuration types for CLI verbosity.

use crate::git::{self, GitLogger};

/// Runtime configuration derived from CLI arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// Controls the verbosity level of CLI output.
    pub verbosity: Verbosity,
}

impl Config {
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Returns the command logger matching the verbosity setting.
    ///
    /// Verbose runs echo every git invocation with its working directory
    /// before it starts; normal runs stay silent.
    #[must_use]
    pub fn git_logger(&self) -> GitLogger {
        if self.is_verbose() {
            git::verbose_logger
        } else {
            git::no_op_logger
        }
    }
}

/// Verbosity level for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Normal,
    Verbose,
}

impl From<bool> for Verbosity {
    fn from(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}
