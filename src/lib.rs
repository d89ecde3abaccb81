//! Git submodule updater library.
//!
//! This crate updates the submodules of a git repository by:
//! - Parsing `path=ref` requests from the command line
//! - Initializing and cloning any missing submodules
//! - Checking out the requested ref in each named submodule
//! - Moving every other submodule to the tip of its tracked branch

pub mod config;
pub mod constants;
pub mod git;
pub mod output;
pub mod refs;
pub mod submodule;
