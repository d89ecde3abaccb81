//! Git command wrappers.
//!
//! This module is the only place that spawns processes. It provides the
//! command runner, the [`VersionControl`] capability used by the updater,
//! and [`GitCli`], its implementation on top of the git command line.

use crate::config::Config;
use crate::constants::GIT_PROGRAM;
use anyhow::Context;
use indicatif::ProgressBar;
use log::{debug, warn};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Callback invoked right before a command is spawned.
pub type GitLogger = fn(dir: &Path, program: &str, args: &[&str]);

pub fn verbose_logger(dir: &Path, program: &str, args: &[&str]) {
    println!("-> Running in {}: {} {}", dir.display(), program, args.join(" "));
}

pub fn no_op_logger(_dir: &Path, _program: &str, _args: &[&str]) {}

/// Runs `program` in `dir`.
///
/// In normal mode stdout and stderr share one pipe and the combined output is
/// written to `out` exactly once, only when the command exits non-zero. In
/// verbose mode the command line is echoed first and the child inherits this
/// process's stdout and stderr; `out` is not used.
pub fn run_program(
    dir: &Path,
    program: &str,
    args: &[&str],
    config: &Config,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    config.git_logger()(dir, program, args);
    debug!("spawning {} {:?} in {}", program, args, dir.display());

    if config.is_verbose() {
        let status = Command::new(program)
            .current_dir(dir)
            .args(args)
            .status()
            .with_context(|| format!("Failed to spawn {} command", program))?;
        if !status.success() {
            anyhow::bail!("{} {} failed with {}", program, args.join(" "), status);
        }
        return Ok(());
    }

    let (mut reader, writer) = io::pipe().context("Failed to create output pipe")?;
    let mut child = {
        let mut command = Command::new(program);
        command
            .current_dir(dir)
            .args(args)
            .stdin(Stdio::null())
            .stdout(writer.try_clone().context("Failed to create output pipe")?)
            .stderr(writer);
        command.spawn()
    }
    .with_context(|| format!("Failed to spawn {} command", program))?;

    let mut combined = Vec::new();
    reader
        .read_to_end(&mut combined)
        .context("Failed to read command output")?;
    let status = child.wait().context("Failed to wait for command")?;

    if !status.success() {
        out.write_all(&combined)
            .context("Failed to print command output")?;
        out.flush().context("Failed to print command output")?;
        anyhow::bail!("{} {} failed with {}", program, args.join(" "), status);
    }
    Ok(())
}

/// Runs a git query and returns its trimmed stdout.
pub fn run_git(dir: &Path, args: &[&str]) -> anyhow::Result<String> {
    debug!("querying git {:?} in {}", args, dir.display());
    let output = Command::new(GIT_PROGRAM)
        .current_dir(dir)
        .args(args)
        .output()
        .context("Failed to spawn git command")?;

    if output.status.success() {
        let result = String::from_utf8_lossy(&output.stdout);
        Ok(result.as_ref().trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("git {} failed: {}", args.join(" "), stderr.trim())
    }
}

/// Rejects refs git would misread: empty, multi-line, or option-like.
pub fn validate_ref(reference: &str) -> anyhow::Result<()> {
    if reference.is_empty()
        || reference.contains('\0')
        || reference.contains('\n')
        || reference.starts_with('-')
    {
        anyhow::bail!("Invalid ref: {:?}", reference);
    }
    Ok(())
}

/// Extracts submodule paths from `git submodule status` output.
///
/// Lines look like `<marker><commit> <path> (<describe>)`; the path is the
/// second whitespace-separated field whether or not a marker is present.
pub fn parse_submodule_status(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

/// The git operations the updater depends on.
pub trait VersionControl {
    /// Absolute path of the enclosing repository's top-level directory.
    fn top_level(&self) -> anyhow::Result<PathBuf>;

    /// Clones and initializes every registered submodule, recursively.
    fn init_submodules(&self, root: &Path) -> anyhow::Result<()>;

    /// Root-relative paths of all registered submodules.
    fn list_submodules(&self, root: &Path) -> anyhow::Result<Vec<String>>;

    /// Fetches all remotes and tags into a submodule's working copy.
    fn fetch_all(&self, submodule_dir: &Path) -> anyhow::Result<()>;

    /// Checks out a commit, tag, or branch in a submodule's working copy.
    fn checkout(&self, submodule_dir: &Path, reference: &str) -> anyhow::Result<()>;

    /// Moves the given submodules to the tip of their tracked remote branch.
    fn update_remote(&self, root: &Path, paths: &[String]) -> anyhow::Result<()>;
}

/// [`VersionControl`] backed by the `git` executable.
pub struct GitCli {
    config: Config,
    work_dir: PathBuf,
    progress: ProgressBar,
}

impl GitCli {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            work_dir: PathBuf::from("."),
            progress: ProgressBar::hidden(),
        }
    }

    /// Directory the repository root is resolved from.
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Progress bar to hide while failure output is printed.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    fn run(&self, dir: &Path, args: &[&str]) -> anyhow::Result<()> {
        let mut captured = Vec::new();
        let result = run_program(dir, GIT_PROGRAM, args, &self.config, &mut captured);
        if !captured.is_empty() {
            self.progress.suspend(|| {
                let mut stdout = io::stdout().lock();
                if let Err(e) = stdout.write_all(&captured).and_then(|()| stdout.flush()) {
                    warn!("failed to print output of git {}: {}", args.join(" "), e);
                }
            });
        }
        result
    }
}

impl VersionControl for GitCli {
    fn top_level(&self) -> anyhow::Result<PathBuf> {
        run_git(&self.work_dir, &["rev-parse", "--show-toplevel"]).map(PathBuf::from)
    }

    fn init_submodules(&self, root: &Path) -> anyhow::Result<()> {
        self.run(
            root,
            &["submodule", "update", "--init", "--recursive", "--progress"],
        )
    }

    fn list_submodules(&self, root: &Path) -> anyhow::Result<Vec<String>> {
        let output = run_git(root, &["submodule", "status"])?;
        let paths = parse_submodule_status(&output);
        debug!("registered submodules: {:?}", paths);
        Ok(paths)
    }

    fn fetch_all(&self, submodule_dir: &Path) -> anyhow::Result<()> {
        self.run(submodule_dir, &["fetch", "--all", "--tags"])
    }

    fn checkout(&self, submodule_dir: &Path, reference: &str) -> anyhow::Result<()> {
        validate_ref(reference)?;
        self.run(submodule_dir, &["checkout", reference])
    }

    fn update_remote(&self, root: &Path, paths: &[String]) -> anyhow::Result<()> {
        let mut args = vec!["submodule", "update", "--remote", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run(root, &args)
    }
}
