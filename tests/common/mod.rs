//! Test infrastructure for submodule-updater integration tests.
#![allow(dead_code)]

use anyhow::Result;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use submodule_updater::git::{VersionControl, run_git};
use submodule_updater::submodule::{UpdateCallbacks, UpdateResult, UpdateStep, UpdateTarget};
use tempfile::TempDir;

/// Lets git clone and fetch submodules from local paths.
pub const FILE_PROTOCOL_ENV: [(&str, &str); 3] = [
    ("GIT_CONFIG_COUNT", "1"),
    ("GIT_CONFIG_KEY_0", "protocol.file.allow"),
    ("GIT_CONFIG_VALUE_0", "always"),
];

/// A temporary git repository for testing.
/// Automatically cleaned up when dropped.
pub struct TestRepo {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl TestRepo {
    /// Creates a new test repository with an initial commit on the master branch.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();

        run_git(&path, &["init", "-b", "master"])?;
        run_git(&path, &["config", "user.email", "test@example.com"])?;
        run_git(&path, &["config", "user.name", "Test User"])?;
        run_git(&path, &["config", "protocol.file.allow", "always"])?;

        std::fs::write(path.join("README.md"), "# Test Repo\n")?;
        run_git(&path, &["add", "README.md"])?;
        run_git(&path, &["commit", "-m", "Initial commit"])?;

        Ok(Self {
            _temp_dir: temp_dir,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn head(&self) -> Result<String> {
        run_git(&self.path, &["rev-parse", "HEAD"])
    }

    /// Writes `name` and commits it, returning the new commit hash.
    pub fn commit_file(&self, name: &str, content: &str) -> Result<String> {
        std::fs::write(self.path.join(name), content)?;
        run_git(&self.path, &["add", name])?;
        let message = format!("Update {}", name);
        run_git(&self.path, &["commit", "-m", message.as_str()])?;
        self.head()
    }

    pub fn tag(&self, name: &str) -> Result<()> {
        run_git(&self.path, &["tag", name])?;
        Ok(())
    }

    /// Registers `upstream` as a submodule at `sub_path` and commits it.
    pub fn add_submodule(&self, upstream: &TestRepo, sub_path: &str) -> Result<()> {
        let url = upstream.path().to_string_lossy().to_string();
        run_git(
            &self.path,
            &[
                "-c",
                "protocol.file.allow=always",
                "submodule",
                "add",
                url.as_str(),
                sub_path,
            ],
        )?;
        run_git(
            &self.path.join(sub_path),
            &["config", "protocol.file.allow", "always"],
        )?;
        let message = format!("Add {}", sub_path);
        run_git(&self.path, &["commit", "-m", message.as_str()])?;
        Ok(())
    }

    /// Current commit of the submodule checked out at `sub_path`.
    pub fn submodule_head(&self, sub_path: &str) -> Result<String> {
        run_git(&self.path.join(sub_path), &["rev-parse", "HEAD"])
    }
}

/// In-memory [`VersionControl`] that records every call.
pub struct FakeVcs {
    pub root: PathBuf,
    pub submodules: Vec<String>,
    pub fail_top_level: bool,
    pub fail_init: bool,
    pub fail_list: bool,
    pub fail_fetch: Vec<String>,
    pub fail_checkout: Vec<String>,
    pub fail_update_remote: bool,
    pub calls: RefCell<Vec<String>>,
}

impl FakeVcs {
    pub fn with_submodules(submodules: &[&str]) -> Self {
        Self {
            root: PathBuf::from("/repo"),
            submodules: submodules.iter().map(|s| s.to_string()).collect(),
            fail_top_level: false,
            fail_init: false,
            fail_list: false,
            fail_fetch: vec![],
            fail_checkout: vec![],
            fail_update_remote: false,
            calls: RefCell::new(vec![]),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn relative(&self, dir: &Path) -> String {
        dir.strip_prefix(&self.root)
            .unwrap_or(dir)
            .to_string_lossy()
            .to_string()
    }
}

impl VersionControl for FakeVcs {
    fn top_level(&self) -> Result<PathBuf> {
        self.record("top_level".to_string());
        if self.fail_top_level {
            anyhow::bail!("fatal: not a git repository");
        }
        Ok(self.root.clone())
    }

    fn init_submodules(&self, _root: &Path) -> Result<()> {
        self.record("init".to_string());
        if self.fail_init {
            anyhow::bail!("clone failed");
        }
        Ok(())
    }

    fn list_submodules(&self, _root: &Path) -> Result<Vec<String>> {
        self.record("list".to_string());
        if self.fail_list {
            anyhow::bail!("status failed");
        }
        Ok(self.submodules.clone())
    }

    fn fetch_all(&self, submodule_dir: &Path) -> Result<()> {
        let path = self.relative(submodule_dir);
        self.record(format!("fetch {}", path));
        if self.fail_fetch.contains(&path) {
            anyhow::bail!("could not read from remote");
        }
        Ok(())
    }

    fn checkout(&self, submodule_dir: &Path, reference: &str) -> Result<()> {
        let path = self.relative(submodule_dir);
        self.record(format!("checkout {} {}", path, reference));
        if self.fail_checkout.contains(&path) {
            anyhow::bail!("pathspec '{}' did not match", reference);
        }
        Ok(())
    }

    fn update_remote(&self, _root: &Path, paths: &[String]) -> Result<()> {
        self.record(format!("update_remote {}", paths.join(" ")));
        if self.fail_update_remote {
            anyhow::bail!("remote unreachable");
        }
        Ok(())
    }
}

/// Callbacks that record the order of notifications.
#[derive(Default)]
pub struct RecordingCallbacks {
    pub events: RefCell<Vec<String>>,
}

impl RecordingCallbacks {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl UpdateCallbacks for RecordingCallbacks {
    fn on_discovered(&self, submodules: &[String]) {
        self.events
            .borrow_mut()
            .push(format!("discovered {}", submodules.len()));
    }

    fn on_start(&self, target: &UpdateTarget) {
        let event = match target {
            UpdateTarget::Explicit { path, .. } => format!("start {}", path),
            UpdateTarget::Latest { .. } => "start latest".to_string(),
        };
        self.events.borrow_mut().push(event);
    }

    fn on_step(&self, step: &UpdateStep) {
        self.events.borrow_mut().push(format!("step {}", step));
    }

    fn on_complete(&self, result: &UpdateResult) {
        self.events
            .borrow_mut()
            .push(format!("complete {}", result.is_success()));
    }
}
