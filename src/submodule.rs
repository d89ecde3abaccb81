// Submodule discovery, update planning, update logic, result types

use crate::git::{self, VersionControl};
use crate::refs::RefRequests;
use anyhow::Context;
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStep {
    Fetching,
    CheckingOut { reference: String },
    UpdatingRemote,
}

impl fmt::Display for UpdateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStep::Fetching => write!(f, "fetching"),
            UpdateStep::CheckingOut { reference } => write!(f, "checking out '{}'", reference),
            UpdateStep::UpdatingRemote => write!(f, "updating to tracked branch"),
        }
    }
}

/// One unit of work: a single pinned submodule, or the track-latest batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateTarget {
    Explicit { path: String, reference: String },
    Latest { paths: Vec<String> },
}

#[derive(Debug)]
pub struct UpdateResult {
    pub target: UpdateTarget,
    pub outcome: UpdateOutcome,
    pub duration: Duration,
}

impl UpdateResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, UpdateOutcome::Success)
    }
}

#[derive(Debug)]
pub struct UpdateFailure {
    pub step: UpdateStep,
    pub error: String,
}

#[derive(Debug)]
pub enum UpdateOutcome {
    Success,
    Failed(UpdateFailure),
}

/// Registered submodules split by update strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    /// Submodules pinned to a requested ref, in request order.
    pub explicit: Vec<(String, String)>,
    /// Submodules moved to the tip of their tracked branch, in registry order.
    pub track_latest: Vec<String>,
    /// Requested paths that are not registered submodules.
    pub unknown: Vec<String>,
}

#[derive(Debug)]
pub enum UpdateReport {
    NoSubmodules,
    Updated {
        unknown: Vec<String>,
        results: Vec<UpdateResult>,
    },
}

/// Progress notifications emitted while submodules are updated.
pub trait UpdateCallbacks {
    fn on_initializing(&self) {}
    fn on_initialized(&self) {}
    fn on_discovered(&self, _submodules: &[String]) {}
    fn on_planned(&self, _plan: &UpdatePlan) {}
    fn on_start(&self, _target: &UpdateTarget) {}
    fn on_step(&self, step: &UpdateStep);
    fn on_complete(&self, result: &UpdateResult);
}

pub fn plan_updates(submodules: &[String], requests: &RefRequests) -> UpdatePlan {
    let explicit = requests
        .iter()
        .filter(|(path, _)| submodules.iter().any(|s| s == path))
        .map(|(path, reference)| (path.to_string(), reference.to_string()))
        .collect();

    let track_latest = submodules
        .iter()
        .filter(|path| !requests.contains(path))
        .cloned()
        .collect();

    let unknown = requests
        .iter()
        .map(|(path, _)| path)
        .filter(|path| !submodules.iter().any(|s| s == path))
        .map(str::to_string)
        .collect();

    UpdatePlan {
        explicit,
        track_latest,
        unknown,
    }
}

/// Resolves the repository, initializes its submodules and updates them.
///
/// Errors returned here are fatal. Failures of individual submodules or of the
/// track-latest batch are recorded in the report instead.
pub fn run<V, C>(vcs: &V, requests: &RefRequests, callbacks: &C) -> anyhow::Result<UpdateReport>
where
    V: VersionControl,
    C: UpdateCallbacks,
{
    let root = vcs
        .top_level()
        .context("Not a git repository or git command not found")?;

    callbacks.on_initializing();
    vcs.init_submodules(&root)
        .context("Failed to initialize submodules")?;
    callbacks.on_initialized();

    let submodules = vcs
        .list_submodules(&root)
        .context("Failed to list submodules")?;
    if submodules.is_empty() {
        return Ok(UpdateReport::NoSubmodules);
    }
    callbacks.on_discovered(&submodules);

    let plan = plan_updates(&submodules, requests);
    callbacks.on_planned(&plan);

    let results = update_submodules(vcs, &root, &plan, callbacks);
    Ok(UpdateReport::Updated {
        unknown: plan.unknown,
        results,
    })
}

/// Applies a plan: pinned submodules one by one, then the track-latest batch.
///
/// Never stops early; every unit of work produces exactly one result.
pub fn update_submodules<V, C>(
    vcs: &V,
    root: &Path,
    plan: &UpdatePlan,
    callbacks: &C,
) -> Vec<UpdateResult>
where
    V: VersionControl,
    C: UpdateCallbacks,
{
    let mut results = Vec::with_capacity(plan.explicit.len() + 1);

    for (path, reference) in &plan.explicit {
        let target = UpdateTarget::Explicit {
            path: path.clone(),
            reference: reference.clone(),
        };
        let dir = root.join(path);
        results.push(timed(target, callbacks, || {
            checkout_ref(vcs, &dir, reference, callbacks)
        }));
    }

    if !plan.track_latest.is_empty() {
        let target = UpdateTarget::Latest {
            paths: plan.track_latest.clone(),
        };
        results.push(timed(target, callbacks, || {
            callbacks.on_step(&UpdateStep::UpdatingRemote);
            at_step(
                UpdateStep::UpdatingRemote,
                vcs.update_remote(root, &plan.track_latest),
            )
        }));
    }

    results
}

fn checkout_ref<V, C>(
    vcs: &V,
    dir: &Path,
    reference: &str,
    callbacks: &C,
) -> Result<(), UpdateFailure>
where
    V: VersionControl,
    C: UpdateCallbacks,
{
    let step = UpdateStep::CheckingOut {
        reference: reference.to_string(),
    };
    at_step(step.clone(), git::validate_ref(reference))?;

    callbacks.on_step(&UpdateStep::Fetching);
    at_step(UpdateStep::Fetching, vcs.fetch_all(dir))?;

    callbacks.on_step(&step);
    at_step(step, vcs.checkout(dir, reference))
}

fn timed<C, F>(target: UpdateTarget, callbacks: &C, work: F) -> UpdateResult
where
    C: UpdateCallbacks,
    F: FnOnce() -> Result<(), UpdateFailure>,
{
    callbacks.on_start(&target);
    let started = Instant::now();
    let outcome = match work() {
        Ok(()) => UpdateOutcome::Success,
        Err(failure) => UpdateOutcome::Failed(failure),
    };
    let result = UpdateResult {
        target,
        outcome,
        duration: started.elapsed(),
    };
    callbacks.on_complete(&result);
    result
}

fn at_step(step: UpdateStep, result: anyhow::Result<()>) -> Result<(), UpdateFailure> {
    result.map_err(|e| UpdateFailure {
        step,
        error: format!("{:#}", e),
    })
}
