//! Commit execution: per-group staging and committing, or a dry-run preview.
//!
//! All write operations shell out to the system `git` binary, inheriting the
//! user's git config, hooks, and commit signing setup. Per group the states
//! are Pending → Staged → Committed, or Pending → Skipped when staging
//! produced nothing; a failure aborts the remaining groups with commits
//! already created left in place.

use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::CommitError;
use crate::grouping::CommitGroup;

/// A reconciled group paired with its rendered commit message.
#[derive(Debug, Clone)]
pub struct PlannedCommit {
    pub group: CommitGroup,
    pub message: String,
}

/// What happened to one group during execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOutcome {
    Committed,
    /// Staging produced no staged changes; the group was skipped.
    SkippedNothingStaged,
}

/// Write-side version control operations, as a seam for tests.
pub trait Vcs {
    fn stage(&self, paths: &[String]) -> Result<(), CommitError>;
    fn has_staged_changes(&self) -> Result<bool, CommitError>;
    fn commit(&self, message: &str) -> Result<(), CommitError>;
}

/// Verify the `git` binary is reachable before any group is executed.
pub fn check_git_installed() -> Result<(), CommitError> {
    which::which("git")
        .map(|_| ())
        .map_err(|_| CommitError::GitNotInstalled)
}

/// Subprocess-backed [`Vcs`] implementation.
pub struct GitCommand {
    workdir: PathBuf,
}

impl GitCommand {
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }

    fn run_git(&self, args: &[&str], operation: &'static str) -> Result<(), CommitError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| CommitError::SpawnFailed { operation, source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CommitError::GitFailed {
                operation,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

impl Vcs for GitCommand {
    fn stage(&self, paths: &[String]) -> Result<(), CommitError> {
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_git(&args, "add")
    }

    fn has_staged_changes(&self) -> Result<bool, CommitError> {
        // `git diff --cached --quiet` exits 1 when the index differs from HEAD.
        let output = Command::new("git")
            .args(["diff", "--cached", "--quiet"])
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| CommitError::SpawnFailed {
                operation: "diff --cached",
                source,
            })?;

        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(CommitError::GitFailed {
                operation: "diff --cached",
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    fn commit(&self, message: &str) -> Result<(), CommitError> {
        self.run_git(&["commit", "-m", message], "commit")
    }
}

/// Flatten a message to one line; it travels as a single `-m` argument.
fn flatten_message(message: &str) -> String {
    message.replace('\r', "").replace('\n', " ")
}

/// Execute the plan: stage and commit each group, or preview it.
///
/// Dry-run mode prints each group's files and rendered message and performs
/// zero version-control calls. Otherwise each group is staged, verified to
/// have actually staged something (a group whose files are already clean is
/// skipped with a warning rather than producing an empty commit), and
/// committed.
pub fn execute_plan(
    vcs: &dyn Vcs,
    plan: &[PlannedCommit],
    dry_run: bool,
) -> Result<Vec<GroupOutcome>, CommitError> {
    if dry_run {
        for (index, planned) in plan.iter().enumerate() {
            println!("── commit {}/{}: {}", index + 1, plan.len(), planned.group.title);
            println!("   files:");
            for file in &planned.group.files {
                println!("     {file}");
            }
            println!("   message:");
            for line in planned.message.lines() {
                println!("     {line}");
            }
        }
        return Ok(Vec::new());
    }

    let mut outcomes = Vec::with_capacity(plan.len());

    for planned in plan {
        vcs.stage(&planned.group.files)?;

        if !vcs.has_staged_changes()? {
            println!(
                "⚠ Skipping group '{}': nothing staged (already committed or clean)",
                planned.group.title
            );
            outcomes.push(GroupOutcome::SkippedNothingStaged);
            continue;
        }

        let message = flatten_message(&planned.message);
        debug!("committing group '{}' ({} files)", planned.group.title, planned.group.files.len());
        vcs.commit(&message)?;
        println!(
            "✓ Committed '{}' ({} files)",
            planned.group.title,
            planned.group.files.len()
        );
        outcomes.push(GroupOutcome::Committed);
    }

    Ok(outcomes)
}
