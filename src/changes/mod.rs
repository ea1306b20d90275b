//! Change collection from the working tree using git2.

use std::collections::BTreeSet;
use std::fmt;

use git2::{DiffFormat, DiffOptions, ErrorCode, Repository, Status, StatusOptions, Tree};
use tracing::warn;

use crate::error::GitError;

/// Maximum added/removed lines retained per file diff.
pub const MAX_DIFF_LINES: usize = 100;

/// Status of a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
    Untracked,
    Renamed,
}

impl FileStatus {
    /// Whether a diff is computed for files with this status.
    ///
    /// Pure deletions carry no representable content, and renames are
    /// reported by path pair rather than by line changes.
    pub fn diffable(&self) -> bool {
        matches!(
            self,
            FileStatus::Modified | FileStatus::Added | FileStatus::Untracked
        )
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Modified => write!(f, "Modified"),
            FileStatus::Added => write!(f, "Added"),
            FileStatus::Deleted => write!(f, "Deleted"),
            FileStatus::Untracked => write!(f, "Untracked"),
            FileStatus::Renamed => write!(f, "Renamed"),
        }
    }
}

/// A file that was changed in the working tree.
#[derive(Debug, Clone)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
}

/// Added/removed lines for one changed file, capped at [`MAX_DIFF_LINES`].
///
/// Lines keep their `+`/`-` origin prefix; hunk and file headers are never
/// included. A file with no representable diff (binary, empty) has no entry.
#[derive(Debug, Clone)]
pub struct FileDiff {
    pub path: String,
    pub changed_lines: Vec<String>,
}

/// All changed files plus their bounded diffs for one invocation.
///
/// Files and diffs are sorted by path, so downstream prompt construction is
/// byte-for-byte reproducible. Every diff path is present in `files`.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub files: Vec<ChangedFile>,
    pub diffs: Vec<FileDiff>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The set of paths a commit group may legitimately reference.
    pub fn valid_paths(&self) -> BTreeSet<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn diff_for(&self, path: &str) -> Option<&FileDiff> {
        self.diffs.iter().find(|d| d.path == path)
    }
}

/// Resolve the HEAD tree to diff against.
///
/// A repository with no commits yet (unborn branch) has no HEAD tree and
/// diffs against the empty baseline, so that case returns `Ok(None)`;
/// anything else that prevents peeling HEAD is a real failure.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::HeadResolution(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::HeadResolution)?;
    Ok(Some(tree))
}

/// Collect the current working-tree state as a [`ChangeSet`].
///
/// Enumerates changed paths with their status (untracked files included),
/// then computes a bounded per-file diff for every diffable path. A diff
/// failure for a single file is logged and that file simply contributes no
/// [`FileDiff`]; only status enumeration itself is fatal. Read-only.
pub fn collect_changes(repo: &Repository) -> Result<ChangeSet, GitError> {
    let mut status_opts = StatusOptions::new();
    status_opts
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .renames_head_to_index(true);

    let statuses = repo
        .statuses(Some(&mut status_opts))
        .map_err(GitError::StatusFailed)?;

    let mut files = Vec::new();
    for entry in statuses.iter() {
        let Some(path) = entry.path() else {
            warn!("skipping changed path that is not valid UTF-8");
            continue;
        };
        let Some(status) = classify_status(entry.status()) else {
            continue;
        };
        files.push(ChangedFile {
            path: path.to_string(),
            status,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|a, b| a.path == b.path);

    let head_tree = resolve_head_tree(repo)?;

    let mut diffs = Vec::new();
    for file in files.iter().filter(|f| f.status.diffable()) {
        match collect_file_diff(repo, head_tree.as_ref(), &file.path) {
            Ok(Some(diff)) => diffs.push(diff),
            Ok(None) => {}
            Err(e) => warn!("failed to diff {}: {e}", file.path),
        }
    }

    Ok(ChangeSet { files, diffs })
}

/// Map a git2 status bitfield onto a [`FileStatus`].
///
/// Ignored and unreadable entries return `None` and are excluded from the
/// change set entirely.
fn classify_status(status: Status) -> Option<FileStatus> {
    if status.contains(Status::IGNORED) {
        return None;
    }
    if status.contains(Status::WT_NEW) {
        return Some(FileStatus::Untracked);
    }
    if status.contains(Status::INDEX_NEW) {
        return Some(FileStatus::Added);
    }
    if status.contains(Status::WT_DELETED) || status.contains(Status::INDEX_DELETED) {
        return Some(FileStatus::Deleted);
    }
    if status.contains(Status::INDEX_RENAMED) || status.contains(Status::WT_RENAMED) {
        return Some(FileStatus::Renamed);
    }
    if status.contains(Status::WT_MODIFIED)
        || status.contains(Status::INDEX_MODIFIED)
        || status.contains(Status::WT_TYPECHANGE)
        || status.contains(Status::INDEX_TYPECHANGE)
    {
        return Some(FileStatus::Modified);
    }
    None
}

/// Compute the bounded diff for a single path against HEAD.
///
/// Untracked files are diffed with their full content visible (against the
/// empty baseline), so new-file content reaches the model within the same
/// cap. Only `+`/`-` content lines are kept; libgit2 reports file and hunk
/// headers under separate origins, so they never appear here.
fn collect_file_diff(
    repo: &Repository,
    head_tree: Option<&Tree<'_>>,
    path: &str,
) -> Result<Option<FileDiff>, git2::Error> {
    let mut opts = DiffOptions::new();
    opts.pathspec(path)
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .show_untracked_content(true);

    let diff = repo.diff_tree_to_workdir_with_index(head_tree, Some(&mut opts))?;

    let mut changed_lines = Vec::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if changed_lines.len() >= MAX_DIFF_LINES {
            return true;
        }
        let origin = line.origin();
        if origin == '+' || origin == '-' {
            let content = std::str::from_utf8(line.content())
                .unwrap_or("")
                .trim_end_matches('\n');
            changed_lines.push(format!("{origin}{content}"));
        }
        true
    })?;

    if changed_lines.is_empty() {
        Ok(None)
    } else {
        Ok(Some(FileDiff {
            path: path.to_string(),
            changed_lines,
        }))
    }
}
