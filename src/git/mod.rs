//! Repository discovery and branch resolution.

use std::path::Path;

use git2::{ErrorCode, Repository};

use crate::error::GitError;

/// Discover the repository containing `path`, walking up parent directories.
pub fn discover_repository(path: &Path) -> Result<Repository, GitError> {
    Repository::discover(path).map_err(GitError::OpenRepository)
}

/// Resolve the name of the currently checked-out branch.
///
/// On an unborn branch (fresh repository with no commits) HEAD cannot be
/// peeled, so the name is read from HEAD's symbolic target instead. A
/// detached HEAD resolves to the literal shorthand `HEAD`.
pub fn current_branch(repo: &Repository) -> Result<String, GitError> {
    match repo.head() {
        Ok(head) => head
            .shorthand()
            .map(str::to_string)
            .ok_or(GitError::BranchNotUtf8),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            let head_ref = repo
                .find_reference("HEAD")
                .map_err(GitError::BranchResolution)?;
            let target = head_ref.symbolic_target().ok_or(GitError::BranchNotUtf8)?;
            Ok(target.trim_start_matches("refs/heads/").to_string())
        }
        Err(e) => Err(GitError::BranchResolution(e)),
    }
}
