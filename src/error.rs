//! Error types for cleave modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from repository queries.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to resolve current branch: {0}")]
    BranchResolution(#[source] git2::Error),

    #[error("Current branch name is not valid UTF-8")]
    BranchNotUtf8,

    #[error("Failed to read working tree status: {0}")]
    StatusFailed(#[source] git2::Error),

    #[error("Failed to resolve HEAD tree: {0}")]
    HeadResolution(#[source] git2::Error),
}

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "{provider} requires an API key. Set CLEAVE_API_KEY or add \"api_key\" to .cleave.local.json"
    )]
    MissingApiKey { provider: &'static str },
}

/// Errors from generation backends.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} responded with HTTP {status}: {body}")]
    HttpStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },
}

/// Errors from reconciling model output against the change set.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Model output could not be parsed as commit groups: {reason}. Output began with: {snippet}")]
    MalformedOutput { reason: String, snippet: String },
}

/// Errors from staging and committing groups.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("git is required but was not found on PATH")]
    GitNotInstalled,

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    GitFailed {
        operation: &'static str,
        stderr: String,
    },
}
