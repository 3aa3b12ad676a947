//! # Repository Access Port
//!
//! This module defines the interface the promotion engine uses to read and
//! write the target repository. The promoters never talk to a hosting API
//! directly; they only see the [`RepositoryAccess`] trait.
//!
//! ## Design
//!
//! Two traits separate the engine from concrete bindings:
//!
//! - **`RepositoryAccess`**: branch, pull request and file operations on one
//!   repository. Every call blocks until the remote side has answered.
//!
//! - **`RepositoryConnector`**: turns a repository URL and an access token
//!   into a boxed `RepositoryAccess`. The orchestrator goes through this seam
//!   so tests can hand out an in-memory repository instead of a GitHub client.
//!
//! In the application, `GithubConnector` produces
//! [`GithubRepository`](crate::github::GithubRepository) instances. In tests,
//! [`MemoryRepository`](crate::memory::MemoryRepository) or a mock takes its
//! place.

use crate::error::Result;
use crate::github::GithubRepository;
use serde::{Deserialize, Serialize};

/// A file read from a branch of the target repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryFile {
    /// Repository-relative path, without a leading slash.
    pub path: String,
    /// Decoded file content.
    pub content: String,
    /// Content hash reported by the repository. Only used as a precondition
    /// for updates and deletes, never for change detection.
    pub sha: String,
}

impl RepositoryFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            sha: sha.into(),
        }
    }
}

/// An open pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    /// Browser URL of the pull request.
    pub url: String,
}

/// Operations on a single target repository.
///
/// `head` and `base` follow pull request terminology: changes flow from
/// `head` into `base`.
pub trait RepositoryAccess: Send + Sync {
    /// Returns whether `name` exists.
    fn branch_exists(&self, name: &str) -> Result<bool>;

    /// Creates `new_name` pointing at the current tip of `from_name`.
    fn create_branch(&self, from_name: &str, new_name: &str) -> Result<()>;

    /// Deletes a branch.
    fn delete_branch(&self, name: &str) -> Result<()>;

    /// Counts the commits reachable from `head` that are not on `base`.
    fn compare_commits(&self, base: &str, head: &str) -> Result<usize>;

    /// Returns the open pull request from `head` into `base`, if any.
    fn open_pull_request(&self, head: &str, base: &str) -> Result<Option<PullRequest>>;

    /// Opens a pull request from `head` into `base`.
    fn create_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest>;

    /// Replaces title and body of an existing pull request.
    fn edit_pull_request(&self, pr: &PullRequest, title: &str, body: &str) -> Result<()>;

    /// Lists the files at `path` on `branch`.
    ///
    /// A file path yields that file; a directory is expanded recursively. A
    /// path that does not exist yields an empty list.
    fn list_files(&self, branch: &str, path: &str) -> Result<Vec<RepositoryFile>>;

    /// Creates a new file on `branch`.
    fn create_file(&self, branch: &str, path: &str, content: &str) -> Result<()>;

    /// Replaces the content of `current` on `branch`. `current.sha` must
    /// still match the stored file.
    fn update_file(&self, branch: &str, current: &RepositoryFile, content: &str) -> Result<()>;

    /// Deletes `current` from `branch`. `current.sha` must still match the
    /// stored file.
    fn delete_file(&self, branch: &str, current: &RepositoryFile) -> Result<()>;

    /// Makes the files under `branch` match `desired`, given that `current`
    /// is what is there now. Returns the number of writes performed.
    fn sync_files(
        &self,
        branch: &str,
        current: &[RepositoryFile],
        desired: &[RepositoryFile],
    ) -> Result<usize> {
        crate::sync::sync_files(self, branch, current, desired)
    }
}

/// Opens a [`RepositoryAccess`] for a repository URL and access token.
pub trait RepositoryConnector: Send + Sync {
    fn connect(&self, repo_url: &str, token: &str) -> Result<Box<dyn RepositoryAccess>>;
}

/// Connector producing GitHub REST clients.
pub struct GithubConnector {
    api_url: String,
}

impl GithubConnector {
    /// Creates a connector talking to the given API root, e.g.
    /// `https://api.github.com`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }
}

impl RepositoryConnector for GithubConnector {
    fn connect(&self, repo_url: &str, token: &str) -> Result<Box<dyn RepositoryAccess>> {
        let repository = GithubRepository::new(&self.api_url, repo_url, token)?;
        Ok(Box::new(repository))
    }
}
