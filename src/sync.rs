//! # Diff & Sync
//!
//! Compares two sets of repository files and writes the minimal set of
//! changes that turns one into the other.
//!
//! ## Functionality
//!
//! - **Equality**: [`files_equal`] decides whether a path needs any work at
//!   all. Only paths and contents are compared; content hashes are ignored.
//! - **Planning**: [`plan`] computes the changes (create, update, delete)
//!   between the current and the desired file set. It is a pure function and
//!   returns changes in path order, creates/updates first, then deletes.
//! - **Sync**: [`sync_files`] executes a plan against a
//!   [`RepositoryAccess`] and reports how many writes it performed.
//!
//! Both file sets are indexed by path in sorted maps, so the order of the
//! input slices never influences the result.

use crate::error::Result;
use crate::repository::{RepositoryAccess, RepositoryFile};
use log::debug;
use std::collections::BTreeMap;

/// Kind of change needed for a single path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Path is desired but does not exist yet
    Create,
    /// Path exists with different content
    Update,
    /// Path exists but is no longer desired
    Delete,
}

/// A single planned change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change<'a> {
    pub kind: ChangeKind,
    pub path: &'a str,
    /// The file as it is now (for updates and deletes)
    pub current: Option<&'a RepositoryFile>,
    /// The content to write (for creates and updates)
    pub content: Option<&'a str>,
}

fn index<'a>(files: &'a [RepositoryFile]) -> BTreeMap<&'a str, &'a RepositoryFile> {
    files.iter().map(|f| (f.path.as_str(), f)).collect()
}

/// Returns true if both sets hold the same paths with the same contents.
///
/// # Examples
///
/// ```
/// use git_promotion::repository::RepositoryFile;
/// use git_promotion::sync::files_equal;
///
/// let a = vec![RepositoryFile::new("dev/x", "1", "sha1")];
/// let b = vec![RepositoryFile::new("dev/x", "1", "another-sha")];
/// assert!(files_equal(&a, &b));
/// ```
pub fn files_equal(first: &[RepositoryFile], second: &[RepositoryFile]) -> bool {
    if first.len() != second.len() {
        return false;
    }
    let by_path = index(first);
    second.iter().all(|file| {
        by_path
            .get(file.path.as_str())
            .is_some_and(|other| other.content == file.content)
    })
}

/// Computes the changes that turn `current` into `desired`.
pub fn plan<'a>(current: &'a [RepositoryFile], desired: &'a [RepositoryFile]) -> Vec<Change<'a>> {
    let current_by_path = index(current);
    let desired_by_path = index(desired);
    let mut changes = Vec::new();

    for (&path, &wanted) in &desired_by_path {
        match current_by_path.get(path).copied() {
            None => changes.push(Change {
                kind: ChangeKind::Create,
                path,
                current: None,
                content: Some(wanted.content.as_str()),
            }),
            Some(existing) if existing.content != wanted.content => changes.push(Change {
                kind: ChangeKind::Update,
                path,
                current: Some(existing),
                content: Some(wanted.content.as_str()),
            }),
            Some(_) => debug!("ignoring file {} (no changes detected)", path),
        }
    }

    for (&path, &existing) in &current_by_path {
        if !desired_by_path.contains_key(path) {
            changes.push(Change {
                kind: ChangeKind::Delete,
                path,
                current: Some(existing),
                content: None,
            });
        }
    }

    changes
}

/// Writes the changes between `current` and `desired` to `branch`.
///
/// Returns the number of files created, updated or deleted. The first
/// failing write aborts the sync; writes already performed stay in place.
pub fn sync_files<R: RepositoryAccess + ?Sized>(
    repo: &R,
    branch: &str,
    current: &[RepositoryFile],
    desired: &[RepositoryFile],
) -> Result<usize> {
    debug!(
        "syncing branch {} with {} current and {} desired files",
        branch,
        current.len(),
        desired.len()
    );

    let mut changes = 0;
    for change in plan(current, desired) {
        match (change.kind, change.current, change.content) {
            (ChangeKind::Create, _, Some(content)) => {
                debug!("creating file {} in branch {}", change.path, branch);
                repo.create_file(branch, change.path, content)?;
            }
            (ChangeKind::Update, Some(existing), Some(content)) => {
                debug!("updating file {} in branch {}", change.path, branch);
                repo.update_file(branch, existing, content)?;
            }
            (ChangeKind::Delete, Some(existing), _) => {
                debug!("deleting file {} in branch {}", change.path, branch);
                repo.delete_file(branch, existing)?;
            }
            _ => continue,
        }
        changes += 1;
    }
    Ok(changes)
}
