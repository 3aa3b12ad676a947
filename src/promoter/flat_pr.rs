//! Flat-pr strategy: render templated files into a promotion branch.
//!
//! For every configured path the files at the read location (`source`, or
//! `target` when templating in place) are run through field substitution,
//! moved below `target` and synced into a freshly created promotion branch.
//! A pull request from that branch back into the source branch is opened
//! once at least one file changed; otherwise the branch is removed again.
//!
//! A path whose rendered files already match the target ends the run with
//! "no changes detected" unless the [`UnchangedPathPolicy::Skip`] policy is
//! selected, in which case the next path is processed.

use super::PromotionOutcome;
use crate::config::PathMapping;
use crate::error::{Error, Result};
use crate::fields::FieldMap;
use crate::path;
use crate::repository::{RepositoryAccess, RepositoryFile};
use crate::settings::UnchangedPathPolicy;
use crate::substitution::Substituter;
use crate::sync::files_equal;
use log::info;

pub const MSG_OPENED: &str = "opened pull request";
pub const MSG_NO_CHANGES: &str = "no changes found => no pull request necessary";
pub const MSG_UNCHANGED_PATH: &str = "no changes detected";

/// Syncs rendered files into an ephemeral promotion branch.
pub struct FlatPrPromoter<'a> {
    repo: &'a dyn RepositoryAccess,
    substituter: &'a Substituter,
    policy: UnchangedPathPolicy,
}

impl<'a> FlatPrPromoter<'a> {
    pub fn new(
        repo: &'a dyn RepositoryAccess,
        substituter: &'a Substituter,
        policy: UnchangedPathPolicy,
    ) -> Self {
        Self {
            repo,
            substituter,
            policy,
        }
    }

    /// Promotes the configured `paths` from `source_branch` through the new
    /// branch `target_branch`.
    ///
    /// Fails with [`Error::BranchExists`] if `target_branch` is already
    /// there. A failure while processing a path aborts the run and leaves
    /// `target_branch` behind.
    pub fn promote(
        &self,
        fields: &FieldMap,
        source_branch: &str,
        target_branch: &str,
        title: &str,
        body: &str,
        paths: &[PathMapping],
    ) -> Result<PromotionOutcome> {
        info!(
            "starting flat-pr promotion from {} into {} with {} fields",
            source_branch,
            target_branch,
            fields.len()
        );

        if self.repo.branch_exists(target_branch)? {
            return Err(Error::BranchExists {
                branch: target_branch.to_string(),
            });
        }
        self.repo.create_branch(source_branch, target_branch)?;

        let mut changes = 0;
        for (index, mapping) in paths.iter().enumerate() {
            let Some(path_changes) =
                self.promote_path(fields, source_branch, target_branch, index, mapping)?
            else {
                info!("no changes detected, stopping");
                return Ok(PromotionOutcome::message(MSG_UNCHANGED_PATH));
            };
            changes += path_changes;
        }

        info!("committed {} changes to branch {}", changes, target_branch);
        if changes == 0 {
            info!("no changes found, deleting branch {}", target_branch);
            self.repo.delete_branch(target_branch)?;
            return Ok(PromotionOutcome::message(MSG_NO_CHANGES));
        }

        let pr = self
            .repo
            .create_pull_request(target_branch, source_branch, title, body)?;
        info!(
            "opened pull request {} from branch {} to {}",
            pr.number, target_branch, source_branch
        );
        Ok(PromotionOutcome::with_pull_request(MSG_OPENED, pr.url))
    }

    /// Syncs one path. Returns `None` when the path is unchanged and the
    /// policy says to stop.
    fn promote_path(
        &self,
        fields: &FieldMap,
        source_branch: &str,
        target_branch: &str,
        index: usize,
        mapping: &PathMapping,
    ) -> Result<Option<usize>> {
        let target = match mapping.target.as_deref() {
            Some(target) if !target.is_empty() => target,
            _ => {
                return Err(Error::Validation {
                    violations: vec![format!(r#""paths[{}].target" is missing"#, index)],
                })
            }
        };

        let read_location = mapping.read_location().unwrap_or(target);
        let originals = self.repo.list_files(source_branch, read_location)?;
        let current = match mapping.source.as_deref() {
            Some(_) => self.repo.list_files(source_branch, target)?,
            None => originals.clone(),
        };

        let mut candidates = Vec::with_capacity(originals.len());
        for file in originals {
            let content = self.substituter.substitute(&file.content, fields)?;
            let file_path = match mapping.source.as_deref() {
                Some(source) => path::rewrite_prefix(&file.path, source, target),
                None => file.path,
            };
            candidates.push(RepositoryFile::new(file_path, content, file.sha));
        }

        if files_equal(&current, &candidates) {
            return match self.policy {
                UnchangedPathPolicy::Stop => Ok(None),
                UnchangedPathPolicy::Skip => {
                    info!("no changes detected for path {}, skipping", target);
                    Ok(Some(0))
                }
            };
        }

        let changes = self.repo.sync_files(target_branch, &current, &candidates)?;
        info!("synced {} files into {} for path {}", changes, target_branch, target);
        Ok(Some(changes))
    }
}
