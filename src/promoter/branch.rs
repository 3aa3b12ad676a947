//! Branch strategy: promote a stage branch into the next one.

use super::PromotionOutcome;
use crate::error::Result;
use crate::repository::RepositoryAccess;
use log::info;

pub const MSG_OPENED: &str = "opened pull request";
pub const MSG_UPDATED: &str = "updated pull request";
pub const MSG_UNMANAGED: &str = "unmanaged pull request already open";

/// Opens or refreshes the pull request from one branch into another.
pub struct BranchPromoter<'a> {
    repo: &'a dyn RepositoryAccess,
    title_prefix: &'a str,
}

impl<'a> BranchPromoter<'a> {
    /// Pull requests whose title starts with `title_prefix` are considered
    /// managed and are updated on every run.
    pub fn new(repo: &'a dyn RepositoryAccess, title_prefix: &'a str) -> Self {
        Self { repo, title_prefix }
    }

    /// Promotes `from_branch` into `to_branch`.
    ///
    /// Without new commits on `from_branch` nothing happens. Otherwise the
    /// open pull request for the pair is created, updated (when managed) or
    /// left alone (when someone else opened it).
    pub fn promote(
        &self,
        from_branch: &str,
        to_branch: &str,
        title: &str,
        body: &str,
    ) -> Result<PromotionOutcome> {
        let new_commits = self.repo.compare_commits(to_branch, from_branch)?;
        if new_commits == 0 {
            info!(
                "no difference found from branch {} to {}",
                from_branch, to_branch
            );
            return Ok(PromotionOutcome::message(format!(
                "no difference between branches {} and {} found => nothing to do",
                from_branch, to_branch
            )));
        }

        match self.repo.open_pull_request(from_branch, to_branch)? {
            None => {
                let pr = self
                    .repo
                    .create_pull_request(from_branch, to_branch, title, body)?;
                info!(
                    "opened pull request {} from branch {} to {}",
                    pr.number, from_branch, to_branch
                );
                Ok(PromotionOutcome::with_pull_request(MSG_OPENED, pr.url))
            }
            Some(pr) if pr.title.starts_with(self.title_prefix) => {
                self.repo.edit_pull_request(&pr, title, body)?;
                info!(
                    "updated pull request {} from branch {} to {}",
                    pr.number, from_branch, to_branch
                );
                Ok(PromotionOutcome::with_pull_request(MSG_UPDATED, pr.url))
            }
            Some(pr) => {
                info!(
                    "pull request {} with title {} is not managed, leaving it untouched",
                    pr.number, pr.title
                );
                Ok(PromotionOutcome::with_pull_request(MSG_UNMANAGED, pr.url))
            }
        }
    }
}
