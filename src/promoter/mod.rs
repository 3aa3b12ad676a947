//! # Promoters
//!
//! The two promotion strategies. Both drive a [`RepositoryAccess`] and end
//! in a [`PromotionOutcome`]: a human-readable message plus the link of the
//! pull request the run opened, updated or found.
//!
//! - [`branch::BranchPromoter`] promotes a long-lived stage branch into the
//!   next one through a single pull request.
//! - [`flat_pr::FlatPrPromoter`] renders templated files into a fresh
//!   promotion branch and opens a pull request for it.
//!
//! Outcomes where nothing had to be done are successes, not errors.
//!
//! [`RepositoryAccess`]: crate::repository::RepositoryAccess

pub mod branch;
pub mod flat_pr;

pub use branch::BranchPromoter;
pub use flat_pr::FlatPrPromoter;

/// Result of a successful promotion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionOutcome {
    pub message: String,
    /// URL of the pull request the run is about, if any.
    pub pull_request: Option<String>,
}

impl PromotionOutcome {
    /// An outcome without a pull request.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            pull_request: None,
        }
    }

    pub fn with_pull_request(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            pull_request: Some(url.into()),
        }
    }
}
