//! # Git Promotion Library
//!
//! This library promotes versioned artifacts between pipeline stages by
//! writing to a Git repository. It is used by the `git-promotion`
//! command-line tool but can be embedded in any service that reacts to
//! promotion events.
//!
//! ## Quick Example
//!
//! ```
//! use git_promotion::config::PathMapping;
//! use git_promotion::fields::FieldMap;
//! use git_promotion::memory::MemoryRepository;
//! use git_promotion::promoter::FlatPrPromoter;
//! use git_promotion::settings::UnchangedPathPolicy;
//! use git_promotion::substitution::Substituter;
//!
//! // An in-memory repository with one template
//! let repo = MemoryRepository::new();
//! repo.add_file(
//!     "main",
//!     "templates/values.yaml",
//!     r#"tag: latest # {"git-promotion.replacewith":"data.image.tag"}"#,
//! )
//! .unwrap();
//!
//! let mut fields = FieldMap::new();
//! fields.insert("data.image.tag".to_string(), "2.6.0".to_string());
//!
//! // Render the templates into "dev" on a promotion branch
//! let substituter = Substituter::default();
//! let outcome = FlatPrPromoter::new(&repo, &substituter, UnchangedPathPolicy::default())
//!     .promote(
//!         &fields,
//!         "main",
//!         "promote/dev",
//!         "promotion: Promote to stage dev",
//!         "",
//!         &[PathMapping::new("templates", "dev")],
//!     )
//!     .unwrap();
//!
//! assert_eq!(outcome.message, "opened pull request");
//! assert_eq!(
//!     repo.file("promote/dev", "dev/values.yaml").unwrap().as_deref(),
//!     Some(r#"tag: 2.6.0 # {"git-promotion.replacewith":"data.image.tag"}"#)
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`, `resolver`, `validation`)**: The
//!   `git-promotion.yaml` schema, layering of project, stage and service
//!   fragments, placeholder resolution and validation.
//! - **Promoters (`promoter`)**: The `branch` and `flat-pr` strategies.
//! - **Diff & Sync (`sync`)**: Minimal file-level changes between two sets
//!   of repository files.
//! - **Field Substitution (`fields`, `substitution`)**: Event fields written
//!   into marker-annotated lines of managed files.
//! - **Repository Access (`repository`, `github`, `memory`)**: The port the
//!   promoters talk to, with a GitHub REST binding and an in-memory one.
//! - **Collaborators (`secrets`, `stages`)**: Access tokens and stage order.
//!
//! ## Execution Flow
//!
//! The entry point is [`promotion::Promotion::run`]:
//!
//! 1.  **Next stage**: Look up the stage being promoted to.
//! 2.  **Resolve**: Merge the config fragments and resolve placeholders.
//! 3.  **Validate**: Collect every rule violation of the merged config.
//! 4.  **Secret**: Read the repository access token.
//! 5.  **Connect**: Open the target repository.
//! 6.  **Promote**: Run the configured strategy and report the outcome.

pub mod config;
pub mod error;
pub mod fields;
pub mod github;
pub mod memory;
pub mod path;
pub mod promoter;
pub mod promotion;
pub mod repository;
pub mod resolver;
pub mod secrets;
pub mod settings;
pub mod stages;
pub mod substitution;
pub mod sync;
pub mod validation;

#[cfg(test)]
mod path_proptest;
