//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `git-promotion` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `git_promotion` library.
//!
//! Arguments shared by several commands live here.

pub mod fields;
pub mod promote;
pub mod validate;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use git_promotion::settings::{Settings, UnchangedPathPolicy};
use git_promotion::stages::{StageList, StageSequencer};

/// Where promotion configs live and which service they are resolved for.
#[derive(Args, Debug, Clone)]
pub struct ScopeArgs {
    /// Directory holding the promotion config fragments.
    ///
    /// Fragments are read from `<dir>/<file>`, `<dir>/<stage>/<file>` and
    /// `<dir>/<stage>/<service>/<file>`.
    #[arg(long, value_name = "DIR", env = "GIT_PROMOTION_CONFIG_DIR", default_value = ".")]
    pub config_dir: PathBuf,

    /// Project the service belongs to
    #[arg(long, env = "GIT_PROMOTION_PROJECT")]
    pub project: String,

    /// Stage the service is promoted from
    #[arg(long, env = "GIT_PROMOTION_STAGE")]
    pub stage: String,

    /// Service to promote
    #[arg(long, env = "GIT_PROMOTION_SERVICE")]
    pub service: String,

    /// Ordered, comma separated list of stages, e.g. `dev,staging,production`
    #[arg(long, value_name = "LIST", env = "GIT_PROMOTION_STAGES", conflicts_with = "next_stage")]
    pub stages: Option<String>,

    /// Stage to promote to, instead of looking it up in `--stages`
    #[arg(long, value_name = "STAGE")]
    pub next_stage: Option<String>,
}

impl ScopeArgs {
    /// The stage the promotion goes to.
    pub fn resolve_next_stage(&self) -> Result<String> {
        if let Some(next) = &self.next_stage {
            return Ok(next.clone());
        }
        let stages = self
            .stages
            .as_deref()
            .context("either --stages or --next-stage is required")?;
        Ok(StageList::parse(stages).next_stage(&self.project, &self.stage)?)
    }
}

/// Settings file and per-run overrides.
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// YAML file with service settings
    #[arg(long, value_name = "FILE", env = "GIT_PROMOTION_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Prefix of managed pull request titles
    #[arg(long, env = "GIT_PROMOTION_TITLE_PREFIX")]
    pub title_prefix: Option<String>,

    /// Namespace of substitution marker comments
    #[arg(long, env = "GIT_PROMOTION_MARKER_NAMESPACE")]
    pub marker_namespace: Option<String>,

    /// Branch flat-pr promotions start from
    #[arg(long, env = "GIT_PROMOTION_BASE_BRANCH")]
    pub base_branch: Option<String>,

    /// Base URL linked from pull request bodies
    #[arg(long, value_name = "URL", env = "GIT_PROMOTION_EXTERNAL_URL")]
    pub external_url: Option<String>,

    /// What to do with a path that has nothing to promote (stop, skip) [default: stop]
    #[arg(long, value_name = "POLICY", env = "GIT_PROMOTION_UNCHANGED_PATHS")]
    pub unchanged_paths: Option<UnchangedPathPolicy>,

    /// File name of promotion config fragments
    #[arg(long, value_name = "NAME", env = "GIT_PROMOTION_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Root of the GitHub REST API
    #[arg(long, value_name = "URL", env = "GIT_PROMOTION_API_URL")]
    pub api_url: Option<String>,
}

impl SettingsArgs {
    /// Loads the settings file, if any, and applies the overrides.
    pub fn load(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::from_file(path)
                .with_context(|| format!("failed to read settings from {}", path.display()))?,
            None => Settings::default(),
        };
        override_with(&mut settings.title_prefix, &self.title_prefix);
        override_with(&mut settings.marker_namespace, &self.marker_namespace);
        override_with(&mut settings.base_branch, &self.base_branch);
        override_with(&mut settings.config_file, &self.config_file);
        override_with(&mut settings.api_url, &self.api_url);
        if self.external_url.is_some() {
            settings.external_url = self.external_url.clone();
        }
        if let Some(policy) = self.unchanged_paths {
            settings.unchanged_paths = policy;
        }
        Ok(settings)
    }
}

fn override_with(current: &mut String, new: &Option<String>) {
    if let Some(value) = new {
        *current = value.clone();
    }
}
