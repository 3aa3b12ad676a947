//! # Promotion Orchestrator
//!
//! Drives a single promotion run from request to report:
//!
//! 1. **Next stage**: ask the [`StageSequencer`] where `stage` promotes to.
//! 2. **Resolve**: merge the config fragments and fill in placeholders.
//! 3. **Validate**: reject configs that break any rule, listing every
//!    violation.
//! 4. **Secret**: fetch the access token named by `target.secret`.
//! 5. **Connect**: open the target repository through the
//!    [`RepositoryConnector`].
//! 6. **Dispatch**: run the branch or flat-pr promoter.
//!
//! Every run ends in exactly one [`PromotionReport`]. Failures never escape
//! as errors; they are turned into an errored report whose message names
//! the step that failed. Causes are logged.

use crate::config::{Placeholders, Strategy};
use crate::error::Error;
use crate::fields::FieldMap;
use crate::promoter::{BranchPromoter, FlatPrPromoter, PromotionOutcome};
use crate::repository::RepositoryConnector;
use crate::resolver::{self, ConfigStore};
use crate::secrets::SecretStore;
use crate::settings::Settings;
use crate::stages::StageSequencer;
use crate::substitution::Substituter;
use crate::validation;
use log::{error, info};
use serde::Serialize;
use std::fmt;

pub const MSG_NEXT_STAGE: &str = "error while reading next stage";
pub const MSG_CONFIG: &str = "error while reading promotion config";
pub const MSG_SECRET: &str = "error while reading secret";
pub const MSG_CONNECT: &str = "error while connecting to repository";
pub const MSG_PULL_REQUEST: &str = "error while opening pull request";

/// What to promote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionRequest {
    pub project: String,
    pub stage: String,
    pub service: String,
    /// Identifier of the run, used in branch names and pull request texts.
    pub context: String,
    /// Fields available to marker substitution.
    pub fields: FieldMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionStatus {
    Succeeded,
    Errored,
}

impl fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromotionStatus::Succeeded => f.write_str("succeeded"),
            PromotionStatus::Errored => f.write_str("errored"),
        }
    }
}

/// Terminal result of a promotion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromotionReport {
    pub status: PromotionStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<String>,
}

impl PromotionReport {
    pub fn errored(message: impl Into<String>) -> Self {
        Self {
            status: PromotionStatus::Errored,
            message: message.into(),
            pull_request: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PromotionStatus::Succeeded
    }
}

impl From<PromotionOutcome> for PromotionReport {
    fn from(outcome: PromotionOutcome) -> Self {
        Self {
            status: PromotionStatus::Succeeded,
            message: outcome.message,
            pull_request: outcome.pull_request,
        }
    }
}

/// Name of the branch a flat-pr run writes to.
pub fn branch_name(stage: &str, next_stage: &str, context: &str) -> String {
    format!("promote/{}_{}-{}", stage, next_stage, context)
}

/// Title of a managed promotion pull request.
///
/// # Examples
///
/// ```
/// use git_promotion::promotion::pull_request_title;
///
/// assert_eq!(
///     pull_request_title("promotion:", "staging", "1234"),
///     "promotion: Promote to stage staging (ctx: 1234)"
/// );
/// ```
pub fn pull_request_title(prefix: &str, next_stage: &str, context: &str) -> String {
    format!("{} Promote to stage {} (ctx: {})", prefix, next_stage, context)
}

/// Body of a promotion pull request.
pub fn pull_request_body(
    external_url: Option<&str>,
    context: &str,
    project: &str,
    service: &str,
    stage: &str,
) -> String {
    let run = match external_url {
        Some(url) => format!(
            "[{}]({}/bridge/project/{}/sequence/{}/stage/{})",
            context,
            url.trim_end_matches('/'),
            project,
            context,
            stage
        ),
        None => context.to_string(),
    };
    format!(
        "Opened by promotion run {}.\n\nProject: *{}*\nService: *{}*\nStage: *{}*",
        run, project, service, stage
    )
}

/// Everything a promotion run needs, wired together.
pub struct Promotion {
    settings: Settings,
    substituter: Substituter,
    configs: Box<dyn ConfigStore>,
    secrets: Box<dyn SecretStore>,
    stages: Box<dyn StageSequencer>,
    connector: Box<dyn RepositoryConnector>,
}

impl Promotion {
    pub fn new(
        settings: Settings,
        configs: impl ConfigStore + 'static,
        secrets: impl SecretStore + 'static,
        stages: impl StageSequencer + 'static,
        connector: impl RepositoryConnector + 'static,
    ) -> Self {
        let substituter = Substituter::new(settings.marker_namespace.clone());
        Self {
            settings,
            substituter,
            configs: Box::new(configs),
            secrets: Box::new(secrets),
            stages: Box::new(stages),
            connector: Box::new(connector),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs one promotion and reports how it ended.
    pub fn run(&self, request: &PromotionRequest) -> PromotionReport {
        info!(
            "promoting service {} of project {} from stage {}",
            request.service, request.project, request.stage
        );
        let report = self.execute(request);
        if report.is_success() {
            info!("promotion finished: {}", report.message);
        } else {
            error!("promotion failed: {}", report.message);
        }
        report
    }

    fn execute(&self, request: &PromotionRequest) -> PromotionReport {
        let next_stage = match self.stages.next_stage(&request.project, &request.stage) {
            Ok(next_stage) => next_stage,
            Err(e) => {
                error!("reading next stage of {} failed: {}", request.stage, e);
                return PromotionReport::errored(MSG_NEXT_STAGE);
            }
        };

        let placeholders = Placeholders::new(
            &request.project,
            &request.stage,
            &next_stage,
            &request.service,
        );
        let config = match resolver::resolve(self.configs.as_ref(), &placeholders) {
            Ok(config) => config,
            Err(e) => {
                error!("reading promotion config failed: {}", e);
                return PromotionReport::errored(MSG_CONFIG);
            }
        };

        let violations = validation::validate(&config);
        if !violations.is_empty() {
            return PromotionReport::errored(format!(
                "validation error: {}",
                violations.join(",")
            ));
        }

        // presence of these fields is guaranteed by validation
        let (Some(repo_url), Some(secret), Some(strategy)) = (
            config.spec.target.repo.as_deref(),
            config.spec.target.secret.as_deref(),
            config.strategy(),
        ) else {
            return PromotionReport::errored(MSG_CONFIG);
        };

        let token = match self.secrets.token(secret) {
            Ok(token) => token,
            Err(e) => {
                error!("reading secret {} failed: {}", secret, e);
                return PromotionReport::errored(MSG_SECRET);
            }
        };

        let repo = match self.connector.connect(repo_url, &token) {
            Ok(repo) => repo,
            Err(e) => {
                error!("connecting to {} failed: {}", repo_url, e);
                return PromotionReport::errored(format!("{}: {}", MSG_CONNECT, e));
            }
        };

        let title = pull_request_title(&self.settings.title_prefix, &next_stage, &request.context);
        let body = pull_request_body(
            self.settings.external_url.as_deref(),
            &request.context,
            &request.project,
            &request.service,
            &request.stage,
        );

        info!("promoting with strategy {} into {}", strategy, repo_url);
        let result = match strategy {
            Strategy::Branch => BranchPromoter::new(repo.as_ref(), &self.settings.title_prefix)
                .promote(&request.stage, &next_stage, &title, &body),
            Strategy::FlatPr => FlatPrPromoter::new(
                repo.as_ref(),
                &self.substituter,
                self.settings.unchanged_paths,
            )
            .promote(
                &request.fields,
                &self.settings.base_branch,
                &branch_name(&request.stage, &next_stage, &request.context),
                &title,
                &body,
                &config.spec.paths,
            ),
        };

        match result {
            Ok(outcome) => outcome.into(),
            Err(e) => {
                error!("{} strategy failed on repository {}: {}", strategy, repo_url, e);
                PromotionReport::errored(failure_message(&e))
            }
        }
    }
}

fn failure_message(error: &Error) -> String {
    if error.is_conflict() {
        error.to_string()
    } else {
        format!("{}: {}", MSG_PULL_REQUEST, error)
    }
}
