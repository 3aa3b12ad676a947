//! # Promote Command Implementation
//!
//! Runs a full promotion: resolves and validates the config of a service,
//! reads the access token from the environment, connects to GitHub and runs
//! the configured strategy. The report is printed to stdout; an errored
//! report makes the command fail.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use git_promotion::fields::{self, FieldMap};
use git_promotion::promotion::{Promotion, PromotionRequest};
use git_promotion::repository::GithubConnector;
use git_promotion::resolver::FileConfigStore;
use git_promotion::secrets::EnvSecretStore;
use git_promotion::stages::FixedStage;

use super::{ScopeArgs, SettingsArgs};

/// Promote a service to the next stage
#[derive(Args, Debug)]
pub struct PromoteArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// JSON event providing the fields for marker substitution
    #[arg(long, value_name = "FILE")]
    pub event: Option<PathBuf>,

    /// Identifier of this run. Defaults to the `id` of the event.
    #[arg(long, env = "GIT_PROMOTION_CONTEXT")]
    pub context: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

fn read_fields(event: Option<&PathBuf>) -> Result<FieldMap> {
    let Some(path) = event else {
        return Ok(FieldMap::new());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event {}", path.display()))?;
    let event: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("event {} is not valid JSON", path.display()))?;
    Ok(fields::from_event(&event))
}

/// Execute the `promote` command.
pub fn execute(args: PromoteArgs) -> Result<()> {
    let settings = args.settings.load()?;
    let next_stage = args.scope.resolve_next_stage()?;
    let fields = read_fields(args.event.as_ref())?;

    let context = match args.context.clone().or_else(|| fields.get("id").cloned()) {
        Some(context) => context,
        None => anyhow::bail!("--context is required when the event carries no id"),
    };

    let configs = FileConfigStore::with_file_name(&args.scope.config_dir, &settings.config_file);
    let connector = GithubConnector::new(settings.api_url.clone());
    let promotion = Promotion::new(
        settings,
        configs,
        EnvSecretStore::default(),
        FixedStage(next_stage),
        connector,
    );

    let report = promotion.run(&PromotionRequest {
        project: args.scope.project.clone(),
        stage: args.scope.stage.clone(),
        service: args.scope.service.clone(),
        context,
        fields,
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}: {}", report.status, report.message);
        if let Some(link) = &report.pull_request {
            println!("pull request: {}", link);
        }
    }

    if !report.is_success() {
        anyhow::bail!("promotion failed: {}", report.message);
    }
    Ok(())
}
