//! # Validate Command Implementation
//!
//! Resolves the promotion config of a service exactly like `promote` does
//! and checks it, without contacting any repository. The merged config is
//! printed as YAML, followed by every violation found.

use anyhow::Result;
use clap::Args;

use git_promotion::config::Placeholders;
use git_promotion::resolver::{self, FileConfigStore};
use git_promotion::validation;

use super::{ScopeArgs, SettingsArgs};

/// Validate the promotion config of a service
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Only print violations, not the merged config
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs) -> Result<()> {
    let settings = args.settings.load()?;
    let next_stage = args.scope.resolve_next_stage()?;

    let store = FileConfigStore::with_file_name(&args.scope.config_dir, &settings.config_file);
    let placeholders = Placeholders::new(
        &args.scope.project,
        &args.scope.stage,
        next_stage,
        &args.scope.service,
    );
    let config = resolver::resolve(&store, &placeholders)?;

    if !args.quiet {
        print!("{}", serde_yaml::to_string(&config)?);
    }

    let violations = validation::validate(&config);
    if violations.is_empty() {
        println!("configuration is valid");
        return Ok(());
    }
    for violation in &violations {
        println!("error: {}", violation);
    }
    anyhow::bail!("{} validation errors", violations.len())
}
