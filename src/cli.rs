//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Git promotion - Promote artifacts between stages through a Git repository
#[derive(Parser, Debug)]
#[command(name = "git-promotion")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Promote a service to the next stage
    Promote(commands::promote::PromoteArgs),

    /// Validate the promotion config of a service
    Validate(commands::validate::ValidateArgs),

    /// Print the substitution fields of an event
    Fields(commands::fields::FieldsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // RUST_LOG takes precedence over --log-level
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .try_init();

        match self.command {
            Commands::Promote(args) => commands::promote::execute(args),
            Commands::Validate(args) => commands::validate::execute(args),
            Commands::Fields(args) => commands::fields::execute(args),
        }
    }
}
