//! # Git Promotion CLI
//!
//! This is the binary entry point for the `git-promotion` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging.
//! - Executing the appropriate command based on the parsed arguments.
//!
//! The promotion logic lives in the `git_promotion` library crate; the binary
//! only wires the file, environment and GitHub bindings together.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
