//! # Fields Command Implementation
//!
//! Prints the field map of an event, one `key=value` per line in key order.
//! Handy for finding the key to put into a marker comment.

use anyhow::{Context, Result};
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

use git_promotion::fields;

/// Print the substitution fields of an event
#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// JSON event file; `-` reads from stdin
    #[arg(value_name = "FILE")]
    pub event: PathBuf,
}

/// Execute the `fields` command.
pub fn execute(args: FieldsArgs) -> Result<()> {
    let content = if args.event.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(&args.event)
            .with_context(|| format!("failed to read event {}", args.event.display()))?
    };
    let event: serde_json::Value =
        serde_json::from_str(&content).context("event is not valid JSON")?;

    for (key, value) in fields::from_event(&event) {
        println!("{}={}", key, value);
    }
    Ok(())
}
