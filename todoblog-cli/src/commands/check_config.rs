//! Print resolved settings as JSON

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use todoblog_core::{AppConfig, ConnectionDescriptor, EnvSnapshot};
use todoblog_server::resolve_contexts;

#[derive(Parser, Debug)]
pub struct CheckConfigArgs {
    /// Emit compact single-line JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    production: bool,
    bind: String,
    seed: bool,
    contexts: &'a [ConnectionDescriptor],
}

/// Resolve every context and print the result. Nothing is connected to.
pub fn run_check_config(args: CheckConfigArgs, config: &AppConfig, env: &EnvSnapshot) -> Result<()> {
    let descriptors =
        resolve_contexts(config, env).context("failed to resolve database connections")?;

    let report = Report {
        production: env.is_production(),
        bind: config.bind_addr()?.to_string(),
        seed: config.seed.enabled,
        contexts: &descriptors,
    };

    let json = if args.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{}", json);
    Ok(())
}
