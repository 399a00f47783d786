//! todoblog CLI - to-do list and blog server
//!
//! Entry point for the `todoblog` binary:
//! - `serve` resolves both databases, migrates, seeds and runs the HTTP server
//! - `migrate` applies pending migrations and exits
//! - `check-config` prints the resolved connection descriptors (secrets redacted)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use todoblog_core::{load_dotenv, AppConfig, EnvSnapshot};
use tracing::{debug, info, warn};

mod commands;
mod tracing_setup;

/// Environment variable naming the TOML config file
const CONFIG_ENV: &str = "TODOBLOG_CONFIG";

#[derive(Parser, Debug)]
#[command(
    name = "todoblog",
    author,
    version,
    about = "To-do list and blog over PostgreSQL or SQLite",
    long_about = "Server-rendered to-do list and blog. Database connections are resolved from \
                  DATABASE_URL, DATABASE_PUBLIC_URL, PG* variables or platform defaults, falling \
                  back to embedded SQLite outside production."
)]
struct Cli {
    /// Enable debug logging (ignored when RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    /// Path to a TOML config file (default: ./todoblog.toml if present)
    #[arg(long, global = true, env = "TODOBLOG_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Migrate both databases, seed, and run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Apply pending migrations to both databases and exit
    Migrate(commands::migrate::MigrateArgs),
    /// Resolve connection settings and print them without connecting
    CheckConfig(commands::check_config::CheckConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env goes first so RUST_LOG and database settings from it take effect
    let dotenv = load_dotenv();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    match dotenv {
        Ok(Some(path)) => info!("Loaded environment from {}", path.display()),
        Ok(None) => debug!("No .env file found, using process environment only"),
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }
    let env = EnvSnapshot::capture();

    let config_path = cli
        .config
        .or_else(|| env.get(CONFIG_ENV).map(PathBuf::from));
    let config = AppConfig::load(config_path.as_deref())
        .context("failed to load configuration")?
        .with_env(&env)
        .context("invalid configuration")?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config, &env).await?,
        Commands::Migrate(args) => commands::run_migrate(args, &config, &env).await?,
        Commands::CheckConfig(args) => commands::run_check_config(args, &config, &env)?,
    }
    Ok(())
}
