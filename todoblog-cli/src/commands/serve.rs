//! HTTP server command

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use todoblog_core::{AppConfig, EnvSnapshot};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides config, TODOBLOG_BIND and PORT)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Do not insert sample to-dos into an empty table
    #[arg(long)]
    pub no_seed: bool,
}

/// Run the HTTP server until shutdown.
///
/// Connection resolution and migrations complete before the listener binds,
/// so a bad environment fails here without ever accepting a request.
pub async fn run_serve(args: ServeArgs, mut config: AppConfig, env: &EnvSnapshot) -> Result<()> {
    if let Some(bind) = args.bind {
        config.server.host = bind.ip().to_string();
        config.server.port = bind.port();
    }
    if args.cors_permissive {
        config.server.cors_permissive = true;
    }
    if args.no_seed {
        config.seed.enabled = false;
    }

    let bind = config.bind_addr().context("invalid bind address")?;
    tracing::info!(%bind, seed = config.seed.enabled, "starting todoblog");

    todoblog_server::serve(&config, env)
        .await
        .context("server failed")
}
