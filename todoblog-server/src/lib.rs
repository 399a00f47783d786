//! todoblog-server: to-do list and blog over PostgreSQL or SQLite
//!
//! Startup order is fixed: resolve both connection descriptors, open and
//! migrate both persistence contexts, seed, and only then bind the listener.
//! Any failure before binding aborts the process.

pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod state;

use todoblog_core::{resolve, AppConfig, ConnectionDescriptor, EnvSnapshot};
use tracing::info;

use crate::db::{
    seed_todos_if_empty, PersistenceContext, TodoRepo, BLOG_CONTEXT, BLOG_MIGRATIONS,
    TODOS_CONTEXT, TODO_MIGRATIONS,
};

pub use error::{Result, ServerError};
pub use http::{build_router, run_server, ServerConfig};
pub use state::AppState;

/// Descriptors for every logical context, in startup order
pub fn resolve_contexts(
    config: &AppConfig,
    env: &EnvSnapshot,
) -> Result<[ConnectionDescriptor; 2]> {
    Ok([
        resolve(env, &config.database, TODOS_CONTEXT)?,
        resolve(env, &config.database, BLOG_CONTEXT)?,
    ])
}

/// Open, migrate and verify both contexts, then seed if enabled.
pub async fn open_state(
    config: &AppConfig,
    [todos, blog]: &[ConnectionDescriptor; 2],
    secure_cookies: bool,
) -> Result<AppState> {
    let todos = PersistenceContext::open(todos, &TODO_MIGRATIONS).await?;
    let blog = PersistenceContext::open(blog, &BLOG_MIGRATIONS).await?;

    if config.seed.enabled {
        seed_todos_if_empty(&TodoRepo::new(todos.db())).await?;
    }

    Ok(AppState::new(todos, blog, secure_cookies))
}

/// Resolve, migrate and serve until shutdown.
pub async fn serve(config: &AppConfig, env: &EnvSnapshot) -> Result<()> {
    let production = env.is_production();
    let descriptors = resolve_contexts(config, env)?;
    let server = ServerConfig::from_app_config(config, production)?;

    for d in &descriptors {
        info!(context = %d.context, source = %d.source, networked = d.engine.is_networked(), "resolved database connection");
    }

    let state = open_state(config, &descriptors, production).await?;
    run_server(state, server).await
}
