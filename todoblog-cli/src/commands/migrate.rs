//! Apply migrations without serving

use anyhow::{Context, Result};
use clap::Parser;
use todoblog_core::{AppConfig, EnvSnapshot};
use todoblog_server::db::{
    seed_todos_if_empty, PersistenceContext, TodoRepo, BLOG_MIGRATIONS, TODOS_CONTEXT,
    TODO_MIGRATIONS,
};
use todoblog_server::resolve_contexts;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Also insert sample to-dos into an empty table
    #[arg(long)]
    pub seed: bool,
}

pub async fn run_migrate(args: MigrateArgs, config: &AppConfig, env: &EnvSnapshot) -> Result<()> {
    let descriptors =
        resolve_contexts(config, env).context("failed to resolve database connections")?;

    for (descriptor, migrations) in descriptors.iter().zip([TODO_MIGRATIONS, BLOG_MIGRATIONS]) {
        let (context, report) = PersistenceContext::open_with_report(descriptor, &migrations)
            .await
            .with_context(|| format!("failed to migrate context '{}'", descriptor.context))?;

        if report.applied.is_empty() {
            println!(
                "{}: up to date ({} migrations)",
                context.name(),
                report.already_applied
            );
        } else {
            println!(
                "{}: applied {:?} ({} already applied)",
                context.name(),
                report.applied,
                report.already_applied
            );
        }

        if args.seed && context.name() == TODOS_CONTEXT {
            let inserted = seed_todos_if_empty(&TodoRepo::new(context.db()))
                .await
                .context("failed to seed sample to-dos")?;
            println!("{}: seeded {} rows", context.name(), inserted);
        }

        context.close().await;
    }

    Ok(())
}
