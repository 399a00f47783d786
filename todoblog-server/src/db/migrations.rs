//! Versioned schema migrations with a per-context history table
//!
//! Each logical context owns a [`MigrationSet`] and records applied versions
//! in its own history table, so two contexts can share one physical database
//! without interfering. Every migration runs in its own transaction together
//! with the insert of its history row.

use chrono::Utc;
use tracing::{debug, info};

use super::error::DbError;
use super::pool::{with_pool, Database};

/// One schema change, written once per SQL dialect
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub postgres: &'static str,
    pub sqlite: &'static str,
}

impl Migration {
    fn sql_for(&self, db: &Database) -> &'static str {
        match db {
            Database::Postgres(_) => self.postgres,
            Database::Sqlite(_) => self.sqlite,
        }
    }
}

/// Ordered migrations for one context
#[derive(Debug, Clone, Copy)]
pub struct MigrationSet {
    pub history_table: &'static str,
    pub migrations: &'static [Migration],
}

/// Outcome of a migration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Versions applied by this run, ascending
    pub applied: Vec<i64>,
    /// Versions that were already recorded
    pub already_applied: usize,
}

impl MigrationSet {
    /// Apply every pending migration in ascending version order.
    ///
    /// Safe to call repeatedly; a second run applies nothing.
    pub async fn run(&self, db: &Database, context: &str) -> Result<MigrationReport, DbError> {
        self.ensure_history_table(db).await?;
        let recorded = self.applied_versions(db).await?;

        let mut pending: Vec<&Migration> = self
            .migrations
            .iter()
            .filter(|m| !recorded.contains(&m.version))
            .collect();
        pending.sort_by_key(|m| m.version);

        let mut report = MigrationReport {
            applied: Vec::with_capacity(pending.len()),
            already_applied: recorded.len(),
        };

        for migration in pending {
            debug!(context, version = migration.version, "applying migration");
            self.apply(db, migration)
                .await
                .map_err(|source| DbError::Migration {
                    context: context.to_owned(),
                    version: migration.version,
                    description: migration.description,
                    source,
                })?;
            info!(
                context,
                version = migration.version,
                description = migration.description,
                "applied migration"
            );
            report.applied.push(migration.version);
        }

        if report.applied.is_empty() {
            debug!(context, versions = report.already_applied, "schema up to date");
        }
        Ok(report)
    }

    /// Versions recorded in the history table, ascending
    pub async fn applied_versions(&self, db: &Database) -> Result<Vec<i64>, DbError> {
        let sql = format!("SELECT version FROM {} ORDER BY version", self.history_table);
        let versions = with_pool!(db, pool => {
            sqlx::query_scalar::<_, i64>(&sql).fetch_all(pool).await?
        });
        Ok(versions)
    }

    async fn ensure_history_table(&self, db: &Database) -> Result<(), DbError> {
        let sql = match db {
            Database::Postgres(_) => format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    version BIGINT PRIMARY KEY,
                    description TEXT NOT NULL,
                    applied_at TIMESTAMPTZ NOT NULL
                )",
                self.history_table
            ),
            Database::Sqlite(_) => format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    version INTEGER PRIMARY KEY,
                    description TEXT NOT NULL,
                    applied_at TEXT NOT NULL
                )",
                self.history_table
            ),
        };

        with_pool!(db, pool => sqlx::raw_sql(&sql).execute(pool).await.map(|_| ()))?;
        Ok(())
    }

    async fn apply(&self, db: &Database, migration: &Migration) -> Result<(), sqlx::Error> {
        let ddl = migration.sql_for(db);
        let record = format!(
            "INSERT INTO {} (version, description, applied_at) VALUES ($1, $2, $3)",
            self.history_table
        );

        with_pool!(db, pool => {
            let mut tx = pool.begin().await?;
            sqlx::raw_sql(ddl).execute(&mut *tx).await?;
            sqlx::query(&record)
                .bind(migration.version)
                .bind(migration.description)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
            tx.commit().await
        })
    }
}
