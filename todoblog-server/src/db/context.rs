//! Persistence context: one pool, one schema history, one logical domain

use todoblog_core::{ConnectionDescriptor, RetryPolicy};
use tracing::info;

use super::error::DbError;
use super::migrations::{MigrationReport, MigrationSet};
use super::pool::Database;

/// A migrated, verified database handle for one logical context
#[derive(Debug, Clone)]
pub struct PersistenceContext {
    name: String,
    db: Database,
    /// Applied to idempotent reads made through this context's repos
    retry: RetryPolicy,
}

impl PersistenceContext {
    /// Connect, migrate and verify.
    ///
    /// Any failure here is fatal at startup; nothing is served from a
    /// context that did not open.
    pub async fn open(
        descriptor: &ConnectionDescriptor,
        migrations: &MigrationSet,
    ) -> Result<Self, DbError> {
        Self::open_with_report(descriptor, migrations)
            .await
            .map(|(context, _)| context)
    }

    /// Like [`open`](Self::open), also returning what the migration run did.
    pub async fn open_with_report(
        descriptor: &ConnectionDescriptor,
        migrations: &MigrationSet,
    ) -> Result<(Self, MigrationReport), DbError> {
        let db = Database::connect(descriptor).await?;
        let (context, report) = Self::from_database(&descriptor.context, db, migrations).await?;
        Ok((context.with_retry_policy(descriptor.retry), report))
    }

    /// Migrate and verify an already-open database.
    pub async fn from_database(
        name: &str,
        db: Database,
        migrations: &MigrationSet,
    ) -> Result<(Self, MigrationReport), DbError> {
        let report = migrations.run(&db, name).await?;
        let context = Self {
            name: name.to_owned(),
            db,
            retry: RetryPolicy::NONE,
        };
        context.verify().await?;

        info!(
            context = %context.name,
            engine = context.db.kind(),
            applied = report.applied.len(),
            "persistence context ready"
        );
        Ok((context, report))
    }

    /// Round-trip a trivial query
    pub async fn verify(&self) -> Result<(), DbError> {
        self.db
            .ping()
            .await
            .map_err(|source| DbError::VerificationFailed {
                context: self.name.clone(),
                source,
            })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}
