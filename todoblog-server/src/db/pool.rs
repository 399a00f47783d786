//! Database connection pool management
//!
//! One [`Database`] per logical context, backed by either a PostgreSQL or a
//! SQLite pool depending on the resolved descriptor. Pool bounds and the
//! retry policy come from the descriptor.

use std::str::FromStr;

use sqlx::pool::PoolOptions;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgSslMode};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};
use sqlx::Connection;
use todoblog_core::{ConnectionDescriptor, Engine, NetworkTarget, PoolLimits, TransportPolicy};
use tracing::{debug, info, warn};

use super::error::DbError;
use super::retry::with_retry;

/// Maintenance database used to check for and create the target database
const MAINTENANCE_DB: &str = "postgres";

/// Connection pool for one context
#[derive(Debug, Clone)]
pub enum Database {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

/// Expand `$body` once per engine with `$pool` bound to the concrete pool.
///
/// Queries are written once with `$N` placeholders, which both drivers accept.
macro_rules! with_pool {
    ($db:expr, $pool:ident => $body:expr) => {
        match $db {
            $crate::db::Database::Postgres($pool) => $body,
            $crate::db::Database::Sqlite($pool) => $body,
        }
    };
}
pub(crate) use with_pool;

impl Database {
    /// Open a pool for `descriptor`, creating the database first if needed.
    ///
    /// Transient failures are retried according to the descriptor's policy.
    pub async fn connect(descriptor: &ConnectionDescriptor) -> Result<Self, DbError> {
        let context = descriptor.context.as_str();

        match &descriptor.engine {
            Engine::Embedded { path } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|source| DbError::DataDir {
                            context: context.to_owned(),
                            path: parent.to_path_buf(),
                            source,
                        })?;
                }

                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .foreign_keys(true);

                let pool = with_retry(context, &descriptor.retry, || {
                    pool_options(&descriptor.pool).connect_with(options.clone())
                })
                .await?;

                info!(context, path = %path.display(), "opened embedded database");
                Ok(Self::Sqlite(pool))
            }
            Engine::Networked(target) => {
                ensure_database_exists(context, target).await?;

                let options = pg_options(target, &target.database);
                let pool = with_retry(context, &descriptor.retry, || {
                    pool_options(&descriptor.pool).connect_with(options.clone())
                })
                .await?;

                info!(
                    context,
                    host = %target.host,
                    port = target.port,
                    database = %target.database,
                    "connected to PostgreSQL"
                );
                Ok(Self::Postgres(pool))
            }
        }
    }

    /// Open an in-memory SQLite database with a single connection (tests).
    pub async fn in_memory() -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // The database lives only as long as its one connection.
        let pool = PoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self::Sqlite(pool))
    }

    /// Engine name for logs and health output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Sqlite(_) => "sqlite",
        }
    }

    /// Round-trip a trivial query
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        with_pool!(self, pool => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()))
    }

    pub async fn close(&self) {
        with_pool!(self, pool => pool.close().await)
    }
}

fn pool_options<DB: sqlx::Database>(limits: &PoolLimits) -> PoolOptions<DB> {
    PoolOptions::new()
        .min_connections(limits.min_connections)
        .max_connections(limits.max_connections)
        .idle_timeout(limits.idle_timeout())
        .acquire_timeout(limits.acquire_timeout())
}

fn pg_options(target: &NetworkTarget, database: &str) -> PgConnectOptions {
    let ssl_mode = match target.transport {
        TransportPolicy::Require => PgSslMode::Require,
        TransportPolicy::VerifyFull => PgSslMode::VerifyFull,
    };

    PgConnectOptions::new()
        .host(&target.host)
        .port(target.port)
        .username(&target.username)
        .password(target.password.expose())
        .database(database)
        .ssl_mode(ssl_mode)
}

/// Create the target database through the maintenance database if missing.
///
/// Managed servers often deny access to the maintenance database or the
/// `CREATE DATABASE` privilege; those failures are logged and the real
/// connection attempt decides.
async fn ensure_database_exists(context: &str, target: &NetworkTarget) -> Result<(), DbError> {
    let mut conn = match PgConnection::connect_with(&pg_options(target, MAINTENANCE_DB)).await {
        Ok(conn) => conn,
        Err(e) => {
            warn!(context, error = %e, "cannot reach maintenance database, skipping existence check");
            return Ok(());
        }
    };

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&target.database)
            .fetch_one(&mut conn)
            .await
            .or_else(|e| {
                if is_permission_denied(&e) {
                    warn!(context, "no permission to list databases, assuming target exists");
                    Ok(true)
                } else {
                    Err(e)
                }
            })?;

    if exists {
        debug!(context, database = %target.database, "database exists");
    } else {
        let sql = format!("CREATE DATABASE {}", quote_ident(&target.database));
        match sqlx::raw_sql(&sql).execute(&mut conn).await {
            Ok(_) => info!(context, database = %target.database, "created database"),
            Err(e) if is_permission_denied(&e) => {
                warn!(context, database = %target.database, "no permission to create database")
            }
            // Another instance created it first
            Err(e) if sqlstate(&e).as_deref() == Some("42P04") => {}
            Err(e) => return Err(DbError::Sqlx(e)),
        }
    }

    conn.close().await.ok();
    Ok(())
}

fn sqlstate(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned())
}

fn is_permission_denied(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some("42501")
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
