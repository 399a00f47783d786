//! Database error type and transient-failure classification

use std::path::PathBuf;

use thiserror::Error;

/// Database error type
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("{context}: migration {version} ({description}) failed: {source}")]
    Migration {
        context: String,
        version: i64,
        description: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("{context}: connectivity check failed: {source}")]
    VerificationFailed {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("{context}: giving up after {attempts} attempts: {source}")]
    RetriesExhausted {
        context: String,
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("sample row '{task}' is invalid: {reason}")]
    InvalidSeed { task: String, reason: String },

    #[error("{context}: cannot prepare data directory {path:?}: {source}")]
    DataDir {
        context: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DbError {
    pub fn not_found(resource: &'static str, id: i64) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// Whether a driver error is worth retrying.
///
/// Network failures, pool timeouts and the server-side "not ready / too many
/// connections" SQLSTATEs are transient. Authentication, configuration and
/// query errors are not.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => db.code().is_some_and(|code| {
            code.starts_with("08") || matches!(code.as_ref(), "57P01" | "57P03" | "53300")
        }),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_and_pool_timeouts_are_transient() {
        let io = sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(is_transient(&io));
        assert!(is_transient(&sqlx::Error::PoolTimedOut));
    }

    #[test]
    fn configuration_and_missing_rows_are_permanent() {
        assert!(!is_transient(&sqlx::Error::Configuration("bad url".into())));
        assert!(!is_transient(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn not_found_display() {
        let err = DbError::not_found("todo", 7);
        assert_eq!(err.to_string(), "not found: todo '7'");
    }
}
