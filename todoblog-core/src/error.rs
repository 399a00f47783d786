/// Structured error types for todoblog-core.
///
/// Every variant is safe to print: attempts carry field *names*, never the
/// values read from the environment.
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::descriptor::SourceKind;

/// Why a single connection source could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAttempt {
    pub source: SourceKind,
    pub reason: AttemptFailure,
}

/// Failure reason recorded for a source in the resolver chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Nothing for this source was present in the environment
    Absent,
    /// Some inputs were present but these required fields were not
    Missing(Vec<&'static str>),
    /// The input was present but could not be parsed
    Malformed(&'static str),
}

impl fmt::Display for SourceAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            AttemptFailure::Absent => write!(f, "{}: not set", self.source),
            AttemptFailure::Missing(fields) => {
                write!(f, "{}: missing {}", self.source, fields.join(", "))
            }
            AttemptFailure::Malformed(what) => write!(f, "{}: malformed {}", self.source, what),
        }
    }
}

/// Main error type for configuration and connection resolution
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Every networked source was tried and none produced a complete descriptor
    #[error("no valid database connection source ({})", join_attempts(.attempts))]
    NoValidSource { attempts: Vec<SourceAttempt> },

    /// Production deployments must not silently fall back to the embedded engine
    #[error("running in production but no database connection source is set ({})", join_attempts(.attempts))]
    ProductionRequiresNetworked { attempts: Vec<SourceAttempt> },

    /// A config or environment value is out of range or unusable
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// The config file exists but could not be read
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for `AppConfig`
    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// An explicitly requested config file does not exist
    #[error("config file not found: {path:?}")]
    NotFound { path: PathBuf },
}

fn join_attempts(attempts: &[SourceAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for todoblog-core operations
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Attempts recorded while resolving, if this error came from the resolver
    pub fn attempts(&self) -> &[SourceAttempt] {
        match self {
            Self::NoValidSource { attempts } | Self::ProductionRequiresNetworked { attempts } => {
                attempts
            }
            _ => &[],
        }
    }
}
