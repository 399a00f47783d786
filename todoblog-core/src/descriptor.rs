//! Connection descriptor: the resolved parameters needed to open a database
//!
//! Built once per process start by [`crate::resolver::resolve`]. The engine
//! enum makes "exactly one engine kind" a type-level fact.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// Maximum pool size used for embedded SQLite files.
/// SQLite serializes writers, so a large pool only adds lock contention.
pub const EMBEDDED_MAX_CONNECTIONS: u32 = 5;

/// Credential string that never prints its value
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the raw value. Only call this when handing it to the driver.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

/// Which input produced a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    ConnectionUrl,
    DiscreteFields,
    PlatformInternal,
    PublicUrl,
    Embedded,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ConnectionUrl => "DATABASE_URL",
            Self::DiscreteFields => "PG* fields",
            Self::PlatformInternal => "platform private host",
            Self::PublicUrl => "DATABASE_PUBLIC_URL",
            Self::Embedded => "embedded file",
        };
        f.write_str(label)
    }
}

/// Encryption requirement for networked connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportPolicy {
    /// TLS is mandatory; the server certificate is not verified
    Require,
    /// TLS is mandatory and the certificate chain and host name are verified
    VerifyFull,
}

/// Client/server database reached over the network
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkTarget {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: Secret,
    pub transport: TransportPolicy,
}

/// Selected database engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Engine {
    /// File-backed SQLite database
    Embedded { path: PathBuf },
    /// PostgreSQL server
    Networked(NetworkTarget),
}

impl Engine {
    pub fn is_networked(&self) -> bool {
        matches!(self, Self::Networked(_))
    }
}

/// Connection pool bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolLimits {
    pub min_connections: u32,
    pub max_connections: u32,
    pub idle_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
}

impl PoolLimits {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Bounded retry with exponential backoff for transient connection failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Policy that never retries
    pub const NONE: Self = Self {
        max_retries: 0,
        base_delay_ms: 0,
        max_delay_ms: 0,
    };

    /// Delay before retry number `attempt` (0-based): `base * 2^attempt`, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let ms = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

/// Fully resolved connection parameters for one logical context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionDescriptor {
    /// Logical context name (`todos`, `blog`)
    pub context: String,
    pub source: SourceKind,
    pub engine: Engine,
    pub pool: PoolLimits,
    pub retry: RetryPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_never_prints() {
        let secret = Secret::new("hunter2");
        assert_eq!(format!("{}", secret), "***");
        assert_eq!(format!("{:?}", secret), "Secret(***)");
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"***\"");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(5), Duration::from_secs(30));
        assert_eq!(policy.delay_for(200), Duration::from_secs(30));
    }

    #[test]
    fn engine_serializes_with_kind_tag() {
        let engine = Engine::Embedded {
            path: PathBuf::from("data/todos.db"),
        };
        let json = serde_json::to_value(&engine).unwrap();
        assert_eq!(json["kind"], "embedded");
        assert_eq!(json["path"], "data/todos.db");
    }
}
