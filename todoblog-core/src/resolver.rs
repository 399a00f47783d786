//! Connection resolver
//!
//! Turns an [`EnvSnapshot`] into exactly one [`ConnectionDescriptor`] per
//! logical context. Sources are tried in priority order; the first complete
//! one wins and incomplete ones fall through:
//!
//! 1. `DATABASE_URL`
//! 2. `PGHOST` / `PGPORT` / `PGDATABASE` / `PGUSER` / `PGPASSWORD`
//! 3. platform private host (`RAILWAY_PRIVATE_DOMAIN` + `POSTGRES_*`)
//! 4. `DATABASE_PUBLIC_URL`
//!
//! Only when *no* networked input is present at all, and the process is not
//! a production deployment, does resolution fall back to an embedded SQLite
//! file. Resolution is a pure function of its inputs.

use std::borrow::Cow;
use std::path::PathBuf;

use tracing::debug;
use url::Url;

use crate::config::DatabaseSettings;
use crate::descriptor::{
    ConnectionDescriptor, Engine, NetworkTarget, RetryPolicy, Secret, SourceKind, TransportPolicy,
};
use crate::env::{EnvSnapshot, PLATFORM_MARKER};
use crate::error::{AttemptFailure, ConfigError, Result, SourceAttempt};

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DATABASE_PUBLIC_URL: &str = "DATABASE_PUBLIC_URL";
pub const PGHOST: &str = "PGHOST";
pub const PGPORT: &str = "PGPORT";
pub const PGDATABASE: &str = "PGDATABASE";
pub const PGUSER: &str = "PGUSER";
pub const PGPASSWORD: &str = "PGPASSWORD";
pub const PLATFORM_PRIVATE_HOST: &str = "RAILWAY_PRIVATE_DOMAIN";
pub const PLATFORM_DB_USER: &str = "POSTGRES_USER";
pub const PLATFORM_DB_PASSWORD: &str = "POSTGRES_PASSWORD";
pub const PLATFORM_DB_NAME: &str = "POSTGRES_DB";

/// Private host used when the platform does not publish one explicitly
pub const DEFAULT_PLATFORM_HOST: &str = "postgres.railway.internal";

pub const DEFAULT_PG_PORT: u16 = 5432;

/// Outcome of a single source in the chain
#[derive(Debug, Clone, PartialEq, Eq)]
enum Attempt {
    Resolved(Engine),
    Incomplete(AttemptFailure),
    Absent,
}

type SourceFn = fn(&EnvSnapshot) -> Attempt;

/// Sources in priority order, highest first
const CHAIN: [(SourceKind, SourceFn); 4] = [
    (SourceKind::ConnectionUrl, from_connection_url),
    (SourceKind::DiscreteFields, from_discrete_fields),
    (SourceKind::PlatformInternal, from_platform_internal),
    (SourceKind::PublicUrl, from_public_url),
];

/// Resolve the connection descriptor for one logical context.
///
/// # Errors
///
/// - [`ConfigError::NoValidSource`] when some networked input is present but
///   no source is complete
/// - [`ConfigError::ProductionRequiresNetworked`] when nothing is set in a
///   production deployment
/// - [`ConfigError::InvalidValue`] for an unusable context name
pub fn resolve(
    env: &EnvSnapshot,
    settings: &DatabaseSettings,
    context: &str,
) -> Result<ConnectionDescriptor> {
    validate_context_name(context)?;

    let mut attempts = Vec::with_capacity(CHAIN.len());
    for (source, resolve_source) in CHAIN {
        match resolve_source(env) {
            Attempt::Resolved(engine) => {
                debug!(context, %source, "database connection source selected");
                return Ok(build_descriptor(context, source, engine, settings));
            }
            Attempt::Incomplete(reason) => {
                let attempt = SourceAttempt { source, reason };
                debug!(context, %attempt, "connection source incomplete, falling through");
                attempts.push(attempt);
            }
            Attempt::Absent => attempts.push(SourceAttempt {
                source,
                reason: AttemptFailure::Absent,
            }),
        }
    }

    let any_networked_input = attempts
        .iter()
        .any(|a| a.reason != AttemptFailure::Absent);
    if any_networked_input {
        return Err(ConfigError::NoValidSource { attempts });
    }
    if env.is_production() {
        return Err(ConfigError::ProductionRequiresNetworked { attempts });
    }

    let engine = Engine::Embedded {
        path: settings.data_dir.join(format!("{context}.db")),
    };
    debug!(context, "no networked credentials present, using embedded engine");
    Ok(build_descriptor(context, SourceKind::Embedded, engine, settings))
}

fn build_descriptor(
    context: &str,
    source: SourceKind,
    engine: Engine,
    settings: &DatabaseSettings,
) -> ConnectionDescriptor {
    // A local file has no transient connectivity failures worth retrying.
    let (pool, retry) = if engine.is_networked() {
        (settings.networked_pool(), settings.retry_policy())
    } else {
        (settings.embedded_pool(), RetryPolicy::NONE)
    };

    ConnectionDescriptor {
        context: context.to_owned(),
        source,
        engine,
        pool,
        retry,
    }
}

fn validate_context_name(context: &str) -> Result<()> {
    let mut chars = context.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            "context",
            "must be lowercase alphanumeric with hyphens/underscores",
        ))
    }
}

fn from_connection_url(env: &EnvSnapshot) -> Attempt {
    match env.get(DATABASE_URL) {
        Some(raw) => parse_url(raw),
        None => Attempt::Absent,
    }
}

fn from_public_url(env: &EnvSnapshot) -> Attempt {
    match env.get(DATABASE_PUBLIC_URL) {
        Some(raw) => parse_url(raw),
        None => Attempt::Absent,
    }
}

fn from_discrete_fields(env: &EnvSnapshot) -> Attempt {
    if ![PGHOST, PGPORT, PGDATABASE, PGUSER, PGPASSWORD]
        .iter()
        .any(|key| env.is_set(key))
    {
        return Attempt::Absent;
    }

    let port = match env.get(PGPORT).map(str::parse::<u16>) {
        None => DEFAULT_PG_PORT,
        Some(Ok(port)) if port != 0 => port,
        Some(_) => return Attempt::Incomplete(AttemptFailure::Malformed(PGPORT)),
    };

    complete_target(
        [
            (PGHOST, env.get(PGHOST)),
            (PGDATABASE, env.get(PGDATABASE)),
            (PGUSER, env.get(PGUSER)),
            (PGPASSWORD, env.get(PGPASSWORD)),
        ],
        port,
        TransportPolicy::Require,
    )
}

fn from_platform_internal(env: &EnvSnapshot) -> Attempt {
    if !env.is_set(PLATFORM_MARKER) {
        return Attempt::Absent;
    }
    if ![PLATFORM_DB_USER, PLATFORM_DB_PASSWORD, PLATFORM_DB_NAME]
        .iter()
        .any(|key| env.is_set(key))
    {
        return Attempt::Absent;
    }

    let host = env.get(PLATFORM_PRIVATE_HOST).unwrap_or(DEFAULT_PLATFORM_HOST);
    let port = match env.get(PGPORT).map(str::parse::<u16>) {
        None => DEFAULT_PG_PORT,
        Some(Ok(port)) if port != 0 => port,
        Some(_) => return Attempt::Incomplete(AttemptFailure::Malformed(PGPORT)),
    };

    complete_target(
        [
            (PLATFORM_PRIVATE_HOST, Some(host)),
            (PLATFORM_DB_NAME, env.get(PLATFORM_DB_NAME)),
            (PLATFORM_DB_USER, env.get(PLATFORM_DB_USER)),
            (PLATFORM_DB_PASSWORD, env.get(PLATFORM_DB_PASSWORD)),
        ],
        port,
        TransportPolicy::Require,
    )
}

/// Build a networked engine from `[host, database, user, password]`,
/// reporting every missing field by name.
fn complete_target(
    fields: [(&'static str, Option<&str>); 4],
    port: u16,
    transport: TransportPolicy,
) -> Attempt {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| value.map_or(true, str::is_empty))
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Attempt::Incomplete(AttemptFailure::Missing(missing));
    }

    let [host, database, username, password] = fields.map(|(_, v)| v.unwrap_or_default());
    Attempt::Resolved(Engine::Networked(NetworkTarget {
        host: host.to_owned(),
        port,
        database: database.to_owned(),
        username: username.to_owned(),
        password: Secret::new(password),
        transport,
    }))
}

fn parse_url(raw: &str) -> Attempt {
    if let Some(rest) = raw.strip_prefix("sqlite:") {
        return parse_sqlite_path(rest);
    }

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return Attempt::Incomplete(AttemptFailure::Malformed("URL")),
    };
    if !matches!(url.scheme(), "postgres" | "postgresql") {
        return Attempt::Incomplete(AttemptFailure::Malformed("URL scheme"));
    }

    let password = match url.password() {
        Some(raw) => decode(raw).map(Some),
        None => Some(None),
    };
    let (username, password, database) = match (
        decode(url.username()),
        password,
        decode(url.path().trim_start_matches('/')),
    ) {
        (Some(user), Some(password), Some(database)) => (user, password, database),
        _ => return Attempt::Incomplete(AttemptFailure::Malformed("URL encoding")),
    };

    let transport = match url
        .query_pairs()
        .find(|(key, _)| key == "sslmode")
        .map(|(_, value)| value)
        .as_deref()
    {
        Some("verify-full") | Some("verify-ca") => TransportPolicy::VerifyFull,
        _ => TransportPolicy::Require,
    };

    complete_target(
        [
            ("host", url.host_str()),
            ("database", Some(database.as_ref())),
            ("user", Some(username.as_ref())),
            ("password", password.as_deref()),
        ],
        url.port().unwrap_or(DEFAULT_PG_PORT),
        transport,
    )
}

fn parse_sqlite_path(rest: &str) -> Attempt {
    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return Attempt::Incomplete(AttemptFailure::Malformed("sqlite path"));
    }
    Attempt::Resolved(Engine::Embedded {
        path: PathBuf::from(path),
    })
}

/// Percent-decode a URL component; `None` if it is not valid UTF-8.
fn decode(component: &str) -> Option<Cow<'_, str>> {
    urlencoding::decode(component).ok()
}
