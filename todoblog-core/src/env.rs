//! Immutable snapshot of the process environment
//!
//! Captured once at startup and passed explicitly to everything that needs
//! configuration, so nothing reads `std::env` at arbitrary points.

use std::collections::BTreeMap;
use std::fmt;

/// Marker variable set by the hosting platform on every deployment
pub const PLATFORM_MARKER: &str = "RAILWAY_ENVIRONMENT";

/// Application environment selector (`production`, `development`, ...)
pub const APP_ENV: &str = "APP_ENV";

/// Frozen view of environment variables
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Build a snapshot from explicit pairs (tests, embedding).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a variable, treating empty or whitespace-only values as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Whether a variable is set to a non-empty value.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Whether this process runs as a production deployment.
    ///
    /// True when `APP_ENV=production` or the platform marker is present.
    pub fn is_production(&self) -> bool {
        self.get(APP_ENV)
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false)
            || self.is_set(PLATFORM_MARKER)
    }
}

// Values may hold credentials; only names are printed.
impl fmt::Debug for EnvSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvSnapshot")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .finish()
    }
}
