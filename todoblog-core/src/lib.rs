//! Configuration and database connection resolution for todoblog.
//!
//! Everything here is synchronous and side-effect free apart from reading
//! the config file: the binary captures an [`EnvSnapshot`] once,
//! loads an [`AppConfig`], and resolves one [`ConnectionDescriptor`] per
//! logical context before opening any pool.

pub mod config;
pub mod descriptor;
pub mod env;
pub mod error;
pub mod resolver;

pub use config::{load_dotenv, AppConfig, DatabaseSettings, SeedSettings, ServerSettings};
pub use descriptor::{
    ConnectionDescriptor, Engine, NetworkTarget, PoolLimits, RetryPolicy, Secret, SourceKind,
    TransportPolicy,
};
pub use env::EnvSnapshot;
pub use error::{AttemptFailure, ConfigError, Result, SourceAttempt};
pub use resolver::resolve;
