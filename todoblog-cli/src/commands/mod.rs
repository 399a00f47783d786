//! Command implementations for the todoblog CLI

pub mod check_config;
pub mod migrate;
pub mod serve;

pub use check_config::run_check_config;
pub use migrate::run_migrate;
pub use serve::run_serve;
