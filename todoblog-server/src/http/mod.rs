//! HTTP server layer
//!
//! Axum server with:
//! - Server-rendered HTML for to-dos and blog posts
//! - Double-submit-cookie CSRF on every form POST
//! - Request tracing, timeouts and graceful shutdown

pub mod csrf;
pub mod error;
pub mod extractors;
pub mod forms;
pub mod render;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, ServerConfig};
