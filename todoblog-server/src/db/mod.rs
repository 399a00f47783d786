//! Database layer - persistence contexts, migrations and repositories
//!
//! # Design Principles
//!
//! - One pool per logical context, sized from the resolved descriptor
//! - Each context migrates against its own history table
//! - SQL written once with `$N` placeholders for PostgreSQL and SQLite
//! - Races on edit/delete detected from affected rows, no check-then-write

pub mod context;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repos;
pub mod retry;
pub mod schema;
pub mod seed;

pub use context::PersistenceContext;
pub use error::DbError;
pub use migrations::{Migration, MigrationReport, MigrationSet};
pub use pool::Database;
pub use repos::{PostRepo, TodoRepo};
pub use schema::{BLOG_CONTEXT, BLOG_MIGRATIONS, TODOS_CONTEXT, TODO_MIGRATIONS};
pub use seed::seed_todos_if_empty;
