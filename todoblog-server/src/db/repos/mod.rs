//! Repository implementations for database access
//!
//! Each repository borrows a [`Database`](crate::db::Database) and writes its
//! SQL once for both engines.

pub mod posts;
pub mod todos;

pub use posts::PostRepo;
pub use todos::TodoRepo;
