//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod post;
pub mod todo;
pub mod validation;

pub use post::{AuthorName, BlogPost, NewPost, PostContent, PostSummary, PostTitle};
pub use todo::{NewTodo, TaskDescription, TaskTitle, TodoItem};
pub use validation::{FieldErrors, ValidationError};
