//! To-do item model

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::validation::{bounded_text, FieldErrors, ValidationError};

pub const MAX_TASK_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Short task title, 1..=100 chars after trimming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTitle(String);

impl TaskTitle {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("task", s, MAX_TASK_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Task description, 1..=500 chars after trimming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescription(String);

impl TaskDescription {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("description", s, MAX_DESCRIPTION_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// To-do row as stored
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct TodoItem {
    pub id: i64,
    pub task: String,
    pub description: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated fields for insert or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub task: TaskTitle,
    pub description: TaskDescription,
    pub is_completed: bool,
}

impl NewTodo {
    /// Validate every field, reporting all failures at once.
    pub fn parse(task: &str, description: &str, is_completed: bool) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let task = errors.check(TaskTitle::new(task));
        let description = errors.check(TaskDescription::new(description));

        match (task, description) {
            (Some(task), Some(description)) => Ok(Self {
                task,
                description,
                is_completed,
            }),
            _ => Err(errors),
        }
    }
}
