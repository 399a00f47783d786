//! URL-encoded form bodies
//!
//! Every field defaults so a partial submission still deserializes and can
//! be re-rendered with field-level messages. Checkboxes are present only
//! when ticked.

use serde::Deserialize;

use crate::models::{BlogPost, FieldErrors, NewPost, NewTodo, TodoItem};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TodoForm {
    pub id: Option<String>,
    pub task: String,
    pub description: String,
    pub is_completed: Option<String>,
}

impl TodoForm {
    pub fn from_item(item: &TodoItem) -> Self {
        Self {
            id: Some(item.id.to_string()),
            task: item.task.clone(),
            description: item.description.clone(),
            is_completed: item.is_completed.then(|| "true".to_owned()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed.is_some()
    }

    pub fn validate(&self) -> Result<NewTodo, FieldErrors> {
        NewTodo::parse(&self.task, &self.description, self.is_completed())
    }

    /// Hidden `id` field, if it parses
    pub fn row_id(&self) -> Option<i64> {
        parse_id(self.id.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub author: String,
    pub is_published: Option<String>,
}

impl PostForm {
    pub fn from_post(post: &BlogPost) -> Self {
        Self {
            id: Some(post.id.to_string()),
            title: post.title.clone(),
            content: post.content.clone(),
            summary: post.summary.clone().unwrap_or_default(),
            author: post.author.clone(),
            is_published: post.is_published.then(|| "true".to_owned()),
        }
    }

    pub fn is_published(&self) -> bool {
        self.is_published.is_some()
    }

    pub fn validate(&self) -> Result<NewPost, FieldErrors> {
        NewPost::parse(
            &self.title,
            &self.content,
            &self.summary,
            &self.author,
            self.is_published(),
        )
    }

    pub fn row_id(&self) -> Option<i64> {
        parse_id(self.id.as_deref())
    }
}

/// Body of a delete confirmation; the token is checked by the extractor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfirmForm {
    pub id: Option<String>,
}

impl ConfirmForm {
    pub fn row_id(&self) -> Option<i64> {
        parse_id(self.id.as_deref())
    }
}

fn parse_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}
