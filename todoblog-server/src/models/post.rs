//! Blog post model

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::validation::{bounded_text, FieldErrors, ValidationError};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_SUMMARY_LEN: usize = 500;
pub const MAX_AUTHOR_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTitle(String);

impl PostTitle {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("title", s, MAX_TITLE_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Post body. Required, no upper bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent(String);

impl PostContent {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("content", s, usize::MAX).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Optional teaser. Blank input means no summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary(Option<String>);

impl PostSummary {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Ok(Self(None));
        }
        bounded_text("summary", s, MAX_SUMMARY_LEN).map(|v| Self(Some(v)))
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName(String);

impl AuthorName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("author", s, MAX_AUTHOR_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Blog post row as stored
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_published: bool,
}

/// Validated fields for insert or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: PostTitle,
    pub content: PostContent,
    pub summary: PostSummary,
    pub author: AuthorName,
    pub is_published: bool,
}

impl NewPost {
    pub fn parse(
        title: &str,
        content: &str,
        summary: &str,
        author: &str,
        is_published: bool,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = errors.check(PostTitle::new(title));
        let content = errors.check(PostContent::new(content));
        let summary = errors.check(PostSummary::new(summary));
        let author = errors.check(AuthorName::new(author));

        match (title, content, summary, author) {
            (Some(title), Some(content), Some(summary), Some(author)) => Ok(Self {
                title,
                content,
                summary,
                author,
                is_published,
            }),
            _ => Err(errors),
        }
    }
}
