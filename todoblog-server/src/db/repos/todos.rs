//! To-do repository
//!
//! - update/delete report `NotFound` when no row was affected, so a row
//!   removed concurrently is detected without a prior read
//! - timestamps are assigned here, not by column defaults, so both
//!   engines store the same representation

use chrono::Utc;
use todoblog_core::RetryPolicy;

use crate::db::error::DbError;
use crate::db::pool::{with_pool, Database};
use crate::db::retry::with_retry;
use crate::models::{NewTodo, TodoItem};

const TABLE: &str = "todo_items";

const RESOURCE: &str = "todo";

const COLUMNS: &str = "id, task, description, is_completed, created_at";

/// To-do repository
pub struct TodoRepo<'a> {
    db: &'a Database,
    retry: RetryPolicy,
}

impl<'a> TodoRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            retry: RetryPolicy::NONE,
        }
    }

    /// Retry the read-only queries on transient failures.
    pub fn retrying(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// All items, oldest first
    pub async fn list(&self) -> Result<Vec<TodoItem>, DbError> {
        let sql = format!("SELECT {COLUMNS} FROM todo_items ORDER BY created_at, id");
        let sql = sql.as_str();
        let items = with_pool!(self.db, pool => {
            with_retry(TABLE, &self.retry, move || {
                sqlx::query_as::<_, TodoItem>(sql).fetch_all(pool)
            })
            .await?
        });
        Ok(items)
    }

    pub async fn get(&self, id: i64) -> Result<TodoItem, DbError> {
        let sql = format!("SELECT {COLUMNS} FROM todo_items WHERE id = $1");
        let sql = sql.as_str();
        let item = with_pool!(self.db, pool => {
            with_retry(TABLE, &self.retry, move || {
                sqlx::query_as::<_, TodoItem>(sql).bind(id).fetch_optional(pool)
            })
            .await?
        });
        item.ok_or_else(|| DbError::not_found(RESOURCE, id))
    }

    pub async fn create(&self, todo: &NewTodo) -> Result<TodoItem, DbError> {
        let sql = format!(
            "INSERT INTO todo_items (task, description, is_completed, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let item = with_pool!(self.db, pool => {
            sqlx::query_as::<_, TodoItem>(&sql)
                .bind(todo.task.as_str())
                .bind(todo.description.as_str())
                .bind(todo.is_completed)
                .bind(Utc::now())
                .fetch_one(pool)
                .await?
        });
        Ok(item)
    }

    pub async fn update(&self, id: i64, todo: &NewTodo) -> Result<TodoItem, DbError> {
        let sql = format!(
            "UPDATE todo_items SET task = $1, description = $2, is_completed = $3
             WHERE id = $4
             RETURNING {COLUMNS}"
        );
        let item = with_pool!(self.db, pool => {
            sqlx::query_as::<_, TodoItem>(&sql)
                .bind(todo.task.as_str())
                .bind(todo.description.as_str())
                .bind(todo.is_completed)
                .bind(id)
                .fetch_optional(pool)
                .await?
        });
        item.ok_or_else(|| DbError::not_found(RESOURCE, id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let affected = with_pool!(self.db, pool => {
            sqlx::query("DELETE FROM todo_items WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?
                .rows_affected()
        });
        if affected == 0 {
            return Err(DbError::not_found(RESOURCE, id));
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, DbError> {
        let count = with_pool!(self.db, pool => {
            with_retry(TABLE, &self.retry, move || {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM todo_items").fetch_one(pool)
            })
            .await?
        });
        Ok(count)
    }

    pub async fn exists(&self, id: i64) -> Result<bool, DbError> {
        let found = with_pool!(self.db, pool => {
            with_retry(TABLE, &self.retry, move || {
                sqlx::query_scalar::<_, i64>("SELECT id FROM todo_items WHERE id = $1")
                    .bind(id)
                    .fetch_optional(pool)
            })
            .await?
        });
        Ok(found.is_some())
    }
}
