//! Blog post repository

use chrono::Utc;
use todoblog_core::RetryPolicy;

use crate::db::error::DbError;
use crate::db::pool::{with_pool, Database};
use crate::db::retry::with_retry;
use crate::models::{BlogPost, NewPost};

const TABLE: &str = "blog_posts";

const RESOURCE: &str = "post";

const COLUMNS: &str =
    "id, title, content, summary, author, created_at, updated_at, is_published";

/// Blog post repository
pub struct PostRepo<'a> {
    db: &'a Database,
    retry: RetryPolicy,
}

impl<'a> PostRepo<'a> {
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

    /// All posts, newest first
    pub async fn list(&self) -> Result<Vec<BlogPost>, DbError> {
        let sql = format!("SELECT {COLUMNS} FROM blog_posts ORDER BY created_at DESC, id DESC");
        let sql = sql.as_str();
        let posts = with_pool!(self.db, pool => {
            with_retry(TABLE, &self.retry, move || {
                sqlx::query_as::<_, BlogPost>(sql).fetch_all(pool)
            })
            .await?
        });
        Ok(posts)
    }

    pub async fn get(&self, id: i64) -> Result<BlogPost, DbError> {
        let sql = format!("SELECT {COLUMNS} FROM blog_posts WHERE id = $1");
        let sql = sql.as_str();
        let post = with_pool!(self.db, pool => {
            with_retry(TABLE, &self.retry, move || {
                sqlx::query_as::<_, BlogPost>(sql).bind(id).fetch_optional(pool)
            })
            .await?
        });
        post.ok_or_else(|| DbError::not_found(RESOURCE, id))
    }

    pub async fn create(&self, post: &NewPost) -> Result<BlogPost, DbError> {
        let sql = format!(
            "INSERT INTO blog_posts (title, content, summary, author, created_at, is_published)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let created = with_pool!(self.db, pool => {
            sqlx::query_as::<_, BlogPost>(&sql)
                .bind(post.title.as_str())
                .bind(post.content.as_str())
                .bind(post.summary.as_deref())
                .bind(post.author.as_str())
                .bind(Utc::now())
                .bind(post.is_published)
                .fetch_one(pool)
                .await?
        });
        Ok(created)
    }

    /// Overwrite a post and stamp `updated_at`
    pub async fn update(&self, id: i64, post: &NewPost) -> Result<BlogPost, DbError> {
        let sql = format!(
            "UPDATE blog_posts
             SET title = $1, content = $2, summary = $3, author = $4,
                 is_published = $5, updated_at = $6
             WHERE id = $7
             RETURNING {COLUMNS}"
        );
        let updated = with_pool!(self.db, pool => {
            sqlx::query_as::<_, BlogPost>(&sql)
                .bind(post.title.as_str())
                .bind(post.content.as_str())
                .bind(post.summary.as_deref())
                .bind(post.author.as_str())
                .bind(post.is_published)
                .bind(Utc::now())
                .bind(id)
                .fetch_optional(pool)
                .await?
        });
        updated.ok_or_else(|| DbError::not_found(RESOURCE, id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let affected = with_pool!(self.db, pool => {
            sqlx::query("DELETE FROM blog_posts WHERE id = $1")
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
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blog_posts").fetch_one(pool)
            })
            .await?
        });
        Ok(count)
    }

    pub async fn exists(&self, id: i64) -> Result<bool, DbError> {
        let found = with_pool!(self.db, pool => {
            with_retry(TABLE, &self.retry, move || {
                sqlx::query_scalar::<_, i64>("SELECT id FROM blog_posts WHERE id = $1")
                    .bind(id)
                    .fetch_optional(pool)
            })
            .await?
        });
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{BLOG_CONTEXT, BLOG_MIGRATIONS};

    async fn repo_db() -> Database {
        let db = Database::in_memory().await.unwrap();
        BLOG_MIGRATIONS.run(&db, BLOG_CONTEXT).await.unwrap();
        db
    }

    fn post(title: &str, summary: &str) -> NewPost {
        NewPost::parse(title, "Body text", summary, "Ada", false).unwrap()
    }

    #[tokio::test]
    async fn create_stores_optional_summary() {
        let db = repo_db().await;
        let repo = PostRepo::new(&db);

        let with = repo.create(&post("With", "short")).await.unwrap();
        let without = repo.create(&post("Without", "")).await.unwrap();

        assert_eq!(with.summary.as_deref(), Some("short"));
        assert_eq!(without.summary, None);
        assert_eq!(with.updated_at, None);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_sets_updated_at() {
        let db = repo_db().await;
        let repo = PostRepo::new(&db);
        let created = repo.create(&post("Draft", "")).await.unwrap();

        let published = NewPost::parse("Final", "Body", "", "Ada", true).unwrap();
        let updated = repo.update(created.id, &published).await.unwrap();

        assert_eq!(updated.title, "Final");
        assert!(updated.is_published);
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn delete_then_lookup() {
        let db = repo_db().await;
        let repo = PostRepo::new(&db);
        let created = repo.create(&post("Temp", "")).await.unwrap();
        assert!(repo.exists(created.id).await.unwrap());

        repo.delete(created.id).await.unwrap();
        assert!(!repo.exists(created.id).await.unwrap());
        assert!(matches!(repo.get(created.id).await, Err(DbError::NotFound { .. })));
        assert!(matches!(
            repo.delete(created.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
