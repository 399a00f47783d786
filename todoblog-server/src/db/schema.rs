//! Schema for the `todos` and `blog` contexts

use super::migrations::{Migration, MigrationSet};

pub const TODOS_CONTEXT: &str = "todos";
pub const BLOG_CONTEXT: &str = "blog";

pub const TODO_MIGRATIONS: MigrationSet = MigrationSet {
    history_table: "todo_schema_history",
    migrations: &[
        Migration {
            version: 1,
            description: "create todo_items",
            postgres: r#"
                CREATE TABLE IF NOT EXISTS todo_items (
                    id BIGSERIAL PRIMARY KEY,
                    task VARCHAR(100) NOT NULL,
                    description VARCHAR(500) NOT NULL,
                    is_completed BOOLEAN NOT NULL DEFAULT FALSE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
            "#,
            sqlite: r#"
                CREATE TABLE IF NOT EXISTS todo_items (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    task TEXT NOT NULL CHECK (length(task) <= 100),
                    description TEXT NOT NULL CHECK (length(description) <= 500),
                    is_completed BOOLEAN NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL
                )
            "#,
        },
        Migration {
            version: 2,
            description: "index todo_items by created_at",
            postgres: "CREATE INDEX IF NOT EXISTS idx_todo_items_created_at ON todo_items (created_at)",
            sqlite: "CREATE INDEX IF NOT EXISTS idx_todo_items_created_at ON todo_items (created_at)",
        },
    ],
};

pub const BLOG_MIGRATIONS: MigrationSet = MigrationSet {
    history_table: "blog_schema_history",
    migrations: &[
        Migration {
            version: 1,
            description: "create blog_posts",
            postgres: r#"
                CREATE TABLE IF NOT EXISTS blog_posts (
                    id BIGSERIAL PRIMARY KEY,
                    title VARCHAR(200) NOT NULL,
                    content TEXT NOT NULL,
                    summary VARCHAR(500),
                    author VARCHAR(100) NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ,
                    is_published BOOLEAN NOT NULL DEFAULT FALSE
                )
            "#,
            sqlite: r#"
                CREATE TABLE IF NOT EXISTS blog_posts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL CHECK (length(title) <= 200),
                    content TEXT NOT NULL,
                    summary TEXT CHECK (summary IS NULL OR length(summary) <= 500),
                    author TEXT NOT NULL CHECK (length(author) <= 100),
                    created_at TEXT NOT NULL,
                    updated_at TEXT,
                    is_published BOOLEAN NOT NULL DEFAULT 0
                )
            "#,
        },
        Migration {
            version: 2,
            description: "index published posts",
            postgres: "CREATE INDEX IF NOT EXISTS idx_blog_posts_published ON blog_posts (is_published, created_at DESC)",
            sqlite: "CREATE INDEX IF NOT EXISTS idx_blog_posts_published ON blog_posts (is_published, created_at DESC)",
        },
    ],
};
