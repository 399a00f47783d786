//! Application state shared across handlers

use std::sync::Arc;

use crate::db::{PersistenceContext, PostRepo, TodoRepo};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    todos: PersistenceContext,
    blog: PersistenceContext,
    /// Mark cookies `Secure` (production deployments behind TLS)
    secure_cookies: bool,
}

impl AppState {
    pub fn new(todos: PersistenceContext, blog: PersistenceContext, secure_cookies: bool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                todos,
                blog,
                secure_cookies,
            }),
        }
    }

    pub fn todos(&self) -> &PersistenceContext {
        &self.inner.todos
    }

    pub fn blog(&self) -> &PersistenceContext {
        &self.inner.blog
    }

    /// To-do repository with the context's read retry policy
    pub fn todo_repo(&self) -> TodoRepo<'_> {
        TodoRepo::new(self.todos().db()).retrying(self.todos().retry())
    }

    /// Blog repository with the context's read retry policy
    pub fn post_repo(&self) -> PostRepo<'_> {
        PostRepo::new(self.blog().db()).retrying(self.blog().retry())
    }

    pub fn secure_cookies(&self) -> bool {
        self.inner.secure_cookies
    }

    /// Close both pools
    pub async fn close(&self) {
        self.inner.todos.close().await;
        self.inner.blog.close().await;
    }
}
