//! API error types with IntoResponse
//!
//! Errors render as a small HTML page with the matching status code.
//! Database and internal failures are logged with a request id and the
//! page shows only that id.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use uuid::Uuid;

use super::render;
use crate::db::DbError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Path id and hidden form id disagree (400)
    IdMismatch { path: i64, form: Option<i64> },

    /// Malformed request body (400)
    BadRequest { reason: String },

    /// Missing or mismatched anti-forgery token (403)
    CsrfRejected,

    /// Database error (500, logged)
    Database(DbError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::IdMismatch { .. } | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::CsrfRejected => StatusCode::FORBIDDEN,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::NotFound { resource, id } => format!("{} '{}' not found", resource, id),
            Self::IdMismatch { path, form } => {
                tracing::warn!(path_id = path, form_id = ?form, "id mismatch on form submit");
                "the submitted form does not match the requested item".to_owned()
            }
            Self::BadRequest { reason } => reason.clone(),
            Self::CsrfRejected => {
                tracing::warn!("rejected form post with missing or invalid CSRF token");
                "the form has expired, reload the page and try again".to_owned()
            }
            Self::Database(e) => {
                let request_id = Uuid::new_v4();
                // Log the actual error, return generic message
                tracing::error!(%request_id, error = %e, "database error");
                format!("an internal error occurred (request {})", request_id)
            }
        };

        (status, Html(render::error_page(status, &message))).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            _ => Self::Database(e),
        }
    }
}
