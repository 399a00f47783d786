//! Route handlers organized by resource

pub mod health;
pub mod home;
pub mod posts;
pub mod todos;

use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, Html, IntoResponse, Response};

use super::csrf::CsrfToken;
use crate::state::AppState;

/// HTML page containing a form, with the CSRF cookie (re)issued.
pub(crate) fn form_page(
    state: &AppState,
    status: StatusCode,
    csrf: &CsrfToken,
    html: String,
) -> Response {
    (
        status,
        AppendHeaders([(SET_COOKIE, csrf.set_cookie(state.secure_cookies()))]),
        Html(html),
    )
        .into_response()
}
