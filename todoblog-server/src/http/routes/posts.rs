//! Blog post endpoints, mounted under `/blog`

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;

use super::form_page;
use crate::http::csrf::CsrfToken;
use crate::http::error::ApiError;
use crate::http::extractors::{RowId, VerifiedForm};
use crate::http::forms::{ConfirmForm, PostForm};
use crate::http::render;
use crate::models::FieldErrors;
use crate::state::AppState;

const LIST: &str = "/blog/posts";

/// GET /blog/posts
async fn list(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let posts = state.post_repo().list().await?;
    Ok(Html(render::post_list(&posts)))
}

/// GET /blog/posts/add
async fn add_page(State(state): State<AppState>, csrf: CsrfToken) -> Response {
    let html = render::post_form(
        "Write a post",
        "/blog/posts/add",
        &PostForm::default(),
        &FieldErrors::new(),
        &csrf,
    );
    form_page(&state, StatusCode::OK, &csrf, html)
}

/// POST /blog/posts/add
async fn add(
    State(state): State<AppState>,
    csrf: CsrfToken,
    VerifiedForm(form): VerifiedForm<PostForm>,
) -> Result<Response, ApiError> {
    let post = match form.validate() {
        Ok(post) => post,
        Err(errors) => {
            let html = render::post_form("Write a post", "/blog/posts/add", &form, &errors, &csrf);
            return Ok(form_page(&state, StatusCode::UNPROCESSABLE_ENTITY, &csrf, html));
        }
    };

    let created = state.post_repo().create(&post).await?;
    tracing::info!(id = created.id, published = created.is_published, "created post");
    Ok(Redirect::to(LIST).into_response())
}

/// GET /blog/posts/edit/{id}
async fn edit_page(
    State(state): State<AppState>,
    RowId(id): RowId,
    csrf: CsrfToken,
) -> Result<Response, ApiError> {
    let post = state.post_repo().get(id).await?;
    let html = render::post_form(
        "Edit post",
        &format!("/blog/posts/edit/{}", id),
        &PostForm::from_post(&post),
        &FieldErrors::new(),
        &csrf,
    );
    Ok(form_page(&state, StatusCode::OK, &csrf, html))
}

/// POST /blog/posts/edit/{id}
async fn edit(
    State(state): State<AppState>,
    RowId(id): RowId,
    csrf: CsrfToken,
    VerifiedForm(form): VerifiedForm<PostForm>,
) -> Result<Response, ApiError> {
    if form.row_id() != Some(id) {
        return Err(ApiError::IdMismatch {
            path: id,
            form: form.row_id(),
        });
    }

    let post = match form.validate() {
        Ok(post) => post,
        Err(errors) => {
            let action = format!("/blog/posts/edit/{}", id);
            let html = render::post_form("Edit post", &action, &form, &errors, &csrf);
            return Ok(form_page(&state, StatusCode::UNPROCESSABLE_ENTITY, &csrf, html));
        }
    };

    state.post_repo().update(id, &post).await?;
    tracing::info!(id, "updated post");
    Ok(Redirect::to(LIST).into_response())
}

/// GET /blog/posts/delete/{id}
async fn delete_page(
    State(state): State<AppState>,
    RowId(id): RowId,
    csrf: CsrfToken,
) -> Result<Response, ApiError> {
    let post = state.post_repo().get(id).await?;
    Ok(form_page(
        &state,
        StatusCode::OK,
        &csrf,
        render::post_delete(&post, &csrf),
    ))
}

/// POST /blog/posts/delete/{id}
async fn delete(
    State(state): State<AppState>,
    RowId(id): RowId,
    VerifiedForm(form): VerifiedForm<ConfirmForm>,
) -> Result<Redirect, ApiError> {
    if let Some(form_id) = form.row_id().filter(|form_id| *form_id != id) {
        return Err(ApiError::IdMismatch {
            path: id,
            form: Some(form_id),
        });
    }

    state.post_repo().delete(id).await?;
    tracing::info!(id, "deleted post");
    Ok(Redirect::to(LIST))
}

/// Blog routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blog/posts", get(list))
        .route("/blog/posts/add", get(add_page).post(add))
        .route("/blog/posts/edit/{id}", get(edit_page).post(edit))
        .route("/blog/posts/delete/{id}", get(delete_page).post(delete))
}
