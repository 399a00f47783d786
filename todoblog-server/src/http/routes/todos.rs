//! To-do endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;

use super::form_page;
use crate::http::csrf::CsrfToken;
use crate::http::error::ApiError;
use crate::http::extractors::{RowId, VerifiedForm};
use crate::http::forms::{ConfirmForm, TodoForm};
use crate::http::render;
use crate::models::FieldErrors;
use crate::state::AppState;

const LIST: &str = "/todos";

/// GET /todos
async fn list(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let items = state.todo_repo().list().await?;
    Ok(Html(render::todo_list(&items)))
}

/// GET /todos/add
async fn add_page(State(state): State<AppState>, csrf: CsrfToken) -> Response {
    let html = render::todo_form(
        "Add to-do",
        "/todos/add",
        &TodoForm::default(),
        &FieldErrors::new(),
        &csrf,
    );
    form_page(&state, StatusCode::OK, &csrf, html)
}

/// POST /todos/add
async fn add(
    State(state): State<AppState>,
    csrf: CsrfToken,
    VerifiedForm(form): VerifiedForm<TodoForm>,
) -> Result<Response, ApiError> {
    let todo = match form.validate() {
        Ok(todo) => todo,
        Err(errors) => {
            let html = render::todo_form("Add to-do", "/todos/add", &form, &errors, &csrf);
            return Ok(form_page(&state, StatusCode::UNPROCESSABLE_ENTITY, &csrf, html));
        }
    };

    let created = state.todo_repo().create(&todo).await?;
    tracing::info!(id = created.id, "created to-do");
    Ok(Redirect::to(LIST).into_response())
}

/// GET /todos/edit/{id}
async fn edit_page(
    State(state): State<AppState>,
    RowId(id): RowId,
    csrf: CsrfToken,
) -> Result<Response, ApiError> {
    let item = state.todo_repo().get(id).await?;
    let html = render::todo_form(
        "Edit to-do",
        &format!("/todos/edit/{}", id),
        &TodoForm::from_item(&item),
        &FieldErrors::new(),
        &csrf,
    );
    Ok(form_page(&state, StatusCode::OK, &csrf, html))
}

/// POST /todos/edit/{id}
async fn edit(
    State(state): State<AppState>,
    RowId(id): RowId,
    csrf: CsrfToken,
    VerifiedForm(form): VerifiedForm<TodoForm>,
) -> Result<Response, ApiError> {
    if form.row_id() != Some(id) {
        return Err(ApiError::IdMismatch {
            path: id,
            form: form.row_id(),
        });
    }

    let todo = match form.validate() {
        Ok(todo) => todo,
        Err(errors) => {
            let action = format!("/todos/edit/{}", id);
            let html = render::todo_form("Edit to-do", &action, &form, &errors, &csrf);
            return Ok(form_page(&state, StatusCode::UNPROCESSABLE_ENTITY, &csrf, html));
        }
    };

    // Zero affected rows (deleted meanwhile) surfaces as NotFound
    state.todo_repo().update(id, &todo).await?;
    tracing::info!(id, "updated to-do");
    Ok(Redirect::to(LIST).into_response())
}

/// GET /todos/delete/{id}
async fn delete_page(
    State(state): State<AppState>,
    RowId(id): RowId,
    csrf: CsrfToken,
) -> Result<Response, ApiError> {
    let item = state.todo_repo().get(id).await?;
    Ok(form_page(
        &state,
        StatusCode::OK,
        &csrf,
        render::todo_delete(&item, &csrf),
    ))
}

/// POST /todos/delete/{id}
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

    state.todo_repo().delete(id).await?;
    tracing::info!(id, "deleted to-do");
    Ok(Redirect::to(LIST))
}

/// To-do routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list))
        .route("/todos/add", get(add_page).post(add))
        .route("/todos/edit/{id}", get(edit_page).post(edit))
        .route("/todos/delete/{id}", get(delete_page).post(delete))
}
