//! Router-level tests for the to-do and blog controllers
//!
//! Each test builds the full router over in-memory SQLite contexts and
//! drives it with `oneshot`, checking both the HTTP outcome and what ended
//! up in the database.

use axum::body::{to_bytes, Body};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, COOKIE, LOCATION, ORIGIN, SET_COOKIE,
    STRICT_TRANSPORT_SECURITY,
};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use todoblog_server::db::{
    seed_todos_if_empty, Database, PersistenceContext, PostRepo, TodoRepo, BLOG_MIGRATIONS,
    TODO_MIGRATIONS,
};
use todoblog_server::models::NewTodo;
use todoblog_server::{build_router, AppState, ServerConfig};

const TOKEN: &str = "k3yk3yk3yk3yk3yk3yk3yk3yk3yk3yk3yk3yk3yk3yk";

async fn test_state() -> AppState {
    let (todos, _) =
        PersistenceContext::from_database("todos", Database::in_memory().await.unwrap(), &TODO_MIGRATIONS)
            .await
            .unwrap();
    let (blog, _) =
        PersistenceContext::from_database("blog", Database::in_memory().await.unwrap(), &BLOG_MIGRATIONS)
            .await
            .unwrap();
    AppState::new(todos, blog, false)
}

fn app(state: &AppState) -> Router {
    build_router(state.clone(), &ServerConfig::default())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Form POST carrying the CSRF cookie; `body` must include `_csrf` to pass.
fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(COOKIE, format!("todoblog_csrf={}", TOKEN))
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn todo_count(state: &AppState) -> i64 {
    TodoRepo::new(state.todos().db()).count().await.unwrap()
}

async fn insert_todo(state: &AppState, task: &str) -> i64 {
    TodoRepo::new(state.todos().db())
        .create(&NewTodo::parse(task, "details", false).unwrap())
        .await
        .unwrap()
        .id
}

// === To-dos ===

#[tokio::test]
async fn list_renders_seeded_rows() {
    let state = test_state().await;
    seed_todos_if_empty(&TodoRepo::new(state.todos().db()))
        .await
        .unwrap();

    let response = app(&state).oneshot(get("/todos")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Sample Task 1"));
    assert!(html.contains("Sample Task 2"));
}

#[tokio::test]
async fn add_page_issues_csrf_cookie_and_field() {
    let state = test_state().await;

    let response = app(&state).oneshot(get("/todos/add")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_owned();
    assert!(cookie.starts_with("todoblog_csrf="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));

    let token = cookie["todoblog_csrf=".len()..]
        .split(';')
        .next()
        .unwrap()
        .to_owned();
    let html = body_text(response).await;
    assert!(html.contains(&format!("name=\"_csrf\" value=\"{}\"", token)));
}

#[tokio::test]
async fn create_redirects_to_list() {
    let state = test_state().await;

    let body = format!("_csrf={}&task=Buy+milk&description=Two+litres&is_completed=true", TOKEN);
    let response = app(&state).oneshot(post("/todos/add", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/todos");

    let items = TodoRepo::new(state.todos().db()).list().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].task, "Buy milk");
    assert!(items[0].is_completed);
}

#[tokio::test]
async fn overlong_task_is_rejected_without_write() {
    let state = test_state().await;

    let body = format!("_csrf={}&task={}&description=ok", TOKEN, "a".repeat(101));
    let response = app(&state).oneshot(post("/todos/add", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("task exceeds maximum length of 100 characters"));
    assert_eq!(todo_count(&state).await, 0);
}

#[tokio::test]
async fn empty_fields_report_each_error() {
    let state = test_state().await;

    let body = format!("_csrf={}", TOKEN);
    let response = app(&state).oneshot(post("/todos/add", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("task cannot be empty"));
    assert!(html.contains("description cannot be empty"));
}

#[tokio::test]
async fn post_without_csrf_token_is_forbidden() {
    let state = test_state().await;

    let response = app(&state)
        .oneshot(post("/todos/add", "task=Sneaky&description=forged"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(todo_count(&state).await, 0);
}

#[tokio::test]
async fn post_with_wrong_csrf_token_is_forbidden() {
    let state = test_state().await;
    let id = insert_todo(&state, "keep me").await;

    let response = app(&state)
        .oneshot(post(&format!("/todos/delete/{}", id), "_csrf=guessed"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(todo_count(&state).await, 1);
}

#[tokio::test]
async fn edit_page_for_missing_row_is_404() {
    let state = test_state().await;

    let response = app(&state).oneshot(get("/todos/edit/42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app(&state).oneshot(get("/todos/edit/not-a-number")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_updates_row() {
    let state = test_state().await;
    let id = insert_todo(&state, "draft").await;

    let body = format!("_csrf={}&id={}&task=final&description=done", TOKEN, id);
    let response = app(&state)
        .oneshot(post(&format!("/todos/edit/{}", id), &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let item = TodoRepo::new(state.todos().db()).get(id).await.unwrap();
    assert_eq!(item.task, "final");
    assert!(!item.is_completed);
}

#[tokio::test]
async fn edit_with_mismatched_id_is_400_without_write() {
    let state = test_state().await;
    let id = insert_todo(&state, "original").await;

    let body = format!("_csrf={}&id={}&task=hijack&description=x", TOKEN, id + 1);
    let response = app(&state)
        .oneshot(post(&format!("/todos/edit/{}", id), &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let item = TodoRepo::new(state.todos().db()).get(id).await.unwrap();
    assert_eq!(item.task, "original");
}

#[tokio::test]
async fn edit_of_deleted_row_is_404() {
    let state = test_state().await;
    let id = insert_todo(&state, "racing").await;
    TodoRepo::new(state.todos().db()).delete(id).await.unwrap();

    let body = format!("_csrf={}&id={}&task=late&description=edit", TOKEN, id);
    let response = app(&state)
        .oneshot(post(&format!("/todos/edit/{}", id), &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(todo_count(&state).await, 0);
}

#[tokio::test]
async fn deleting_twice_gives_404() {
    let state = test_state().await;
    let id = insert_todo(&state, "short-lived").await;
    let uri = format!("/todos/delete/{}", id);
    let body = format!("_csrf={}&id={}", TOKEN, id);

    let first = app(&state).oneshot(post(&uri, &body)).await.unwrap();
    assert_eq!(first.status(), StatusCode::SEE_OTHER);

    let second = app(&state).oneshot(post(&uri, &body)).await.unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    assert_eq!(todo_count(&state).await, 0);
}

#[tokio::test]
async fn delete_confirmation_page() {
    let state = test_state().await;
    let id = insert_todo(&state, "confirm me").await;

    let response = app(&state)
        .oneshot(get(&format!("/todos/delete/{}", id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("confirm me"));
}

// === Blog ===

#[tokio::test]
async fn blog_post_lifecycle() {
    let state = test_state().await;

    let body = format!(
        "_csrf={}&title=Hello&author=Ada&summary=&content=First+post&is_published=true",
        TOKEN
    );
    let response = app(&state).oneshot(post("/blog/posts/add", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/blog/posts");

    let posts = PostRepo::new(state.blog().db()).list().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].summary, None);
    let id = posts[0].id;

    let html = body_text(app(&state).oneshot(get("/blog/posts")).await.unwrap()).await;
    assert!(html.contains("Hello"));
    assert!(html.contains("by Ada"));

    let body = format!(
        "_csrf={}&id={}&title=Hello+again&author=Ada&summary=Short&content=Edited",
        TOKEN, id
    );
    let response = app(&state)
        .oneshot(post(&format!("/blog/posts/edit/{}", id), &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let updated = PostRepo::new(state.blog().db()).get(id).await.unwrap();
    assert_eq!(updated.title, "Hello again");
    assert!(updated.updated_at.is_some());
    assert!(!updated.is_published);

    let body = format!("_csrf={}&id={}", TOKEN, id);
    let uri = format!("/blog/posts/delete/{}", id);
    assert_eq!(
        app(&state).oneshot(post(&uri, &body)).await.unwrap().status(),
        StatusCode::SEE_OTHER
    );
    assert_eq!(
        app(&state).oneshot(post(&uri, &body)).await.unwrap().status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn blog_validation_rerenders_form() {
    let state = test_state().await;

    let body = format!("_csrf={}&title={}&author=&content=Body", TOKEN, "t".repeat(201));
    let response = app(&state).oneshot(post("/blog/posts/add", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("title exceeds maximum length of 200 characters"));
    assert!(html.contains("author cannot be empty"));
    assert_eq!(PostRepo::new(state.blog().db()).count().await.unwrap(), 0);
}

#[tokio::test]
async fn blog_delete_with_mismatched_id_is_400() {
    let state = test_state().await;

    let body = format!("_csrf={}&title=T&author=A&content=C", TOKEN);
    app(&state).oneshot(post("/blog/posts/add", &body)).await.unwrap();
    let id = PostRepo::new(state.blog().db()).list().await.unwrap()[0].id;

    let body = format!("_csrf={}&id={}", TOKEN, id + 5);
    let response = app(&state)
        .oneshot(post(&format!("/blog/posts/delete/{}", id), &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(PostRepo::new(state.blog().db()).exists(id).await.unwrap());
}

// === Misc ===

#[tokio::test]
async fn home_links_both_areas() {
    let state = test_state().await;
    let html = body_text(app(&state).oneshot(get("/")).await.unwrap()).await;
    assert!(html.contains("href=\"/todos\""));
    assert!(html.contains("href=\"/blog/posts\""));
}

#[tokio::test]
async fn health_reports_each_context() {
    let state = test_state().await;

    let response = app(&state).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["contexts"]["todos"]["ok"], true);
    assert_eq!(json["contexts"]["blog"]["engine"], "sqlite");
}

#[tokio::test]
async fn health_degrades_when_a_pool_closes() {
    let state = test_state().await;
    state.blog().close().await;

    let response = app(&state).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn hsts_only_when_enabled() {
    let state = test_state().await;

    let response = app(&state).oneshot(get("/")).await.unwrap();
    assert!(response.headers().get(STRICT_TRANSPORT_SECURITY).is_none());

    let config = ServerConfig {
        hsts: true,
        ..ServerConfig::default()
    };
    let response = build_router(state.clone(), &config)
        .oneshot(get("/"))
        .await
        .unwrap();
    assert!(response.headers().get(STRICT_TRANSPORT_SECURITY).is_some());
}

#[tokio::test]
async fn cors_allows_local_origin_on_bound_port() {
    let state = test_state().await;
    let config = ServerConfig {
        bind_addr: "127.0.0.1:8081".parse().unwrap(),
        ..ServerConfig::default()
    };

    let request = |origin: &str| {
        Request::builder()
            .uri("/health")
            .header(ORIGIN, origin)
            .body(Body::empty())
            .unwrap()
    };

    let response = build_router(state.clone(), &config)
        .oneshot(request("http://localhost:8081"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:8081"
    );

    let response = build_router(state.clone(), &config)
        .oneshot(request("http://localhost:3000"))
        .await
        .unwrap();
    assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
