//! Landing page

use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::http::render;

/// GET /
async fn home() -> Html<String> {
    Html(render::home())
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(home))
}
