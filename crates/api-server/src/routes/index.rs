//! Research form page

use axum::{response::Html, routing::get, Router};

use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}
