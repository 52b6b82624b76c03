use axum::response::Html;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// GET /
/// Single-page UI that drives the session API from the browser.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
