pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;
use crate::ui;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/", get(ui::index))
        .route("/health", get(health::health_handler))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/templates/extraction",
            put(handlers::handle_update_extraction_template),
        )
        .route(
            "/api/v1/sessions/:id/templates/questions",
            put(handlers::handle_update_question_template),
        )
        .route(
            "/api/v1/sessions/:id/templates/reset",
            post(handlers::handle_reset_templates),
        )
        .route(
            "/api/v1/sessions/:id/extract",
            post(handlers::handle_extract).layer(upload_limit),
        )
        .route(
            "/api/v1/sessions/:id/questions",
            post(handlers::handle_generate_questions),
        )
        .with_state(state)
}
