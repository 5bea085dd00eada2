pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;
use crate::wizard::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/wizard/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/wizard/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/wizard/sessions/:id/fields",
            put(handlers::handle_edit_field),
        )
        .route(
            "/api/v1/wizard/sessions/:id/advance",
            post(handlers::handle_advance),
        )
        .route(
            "/api/v1/wizard/sessions/:id/retreat",
            post(handlers::handle_retreat),
        )
        .route(
            "/api/v1/wizard/sessions/:id/reset",
            post(handlers::handle_reset),
        )
        .route(
            "/api/v1/wizard/sessions/:id/submit",
            post(handlers::handle_submit),
        )
        .with_state(state)
}
