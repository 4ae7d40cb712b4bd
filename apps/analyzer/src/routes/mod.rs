pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::matching::handlers as matching;
use crate::profile::handlers as profile;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Skill profile
        .route(
            "/api/v1/profile/skills",
            get(profile::handle_get_skills).post(profile::handle_add_skill),
        )
        .route(
            "/api/v1/profile/skills/:skill",
            delete(profile::handle_remove_skill),
        )
        .route(
            "/api/v1/profile/suggestions",
            get(profile::handle_suggestions),
        )
        // Stateless analysis
        .route("/api/v1/match", post(matching::handle_match))
        .route("/api/v1/analyze", post(session::handle_analyze_once))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/input", put(session::handle_set_input))
        .route("/api/v1/sessions/:id/paste", post(session::handle_paste))
        .route("/api/v1/sessions/:id/analyze", post(session::handle_analyze))
        .route("/api/v1/sessions/:id/clear", post(session::handle_clear))
        .with_state(state)
}
