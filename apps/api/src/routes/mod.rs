pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::input::handlers as input;
use crate::orchestrator::handlers as score;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Inputs
        .route("/api/v1/resume", post(input::handle_upload_resume))
        .route("/api/v1/profile", post(input::handle_submit_profile))
        .route(
            "/api/v1/profile/score",
            post(input::handle_preview_profile_score),
        )
        // Derived views
        .route("/api/v1/score", get(score::handle_get_score))
        .route("/api/v1/trust-graph", get(score::handle_get_trust_graph))
        .with_state(state)
}
