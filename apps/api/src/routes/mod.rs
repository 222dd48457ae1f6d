pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::interview::handlers as interview;
use crate::ratings::handlers as ratings;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume analysis
        .route(
            "/api/v1/analyses",
            post(analysis::handle_analyze).get(analysis::handle_list_analyses),
        )
        .route(
            "/api/v1/analyses/:id",
            delete(analysis::handle_delete_analysis),
        )
        // Technology ratings
        .route("/api/v1/ratings/extract", post(ratings::handle_extract))
        .route(
            "/api/v1/ratings",
            put(ratings::handle_update_ratings).get(ratings::handle_list_ratings),
        )
        .route(
            "/api/v1/ratings/:id",
            delete(ratings::handle_delete_rating),
        )
        // Mock interviews
        .route(
            "/api/v1/interviews",
            post(interview::handle_create_interview).get(interview::handle_list_interviews),
        )
        .route("/api/v1/interviews/:id", get(interview::handle_get_interview))
        .route(
            "/api/v1/interviews/:id/start",
            post(interview::handle_start_interview),
        )
        .route(
            "/api/v1/interviews/:id/answers",
            post(interview::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:id/complete",
            post(interview::handle_complete_interview),
        )
        .with_state(state)
}
