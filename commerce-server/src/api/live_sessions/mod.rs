//! Live Session API module

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/live-sessions", live_session_routes())
}

fn live_session_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/start", post(handler::start))
        .route("/{id}/end", post(handler::end))
        .route("/{id}/viewers", put(handler::update_viewer_count))
        .route("/{id}/showcase", put(handler::replace_showcase))
        .route("/{id}/stats", get(handler::stats))
}
