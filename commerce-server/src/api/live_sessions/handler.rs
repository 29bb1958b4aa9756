//! Live Session API Handlers
//!
//! Hosts drive the lifecycle; list/get/stats are public reads. Viewer-count
//! heartbeats arrive here on a 10-30s poll from each viewer session.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{
    LiveSession, LiveSessionCreate, LiveSessionDetail, LiveSessionUpdate, LiveStatus,
    SessionStats, ShowcaseItemDetail, ShowcaseReplace, ViewerCountUpdate,
};

fn default_limit() -> i32 {
    50
}

/// Query params for listing sessions
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<LiveStatus>,
    #[serde(default = "default_limit")]
    pub limit: i32,
    #[serde(default)]
    pub offset: i32,
}

/// Schedule a new session
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<LiveSessionCreate>,
) -> AppResult<Json<LiveSession>> {
    let session = state.live().create(payload).await?;
    Ok(Json(session))
}

/// List sessions, optionally filtered by status
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<LiveSession>>> {
    let sessions = state
        .live()
        .list(query.status, query.limit, query.offset)
        .await?;
    Ok(Json(sessions))
}

/// Session with its showcase
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<LiveSessionDetail>> {
    let detail = state.live().get(id).await?;
    Ok(Json(detail))
}

/// Edit a scheduled session
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<LiveSessionUpdate>,
) -> AppResult<Json<LiveSession>> {
    let session = state.live().update(id, payload).await?;
    Ok(Json(session))
}

/// Go live; notifies the host's followers
pub async fn start(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<LiveSession>> {
    let session = state.live().start(id).await?;
    Ok(Json(session))
}

/// End the broadcast
pub async fn end(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<LiveSession>> {
    let session = state.live().end(id).await?;
    Ok(Json(session))
}

/// Viewer-count heartbeat
pub async fn update_viewer_count(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ViewerCountUpdate>,
) -> AppResult<Json<LiveSession>> {
    let session = state.live().update_viewer_count(id, payload).await?;
    Ok(Json(session))
}

/// Replace the showcase wholesale
pub async fn replace_showcase(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ShowcaseReplace>,
) -> AppResult<Json<Vec<ShowcaseItemDetail>>> {
    let showcase = state.live().replace_showcase(id, payload).await?;
    Ok(Json(showcase))
}

/// Derived session statistics
pub async fn stats(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SessionStats>> {
    let stats = state.live().stats(id).await?;
    Ok(Json(stats))
}
