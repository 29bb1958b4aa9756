//! Live Session Repository
//!
//! Lifecycle transitions are guarded conditional updates; viewer heartbeats
//! are a single-row atomic update carrying the max-merge watermark.

use super::{RepoError, RepoResult};
use shared::models::{LiveSession, LiveStatus, ShowcaseItemDetail, ShowcaseReplaceEntry};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const SESSION_COLUMNS: &str = "id, host_id, title, description, status, stream_key, room_id, \
    scheduled_at, started_at, ended_at, viewer_count, max_viewer_count, settings, created_at, updated_at";

pub async fn insert(conn: &mut SqliteConnection, session: &LiveSession) -> RepoResult<()> {
    sqlx::query(&format!(
        "INSERT INTO live_session ({SESSION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(session.id)
    .bind(&session.host_id)
    .bind(&session.title)
    .bind(&session.description)
    .bind(session.status)
    .bind(&session.stream_key)
    .bind(&session.room_id)
    .bind(session.scheduled_at)
    .bind(session.started_at)
    .bind(session.ended_at)
    .bind(session.viewer_count)
    .bind(session.max_viewer_count)
    .bind(sqlx::types::Json(&session.settings))
    .bind(session.created_at)
    .bind(session.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<LiveSession>> {
    let session = sqlx::query_as::<_, LiveSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM live_session WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

/// Sessions newest-first, optionally filtered by lifecycle status
pub async fn list(
    pool: &SqlitePool,
    status: Option<LiveStatus>,
    limit: i32,
    offset: i32,
) -> RepoResult<Vec<LiveSession>> {
    let sessions = match status {
        Some(status) => {
            sqlx::query_as::<_, LiveSession>(&format!(
                "SELECT {SESSION_COLUMNS} FROM live_session WHERE status = ? ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, LiveSession>(&format!(
                "SELECT {SESSION_COLUMNS} FROM live_session ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(sessions)
}

/// Update descriptive fields while still SCHEDULED
pub async fn update_info(
    pool: &SqlitePool,
    id: i64,
    title: Option<&str>,
    description: Option<&str>,
    scheduled_at: Option<i64>,
    settings: Option<&serde_json::Value>,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE live_session SET \
         title = COALESCE(?1, title), \
         description = COALESCE(?2, description), \
         scheduled_at = COALESCE(?3, scheduled_at), \
         settings = COALESCE(?4, settings), \
         updated_at = ?5 \
         WHERE id = ?6 AND status = 'SCHEDULED'",
    )
    .bind(title)
    .bind(description)
    .bind(scheduled_at)
    .bind(settings.map(sqlx::types::Json))
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// SCHEDULED -> LIVE; stamps started_at and resets the live viewer count
pub async fn start_if_scheduled(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE live_session SET status = 'LIVE', started_at = ?, viewer_count = 0, updated_at = ? \
         WHERE id = ? AND status = 'SCHEDULED'",
    )
    .bind(now)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// LIVE -> ENDED; stamps ended_at
pub async fn end_if_live(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE live_session SET status = 'ENDED', ended_at = ?, updated_at = ? \
         WHERE id = ? AND status = 'LIVE'",
    )
    .bind(now)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Heartbeat: last-writer-wins on viewer_count, max-merge on the watermark.
///
/// One statement, so concurrent heartbeats can interleave in any order
/// without the watermark ever going backwards.
pub async fn update_viewer_count(pool: &SqlitePool, id: i64, count: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE live_session SET viewer_count = ?1, \
         max_viewer_count = MAX(max_viewer_count, ?1), updated_at = ?2 \
         WHERE id = ?3 AND status = 'LIVE'",
    )
    .bind(count)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Full-set showcase swap inside one transaction scope.
///
/// Caller has already collapsed duplicate product refs; entries land with
/// their given sort_order.
pub async fn replace_showcase(
    conn: &mut SqliteConnection,
    session_id: i64,
    entries: &[ShowcaseReplaceEntry],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM showcase_entry WHERE live_session_id = ?")
        .bind(session_id)
        .execute(&mut *conn)
        .await?;

    for entry in entries {
        sqlx::query(
            "INSERT INTO showcase_entry (id, live_session_id, product_id, sort_order, is_highlighted) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(snowflake_id())
        .bind(session_id)
        .bind(entry.product_id)
        .bind(entry.sort_order)
        .bind(entry.is_highlighted)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Showcase joined with live catalog data, in display order
pub async fn showcase_details(
    pool: &SqlitePool,
    session_id: i64,
) -> RepoResult<Vec<ShowcaseItemDetail>> {
    let items = sqlx::query_as::<_, ShowcaseItemDetail>(
        "SELECT s.product_id, p.name, p.image, p.price, p.discount_price, p.stock, \
         s.sort_order, s.is_highlighted \
         FROM showcase_entry s JOIN product p ON p.id = s.product_id \
         WHERE s.live_session_id = ? ORDER BY s.sort_order, s.product_id",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn showcase_count(pool: &SqlitePool, session_id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM showcase_entry WHERE live_session_id = ?",
    )
    .bind(session_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Guard helper: sessions must exist before attaching showcase/viewer data
pub async fn require_exists(pool: &SqlitePool, id: i64) -> RepoResult<LiveSession> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Live session {id} not found")))
}
