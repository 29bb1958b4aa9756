//! Live Session Service
//!
//! Broadcast lifecycle (scheduled → live → ended), viewer-count aggregation
//! and the product showcase. Heartbeats arrive concurrently from many viewer
//! sessions; both counters are updated in a single statement so no heartbeat
//! ordering can drag the peak watermark backwards.

use shared::models::{
    LiveSession, LiveSessionCreate, LiveSessionDetail, LiveSessionUpdate, LiveStatus,
    SessionStats, ShowcaseItemDetail, ShowcaseReplace, ShowcaseReplaceEntry, ViewerCountUpdate,
};
use shared::util::{now_millis, snowflake_id, unique_key};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::db::repository::{live_session, product};
use crate::services::StreamNotifier;
use crate::utils::{AppError, AppResult};

pub struct LiveSessionService {
    pool: SqlitePool,
    notifier: Arc<dyn StreamNotifier>,
}

impl LiveSessionService {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn StreamNotifier>) -> Self {
        Self { pool, notifier }
    }

    // =========================================================================
    // Host operations
    // =========================================================================

    pub async fn create(&self, req: LiveSessionCreate) -> AppResult<LiveSession> {
        req.validate()?;

        let now = now_millis();
        let session = LiveSession {
            id: snowflake_id(),
            host_id: req.host_id,
            title: req.title,
            description: req.description,
            status: LiveStatus::Scheduled,
            stream_key: unique_key("sk"),
            room_id: unique_key("room"),
            scheduled_at: req.scheduled_at,
            started_at: None,
            ended_at: None,
            viewer_count: 0,
            max_viewer_count: 0,
            settings: req.settings.unwrap_or_else(|| serde_json::json!({})),
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.pool.acquire().await?;
        live_session::insert(&mut conn, &session).await?;

        tracing::info!(session_id = session.id, host_id = %session.host_id, "Live session scheduled");
        Ok(session)
    }

    /// Edit descriptive fields; only a SCHEDULED session is editable
    pub async fn update(&self, id: i64, req: LiveSessionUpdate) -> AppResult<LiveSession> {
        req.validate()?;

        let updated = live_session::update_info(
            &self.pool,
            id,
            req.title.as_deref(),
            req.description.as_deref(),
            req.scheduled_at,
            req.settings.as_ref(),
        )
        .await?;
        if !updated {
            let current = live_session::require_exists(&self.pool, id).await?;
            return Err(AppError::conflict(format!(
                "Live session {id} is {} and can no longer be edited",
                current.status
            )));
        }
        Ok(live_session::require_exists(&self.pool, id).await?)
    }

    /// SCHEDULED -> LIVE. Fires the follower notification without waiting
    /// for it; notification failure never rolls the session back.
    pub async fn start(&self, id: i64) -> AppResult<LiveSession> {
        let started = live_session::start_if_scheduled(&self.pool, id).await?;
        if !started {
            let current = live_session::require_exists(&self.pool, id).await?;
            return Err(AppError::invalid_transition(current.status, LiveStatus::Live));
        }

        let session = live_session::require_exists(&self.pool, id).await?;

        let notifier = Arc::clone(&self.notifier);
        let snapshot = session.clone();
        tokio::spawn(async move {
            notifier.stream_started(&snapshot).await;
        });

        tracing::info!(session_id = id, "Live session started");
        Ok(session)
    }

    /// LIVE -> ENDED
    pub async fn end(&self, id: i64) -> AppResult<LiveSession> {
        let ended = live_session::end_if_live(&self.pool, id).await?;
        if !ended {
            let current = live_session::require_exists(&self.pool, id).await?;
            return Err(AppError::invalid_transition(current.status, LiveStatus::Ended));
        }

        let session = live_session::require_exists(&self.pool, id).await?;
        tracing::info!(
            session_id = id,
            peak_viewers = session.max_viewer_count,
            "Live session ended"
        );
        Ok(session)
    }

    /// Viewer heartbeat; only a LIVE session accepts counts
    pub async fn update_viewer_count(
        &self,
        id: i64,
        req: ViewerCountUpdate,
    ) -> AppResult<LiveSession> {
        req.validate()?;

        let updated = live_session::update_viewer_count(&self.pool, id, req.count).await?;
        if !updated {
            let current = live_session::require_exists(&self.pool, id).await?;
            return Err(AppError::validation(format!(
                "Live session {id} is {}, viewer counts only apply while live",
                current.status
            )));
        }
        Ok(live_session::require_exists(&self.pool, id).await?)
    }

    /// Replace the whole showcase with the given list.
    ///
    /// Set-replace semantics: prior entries vanish, duplicates in the input
    /// collapse to the last occurrence's attributes.
    pub async fn replace_showcase(
        &self,
        id: i64,
        req: ShowcaseReplace,
    ) -> AppResult<Vec<ShowcaseItemDetail>> {
        live_session::require_exists(&self.pool, id).await?;

        // last occurrence wins; the requested sort_order decides relative
        // position, then entries are re-ranked densely 1..n
        let mut by_product: HashMap<i64, ShowcaseReplaceEntry> = HashMap::new();
        for entry in req.entries {
            by_product.insert(entry.product_id, entry);
        }
        let mut entries: Vec<ShowcaseReplaceEntry> = by_product.into_values().collect();
        entries.sort_by_key(|e| (e.sort_order, e.product_id));
        for (rank, entry) in entries.iter_mut().enumerate() {
            entry.sort_order = rank as i64 + 1;
        }

        // every showcased product must exist in the catalog
        for entry in &entries {
            if product::find_by_id(&self.pool, entry.product_id).await?.is_none() {
                return Err(AppError::not_found(format!(
                    "Product {} not found",
                    entry.product_id
                )));
            }
        }

        let mut tx = self.pool.begin().await?;
        live_session::replace_showcase(&mut tx, id, &entries).await?;
        tx.commit().await?;

        Ok(live_session::showcase_details(&self.pool, id).await?)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get(&self, id: i64) -> AppResult<LiveSessionDetail> {
        let session = live_session::require_exists(&self.pool, id).await?;
        let showcase = live_session::showcase_details(&self.pool, id).await?;
        Ok(LiveSessionDetail { session, showcase })
    }

    pub async fn list(
        &self,
        status: Option<LiveStatus>,
        limit: i32,
        offset: i32,
    ) -> AppResult<Vec<LiveSession>> {
        Ok(live_session::list(&self.pool, status, limit, offset).await?)
    }

    /// Derived statistics; pure read, no mutation
    pub async fn stats(&self, id: i64) -> AppResult<SessionStats> {
        let session = live_session::require_exists(&self.pool, id).await?;
        let showcase_count = live_session::showcase_count(&self.pool, id).await?;

        let duration_ms = match (session.started_at, session.ended_at) {
            (Some(started), Some(ended)) => Some(ended - started),
            _ => None,
        };
        let current_viewers = if session.status == LiveStatus::Live {
            session.viewer_count
        } else {
            0
        };

        Ok(SessionStats {
            session_id: session.id,
            status: session.status,
            duration_ms,
            current_viewers,
            peak_viewers: session.max_viewer_count,
            showcase_count,
        })
    }
}
