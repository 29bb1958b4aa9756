//! Live Session Model
//!
//! A broadcast moves scheduled → live → ended, forward only. Viewer counts
//! fluctuate with heartbeats; `max_viewer_count` is a monotonic watermark.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Live session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum LiveStatus {
    Scheduled,
    Live,
    Ended,
}

impl LiveStatus {
    /// Forward only, no skipping: scheduled → live → ended
    pub fn can_transition(self, to: LiveStatus) -> bool {
        use LiveStatus::*;
        matches!((self, to), (Scheduled, Live) | (Live, Ended))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LiveStatus::Scheduled => "SCHEDULED",
            LiveStatus::Live => "LIVE",
            LiveStatus::Ended => "ENDED",
        }
    }
}

impl std::fmt::Display for LiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live session entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LiveSession {
    pub id: i64,
    pub host_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: LiveStatus,
    /// Ingest key handed to the host; unique per session
    pub stream_key: String,
    /// Viewer-facing room identifier; unique per session
    pub room_id: String,
    pub scheduled_at: Option<i64>,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
    pub viewer_count: i64,
    /// Watermark: never decreases, always >= viewer_count
    pub max_viewer_count: i64,
    #[serde(default = "default_settings")]
    pub settings: serde_json::Value,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_settings() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl LiveSession {
    /// Viewer authorization seam.
    ///
    /// Currently every session is public; per-host or per-follower policies
    /// plug in here without touching the state machine.
    pub fn viewable_by(&self, _viewer_id: &str) -> bool {
        true
    }
}

/// Showcase entry: a product pinned to a session, with a dense display rank
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShowcaseEntry {
    pub id: i64,
    pub live_session_id: i64,
    pub product_id: i64,
    pub sort_order: i64,
    #[serde(default)]
    pub is_highlighted: bool,
}

/// Showcase entry joined with live catalog data (viewer-facing list)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShowcaseItemDetail {
    pub product_id: i64,
    pub name: String,
    pub image: Option<String>,
    pub price: i64,
    pub discount_price: Option<i64>,
    pub stock: i64,
    pub sort_order: i64,
    #[serde(default)]
    pub is_highlighted: bool,
}

// =============================================================================
// Request payloads
// =============================================================================

/// Create session payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LiveSessionCreate {
    #[validate(length(min = 1, message = "host_id is required"))]
    pub host_id: String,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: Option<i64>,
    pub settings: Option<serde_json::Value>,
}

/// Update session payload (only while SCHEDULED)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LiveSessionUpdate {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_at: Option<i64>,
    pub settings: Option<serde_json::Value>,
}

/// Viewer heartbeat payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct ViewerCountUpdate {
    #[validate(range(min = 0, message = "viewer count cannot be negative"))]
    pub count: i64,
}

/// One showcase line in a replace request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowcaseReplaceEntry {
    pub product_id: i64,
    pub sort_order: i64,
    #[serde(default)]
    pub is_highlighted: bool,
}

/// Full-set showcase replacement: the given list becomes the showcase,
/// prior entries are dropped, duplicates collapse to the last occurrence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowcaseReplace {
    pub entries: Vec<ShowcaseReplaceEntry>,
}

/// Session with its showcase (detail view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSessionDetail {
    #[serde(flatten)]
    pub session: LiveSession,
    pub showcase: Vec<ShowcaseItemDetail>,
}

/// Derived, read-only session statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub session_id: i64,
    pub status: LiveStatus,
    /// ended_at - started_at, present once ended
    pub duration_ms: Option<i64>,
    /// 0 unless the session is live
    pub current_viewers: i64,
    pub peak_viewers: i64,
    pub showcase_count: i64,
}
