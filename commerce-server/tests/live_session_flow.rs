//! Live session lifecycle, viewer watermark and showcase tests

mod common;

use async_trait::async_trait;
use commerce_server::AppError;
use commerce_server::services::{LiveSessionService, NoopNotifier, StreamNotifier};
use shared::models::{
    LiveSession, LiveSessionCreate, LiveSessionUpdate, LiveStatus, ShowcaseReplace,
    ShowcaseReplaceEntry, ViewerCountUpdate,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{seed_product, test_db};

fn create_request(host: &str, title: &str) -> LiveSessionCreate {
    LiveSessionCreate {
        host_id: host.to_string(),
        title: title.to_string(),
        description: None,
        scheduled_at: None,
        settings: Some(serde_json::json!({ "chat_enabled": true })),
    }
}

fn service(pool: sqlx::SqlitePool) -> LiveSessionService {
    LiveSessionService::new(pool, Arc::new(NoopNotifier))
}

struct RecordingNotifier {
    started: AtomicUsize,
}

#[async_trait]
impl StreamNotifier for RecordingNotifier {
    async fn stream_started(&self, _session: &LiveSession) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn lifecycle_is_forward_only() {
    let db = test_db().await;
    let live = service(db.pool.clone());

    let session = live.create(create_request("host-1", "Friday drop")).await.unwrap();
    assert_eq!(session.status, LiveStatus::Scheduled);
    assert!(session.started_at.is_none());

    // Ending a scheduled session skips LIVE and is rejected
    let err = live.end(session.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    let started = live.start(session.id).await.unwrap();
    assert_eq!(started.status, LiveStatus::Live);
    assert_eq!(started.viewer_count, 0);
    assert!(started.started_at.is_some());

    // Starting twice is rejected
    let err = live.start(session.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    let ended = live.end(session.id).await.unwrap();
    assert_eq!(ended.status, LiveStatus::Ended);
    assert!(ended.ended_at.is_some());

    // Terminal
    let err = live.start(session.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}

#[tokio::test]
async fn starting_fires_follower_notification() {
    let db = test_db().await;
    let notifier = Arc::new(RecordingNotifier {
        started: AtomicUsize::new(0),
    });
    let live = LiveSessionService::new(db.pool.clone(), notifier.clone());

    let session = live.create(create_request("host-1", "Launch")).await.unwrap();
    live.start(session.id).await.unwrap();

    // Fan-out is fire-and-forget on a spawned task; give it a beat
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(notifier.started.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn viewer_watermark_never_decreases() {
    let db = test_db().await;
    let live = service(db.pool.clone());

    let session = live.create(create_request("host-1", "Evening show")).await.unwrap();
    live.start(session.id).await.unwrap();

    let mut peak_seen = 0;
    for count in [5, 12, 7, 0, 3] {
        let updated = live
            .update_viewer_count(session.id, ViewerCountUpdate { count })
            .await
            .unwrap();
        peak_seen = peak_seen.max(count);
        assert_eq!(updated.viewer_count, count);
        assert_eq!(updated.max_viewer_count, peak_seen);
        assert!(updated.max_viewer_count >= updated.viewer_count);
    }

    let ended = live.end(session.id).await.unwrap();
    assert_eq!(ended.max_viewer_count, 12);

    let stats = live.stats(session.id).await.unwrap();
    assert_eq!(stats.current_viewers, 0);
    assert_eq!(stats.peak_viewers, 12);
    assert!(stats.duration_ms.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_heartbeats_keep_watermark_consistent() {
    let db = test_db().await;
    let live = service(db.pool.clone());

    let session = live.create(create_request("host-1", "Big drop")).await.unwrap();
    live.start(session.id).await.unwrap();

    let counts: Vec<i64> = (0..50).map(|i| (i * 7) % 40).collect();
    let expected_peak = *counts.iter().max().unwrap();

    let mut handles = Vec::new();
    for count in counts {
        let pool = db.pool.clone();
        handles.push(tokio::spawn(async move {
            service(pool)
                .update_viewer_count(session.id, ViewerCountUpdate { count })
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stats = live.stats(session.id).await.unwrap();
    assert_eq!(stats.peak_viewers, expected_peak);
    assert!(stats.current_viewers <= stats.peak_viewers);
}

#[tokio::test]
async fn heartbeats_only_apply_while_live() {
    let db = test_db().await;
    let live = service(db.pool.clone());

    let session = live.create(create_request("host-1", "Soon")).await.unwrap();
    let err = live
        .update_viewer_count(session.id, ViewerCountUpdate { count: 9 })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn showcase_replace_is_a_full_swap() {
    let db = test_db().await;
    let live = service(db.pool.clone());

    let p1 = seed_product(&db.pool, "Product One", 10_000, None, 5).await;
    let p2 = seed_product(&db.pool, "Product Two", 20_000, None, 5).await;

    let session = live.create(create_request("host-1", "Showcase test")).await.unwrap();

    let first = live
        .replace_showcase(
            session.id,
            ShowcaseReplace {
                entries: vec![ShowcaseReplaceEntry {
                    product_id: p1.id,
                    sort_order: 1,
                    is_highlighted: true,
                }],
            },
        )
        .await
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].product_id, p1.id);
    assert!(first[0].is_highlighted);

    // Second replace drops P1 entirely — set semantics, not a merge
    let second = live
        .replace_showcase(
            session.id,
            ShowcaseReplace {
                entries: vec![ShowcaseReplaceEntry {
                    product_id: p2.id,
                    sort_order: 1,
                    is_highlighted: false,
                }],
            },
        )
        .await
        .unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].product_id, p2.id);
    assert!(!second[0].is_highlighted);

    let stats = live.stats(session.id).await.unwrap();
    assert_eq!(stats.showcase_count, 1);
}

#[tokio::test]
async fn duplicate_showcase_products_collapse_to_last() {
    let db = test_db().await;
    let live = service(db.pool.clone());

    let p1 = seed_product(&db.pool, "Repeated", 10_000, None, 5).await;
    let session = live.create(create_request("host-1", "Dupes")).await.unwrap();

    let showcase = live
        .replace_showcase(
            session.id,
            ShowcaseReplace {
                entries: vec![
                    ShowcaseReplaceEntry {
                        product_id: p1.id,
                        sort_order: 1,
                        is_highlighted: true,
                    },
                    ShowcaseReplaceEntry {
                        product_id: p1.id,
                        sort_order: 4,
                        is_highlighted: false,
                    },
                ],
            },
        )
        .await
        .unwrap();

    // last occurrence's attributes survive; ranks are re-numbered densely
    assert_eq!(showcase.len(), 1);
    assert_eq!(showcase[0].sort_order, 1);
    assert!(!showcase[0].is_highlighted);
}

#[tokio::test]
async fn showcase_ranks_are_dense() {
    let db = test_db().await;
    let live = service(db.pool.clone());

    let p1 = seed_product(&db.pool, "First", 10_000, None, 5).await;
    let p2 = seed_product(&db.pool, "Second", 10_000, None, 5).await;
    let p3 = seed_product(&db.pool, "Third", 10_000, None, 5).await;
    let session = live.create(create_request("host-1", "Ranked")).await.unwrap();

    // sparse, out-of-order input ranks collapse to 1..n
    let showcase = live
        .replace_showcase(
            session.id,
            ShowcaseReplace {
                entries: vec![
                    ShowcaseReplaceEntry {
                        product_id: p1.id,
                        sort_order: 10,
                        is_highlighted: false,
                    },
                    ShowcaseReplaceEntry {
                        product_id: p2.id,
                        sort_order: 3,
                        is_highlighted: true,
                    },
                    ShowcaseReplaceEntry {
                        product_id: p3.id,
                        sort_order: 7,
                        is_highlighted: false,
                    },
                ],
            },
        )
        .await
        .unwrap();

    let ordered: Vec<(i64, i64)> = showcase.iter().map(|s| (s.sort_order, s.product_id)).collect();
    assert_eq!(
        ordered,
        vec![(1, p2.id), (2, p3.id), (3, p1.id)],
        "requested order kept, ranks densified"
    );
}

#[tokio::test]
async fn only_scheduled_sessions_are_editable() {
    let db = test_db().await;
    let live = service(db.pool.clone());

    let session = live.create(create_request("host-1", "Editable")).await.unwrap();
    let updated = live
        .update(
            session.id,
            LiveSessionUpdate {
                title: Some("Editable v2".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Editable v2");
    // untouched fields survive a partial update
    assert_eq!(updated.settings["chat_enabled"], serde_json::json!(true));

    live.start(session.id).await.unwrap();
    let err = live
        .update(
            session.id,
            LiveSessionUpdate {
                title: Some("Too late".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn list_filters_by_status() {
    let db = test_db().await;
    let live = service(db.pool.clone());

    let a = live.create(create_request("host-1", "A")).await.unwrap();
    let _b = live.create(create_request("host-1", "B")).await.unwrap();
    live.start(a.id).await.unwrap();

    let live_sessions = live.list(Some(LiveStatus::Live), 50, 0).await.unwrap();
    assert_eq!(live_sessions.len(), 1);
    assert_eq!(live_sessions[0].id, a.id);

    let scheduled = live.list(Some(LiveStatus::Scheduled), 50, 0).await.unwrap();
    assert_eq!(scheduled.len(), 1);

    let all = live.list(None, 50, 0).await.unwrap();
    assert_eq!(all.len(), 2);
}
