#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Duration, Timelike, Utc};
use std::collections::HashSet;
use tempfile::{tempdir, TempDir};

use maestro_notifier::database::connection::DatabaseManager;
use maestro_notifier::database::models::{Event, EventKind, NewEvent, NotifyThreshold, User};
use maestro_notifier::database::store::{NotificationStore, SqliteNotificationStore};

async fn setup_test_db() -> (DatabaseManager, TempDir) {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.to_string_lossy());

    let db = DatabaseManager::new(&db_url).await.unwrap();
    db.run_migrations().await.unwrap();
    (db, dir)
}

// Whole seconds keep window-boundary comparisons exact across storage
fn now_rounded() -> DateTime<Utc> {
    Utc::now().with_nanosecond(0).unwrap()
}

fn new_event(title: &str, starts_at: DateTime<Utc>) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        kind: EventKind::Webinar,
        starts_at,
        ends_at: None,
        meeting_url: None,
        recording_url: None,
        notify_enabled: true,
    }
}

async fn titles_crossing(
    store: &SqliteNotificationStore,
    threshold: NotifyThreshold,
    now: DateTime<Utc>,
) -> HashSet<String> {
    store
        .find_events_crossing_threshold(threshold, now, Duration::minutes(5))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect()
}

#[tokio::test]
async fn test_24h_window_boundaries_are_inclusive() {
    let (db, _temp_dir) = setup_test_db().await;
    let store = SqliteNotificationStore::new(&db);
    let now = now_rounded();
    let target = now + Duration::hours(24);

    for (title, starts_at) in [
        ("edge-early", target - Duration::minutes(5)),
        ("edge-late", target + Duration::minutes(5)),
        ("center", target),
        ("too-early", target - Duration::minutes(6)),
        ("too-late", target + Duration::minutes(6)),
    ] {
        Event::create(&db.pool, new_event(title, starts_at)).await.unwrap();
    }

    let found = titles_crossing(&store, NotifyThreshold::Hours24, now).await;

    assert!(found.contains("edge-early"));
    assert!(found.contains("edge-late"));
    assert!(found.contains("center"));
    assert!(!found.contains("too-early"));
    assert!(!found.contains("too-late"));
}

#[tokio::test]
async fn test_1h_window_uses_its_own_offset() {
    let (db, _temp_dir) = setup_test_db().await;
    let store = SqliteNotificationStore::new(&db);
    let now = now_rounded();

    Event::create(&db.pool, new_event("in-an-hour", now + Duration::hours(1)))
        .await
        .unwrap();
    Event::create(&db.pool, new_event("tomorrow", now + Duration::hours(24)))
        .await
        .unwrap();

    let hour = titles_crossing(&store, NotifyThreshold::Hour1, now).await;
    let day = titles_crossing(&store, NotifyThreshold::Hours24, now).await;

    assert_eq!(hour, HashSet::from(["in-an-hour".to_string()]));
    assert_eq!(day, HashSet::from(["tomorrow".to_string()]));
}

#[tokio::test]
async fn test_recording_threshold_has_no_window_candidates() {
    let (db, _temp_dir) = setup_test_db().await;
    let store = SqliteNotificationStore::new(&db);
    let now = now_rounded();

    Event::create(&db.pool, new_event("any", now)).await.unwrap();

    let found = store
        .find_events_crossing_threshold(NotifyThreshold::Recording, now, Duration::minutes(5))
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_notified_flag_removes_event_from_candidates() {
    let (db, _temp_dir) = setup_test_db().await;
    let store = SqliteNotificationStore::new(&db);
    let now = now_rounded();

    let event = Event::create(&db.pool, new_event("soon", now + Duration::hours(1)))
        .await
        .unwrap();
    store
        .mark_notified(&event.id, NotifyThreshold::Hour1)
        .await
        .unwrap();

    let found = titles_crossing(&store, NotifyThreshold::Hour1, now).await;
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_flags_filter_per_threshold() {
    let (db, _temp_dir) = setup_test_db().await;
    let store = SqliteNotificationStore::new(&db);
    let now = now_rounded();

    // Day-ahead reminder already sent; the 1h scan must still see it
    let event = Event::create(&db.pool, new_event("soon", now + Duration::hours(1)))
        .await
        .unwrap();
    store
        .mark_notified(&event.id, NotifyThreshold::Hours24)
        .await
        .unwrap();

    let found = titles_crossing(&store, NotifyThreshold::Hour1, now).await;
    assert_eq!(found, HashSet::from(["soon".to_string()]));
}

#[tokio::test]
async fn test_notify_disabled_events_excluded() {
    let (db, _temp_dir) = setup_test_db().await;
    let store = SqliteNotificationStore::new(&db);
    let now = now_rounded();

    let mut new = new_event("muted", now + Duration::hours(24));
    new.notify_enabled = false;
    Event::create(&db.pool, new).await.unwrap();

    let found = titles_crossing(&store, NotifyThreshold::Hours24, now).await;
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_recording_candidates() {
    let (db, _temp_dir) = setup_test_db().await;
    let store = SqliteNotificationStore::new(&db);
    let now = now_rounded();

    let mut ready = new_event("ready", now - Duration::days(1));
    ready.recording_url = Some("https://videos.example.com/1".to_string());
    Event::create(&db.pool, ready).await.unwrap();

    // No recording published
    Event::create(&db.pool, new_event("no-url", now - Duration::days(1)))
        .await
        .unwrap();

    // Recording attached before the event even started
    let mut future = new_event("not-started", now + Duration::hours(2));
    future.recording_url = Some("https://videos.example.com/2".to_string());
    Event::create(&db.pool, future).await.unwrap();

    let mut done = new_event("already-sent", now - Duration::days(2));
    done.recording_url = Some("https://videos.example.com/3".to_string());
    let done = Event::create(&db.pool, done).await.unwrap();
    store
        .mark_notified(&done.id, NotifyThreshold::Recording)
        .await
        .unwrap();

    let found: HashSet<String> = store
        .find_events_with_unnotified_recording(now)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();

    assert_eq!(found, HashSet::from(["ready".to_string()]));
}

#[tokio::test]
async fn test_mark_notified_is_idempotent() {
    let (db, _temp_dir) = setup_test_db().await;
    let store = SqliteNotificationStore::new(&db);
    let now = now_rounded();

    let event = Event::create(&db.pool, new_event("soon", now + Duration::hours(24)))
        .await
        .unwrap();

    store
        .mark_notified(&event.id, NotifyThreshold::Hours24)
        .await
        .unwrap();
    // Second write matches zero rows and must not error
    store
        .mark_notified(&event.id, NotifyThreshold::Hours24)
        .await
        .unwrap();

    let reloaded = Event::find_by_id(&db.pool, &event.id).await.unwrap().unwrap();
    assert!(reloaded.notified_24h);
    assert!(!reloaded.notified_1h);
    assert!(!reloaded.notified_record);
}

#[tokio::test]
async fn test_recording_flag_requires_recording_url() {
    let (db, _temp_dir) = setup_test_db().await;
    let store = SqliteNotificationStore::new(&db);
    let now = now_rounded();

    let event = Event::create(&db.pool, new_event("no-url", now - Duration::days(1)))
        .await
        .unwrap();

    store
        .mark_notified(&event.id, NotifyThreshold::Recording)
        .await
        .unwrap();

    let reloaded = Event::find_by_id(&db.pool, &event.id).await.unwrap().unwrap();
    assert!(!reloaded.notified_record);
}

#[tokio::test]
async fn test_recipients_are_only_linked_users_and_read_fresh() {
    let (db, _temp_dir) = setup_test_db().await;
    let store = SqliteNotificationStore::new(&db);

    User::create(&db.pool, Some("Alice"), Some("100001")).await.unwrap();
    User::create(&db.pool, Some("Bob"), None).await.unwrap();

    let recipients = store.list_recipient_identities().await.unwrap();
    assert_eq!(recipients, vec!["100001".to_string()]);

    // A user linked after the first read shows up on the next one
    User::create(&db.pool, Some("Carol"), Some("100002")).await.unwrap();

    let recipients: HashSet<String> = store
        .list_recipient_identities()
        .await
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(
        recipients,
        HashSet::from(["100001".to_string(), "100002".to_string()])
    );
}

#[tokio::test]
async fn test_get_event() {
    let (db, _temp_dir) = setup_test_db().await;
    let store = SqliteNotificationStore::new(&db);
    let now = now_rounded();

    let mut new = new_event("Deadline: final project", now + Duration::days(3));
    new.kind = EventKind::Deadline;
    let event = Event::create(&db.pool, new).await.unwrap();

    let found = store.get_event(&event.id).await.unwrap().unwrap();
    assert_eq!(found.title, "Deadline: final project");
    assert_eq!(found.kind, EventKind::Deadline);
    assert_eq!(found.starts_at, event.starts_at);

    assert!(store.get_event("missing").await.unwrap().is_none());
}
