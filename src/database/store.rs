use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use thiserror::Error;

use super::connection::DatabaseManager;
use super::models::{Event, NotifyThreshold, User};

/// The event/user store is unreachable or a query/write failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// The minimal read/write surface the notification scheduler needs,
/// decoupled from the persistence technology. The scheduler is the sole
/// writer of the three `notified_*` flags.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Events with notifications enabled, the flag for `threshold` still
    /// false, and `starts_at` inside `now + offset ± tolerance` (inclusive).
    /// Returns an empty list for the recording threshold, which has no
    /// forward window.
    async fn find_events_crossing_threshold(
        &self,
        threshold: NotifyThreshold,
        now: DateTime<Utc>,
        tolerance: Duration,
    ) -> Result<Vec<Event>, StoreError>;

    /// Events with a recording URL set, `notified_record` false, and a
    /// start time at or before `now`.
    async fn find_events_with_unnotified_recording(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, StoreError>;

    /// Idempotent flag write; a second call for the same event/threshold
    /// is a no-op.
    async fn mark_notified(
        &self,
        event_id: &str,
        threshold: NotifyThreshold,
    ) -> Result<(), StoreError>;

    /// All chat identities with a linked messaging account, read fresh on
    /// every call (never cached).
    async fn list_recipient_identities(&self) -> Result<Vec<String>, StoreError>;

    /// Single-event lookup, used by the manual announce endpoint.
    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, StoreError>;
}

/// SQLite-backed store used in production.
#[derive(Clone)]
pub struct SqliteNotificationStore {
    pool: SqlitePool,
}

impl SqliteNotificationStore {
    pub fn new(db: &DatabaseManager) -> Self {
        Self {
            pool: db.pool.clone(),
        }
    }
}

#[async_trait]
impl NotificationStore for SqliteNotificationStore {
    async fn find_events_crossing_threshold(
        &self,
        threshold: NotifyThreshold,
        now: DateTime<Utc>,
        tolerance: Duration,
    ) -> Result<Vec<Event>, StoreError> {
        let Some(offset) = threshold.offset() else {
            return Ok(Vec::new());
        };
        let target = now + offset;

        let candidates = Event::find_pending_reminder(&self.pool, threshold).await?;
        Ok(candidates
            .into_iter()
            .filter(|event| in_window(event.starts_at, target, tolerance))
            .collect())
    }

    async fn find_events_with_unnotified_recording(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, StoreError> {
        let candidates = Event::find_pending_recording(&self.pool).await?;
        Ok(candidates
            .into_iter()
            .filter(|event| event.starts_at <= now)
            .collect())
    }

    async fn mark_notified(
        &self,
        event_id: &str,
        threshold: NotifyThreshold,
    ) -> Result<(), StoreError> {
        Event::mark_notified(&self.pool, event_id, threshold).await?;
        Ok(())
    }

    async fn list_recipient_identities(&self) -> Result<Vec<String>, StoreError> {
        Ok(User::linked_telegram_ids(&self.pool).await?)
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, StoreError> {
        Ok(Event::find_by_id(&self.pool, event_id).await?)
    }
}

/// True when `starts_at` lies inside `target ± tolerance`, edges included.
/// The window must be at least as wide as the polling interval so no event
/// can fall between two consecutive ticks.
fn in_window(starts_at: DateTime<Utc>, target: DateTime<Utc>, tolerance: Duration) -> bool {
    let delta = starts_at - target;
    delta >= -tolerance && delta <= tolerance
}
