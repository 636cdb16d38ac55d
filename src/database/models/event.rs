use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

const EVENT_COLUMNS: &str = "id, title, kind, starts_at, ends_at, meeting_url, recording_url, \
     notify_enabled, notified_24h, notified_1h, notified_record, created_at";

/// Kind of a scheduled platform event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Webinar,
    Qa,
    Workshop,
    Deadline,
}

impl EventKind {
    /// Human-readable label used in outgoing Telegram messages.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Webinar => "🖥 Webinar",
            EventKind::Qa => "❓ Q&A",
            EventKind::Workshop => "🎯 Workshop",
            EventKind::Deadline => "⏰ Deadline",
        }
    }
}

/// The notification thresholds an event can cross.
///
/// `Hours24` and `Hour1` are time offsets before `starts_at`; `Recording`
/// fires once a recording link is published for a started event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyThreshold {
    /// Reminder one day before the event starts.
    Hours24,
    /// Reminder one hour before the event starts.
    Hour1,
    /// Recording link became available.
    Recording,
}

impl NotifyThreshold {
    /// Offset before `starts_at` at which the reminder fires.
    /// `None` for `Recording`, which is reactive rather than time-based.
    pub fn offset(&self) -> Option<chrono::Duration> {
        match self {
            NotifyThreshold::Hours24 => Some(chrono::Duration::hours(24)),
            NotifyThreshold::Hour1 => Some(chrono::Duration::hours(1)),
            NotifyThreshold::Recording => None,
        }
    }
}

/// A scheduled occurrence (webinar, Q&A, workshop, deadline).
///
/// Created and edited by the course-management side of the platform; the
/// notifier reads events and owns only the three `notified_*` flags.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub kind: EventKind,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub meeting_url: Option<String>,
    pub recording_url: Option<String>,
    pub notify_enabled: bool,
    pub notified_24h: bool,
    pub notified_1h: bool,
    pub notified_record: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when inserting an event; flags always start false.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub kind: EventKind,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub meeting_url: Option<String>,
    pub recording_url: Option<String>,
    pub notify_enabled: bool,
}

impl Event {
    pub async fn create(pool: &sqlx::SqlitePool, new: NewEvent) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO events (id, title, kind, starts_at, ends_at, meeting_url, recording_url,
                                notify_enabled, notified_24h, notified_1h, notified_record, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, 0, 0, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.title)
        .bind(new.kind)
        .bind(new.starts_at)
        .bind(new.ends_at)
        .bind(&new.meeting_url)
        .bind(&new.recording_url)
        .bind(new.notify_enabled)
        .bind(now)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, &id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        event_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?");
        sqlx::query_as::<_, Event>(&query)
            .bind(event_id)
            .fetch_optional(pool)
            .await
    }

    /// Events that are reminder candidates for `threshold`: notifications
    /// enabled and the matching flag still false. Window filtering against
    /// `starts_at` happens in the store adapter.
    pub async fn find_pending_reminder(
        pool: &sqlx::SqlitePool,
        threshold: NotifyThreshold,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let flag = flag_column(threshold);
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE notify_enabled = 1 AND {flag} = 0 ORDER BY starts_at"
        );
        sqlx::query_as::<_, Event>(&query).fetch_all(pool).await
    }

    /// Events with a published recording that has not been announced yet.
    pub async fn find_pending_recording(
        pool: &sqlx::SqlitePool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE notified_record = 0 AND recording_url IS NOT NULL ORDER BY starts_at"
        );
        sqlx::query_as::<_, Event>(&query).fetch_all(pool).await
    }

    /// Sets the notification flag for `threshold` with a single conditional
    /// UPDATE. Calling it again for the same event/threshold matches zero
    /// rows and is a no-op; the recording flag additionally refuses to flip
    /// while no recording URL is stored.
    pub async fn mark_notified(
        pool: &sqlx::SqlitePool,
        event_id: &str,
        threshold: NotifyThreshold,
    ) -> Result<(), sqlx::Error> {
        let query = match threshold {
            NotifyThreshold::Hours24 => {
                "UPDATE events SET notified_24h = 1 WHERE id = ? AND notified_24h = 0"
            }
            NotifyThreshold::Hour1 => {
                "UPDATE events SET notified_1h = 1 WHERE id = ? AND notified_1h = 0"
            }
            NotifyThreshold::Recording => {
                "UPDATE events SET notified_record = 1 \
                 WHERE id = ? AND notified_record = 0 AND recording_url IS NOT NULL"
            }
        };
        sqlx::query(query).bind(event_id).execute(pool).await?;
        Ok(())
    }
}

fn flag_column(threshold: NotifyThreshold) -> &'static str {
    match threshold {
        NotifyThreshold::Hours24 => "notified_24h",
        NotifyThreshold::Hour1 => "notified_1h",
        NotifyThreshold::Recording => "notified_record",
    }
}
