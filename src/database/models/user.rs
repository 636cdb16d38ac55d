use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A platform user. `telegram_id` is the opaque chat identity the user
/// linked through the bot; `None` means not linked, excluded from delivery.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_name: Option<String>,
    pub telegram_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        first_name: Option<&str>,
        telegram_id: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO users (id, first_name, telegram_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(first_name)
        .bind(telegram_id)
        .bind(now)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, &id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, first_name, telegram_id, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// All linked chat identities. Queried fresh on every scheduler tick so
    /// newly linked users receive the very next notification.
    pub async fn linked_telegram_ids(pool: &sqlx::SqlitePool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT telegram_id FROM users WHERE telegram_id IS NOT NULL",
        )
        .fetch_all(pool)
        .await
    }
}
