//! PostgreSQL-based notification store.
//!
//! Notifications are stored as documents: shared fields in columns, the
//! target list and the tagged variant as JSONB.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::notification::{NewNotification, Notification, NotificationVariant, Target};

use super::{FindOne, NotificationStore, StoreError};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS notifications (
    seq BIGSERIAL,
    id TEXT PRIMARY KEY,
    notification_type TEXT NOT NULL,
    targets JSONB NOT NULL
        CHECK (jsonb_typeof(targets) = 'array' AND jsonb_array_length(targets) > 0),
    variant JSONB NOT NULL,
    last_accessed TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_TARGETS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS notifications_targets_idx
    ON notifications USING GIN (targets jsonb_path_ops)
"#;

type NotificationRow = (
    String,
    serde_json::Value,
    serde_json::Value,
    Option<DateTime<Utc>>,
    DateTime<Utc>,
);

type SequencedRow = (
    i64,
    String,
    serde_json::Value,
    serde_json::Value,
    Option<DateTime<Utc>>,
    DateTime<Utc>,
);

/// Table structure:
/// - `notifications` - one row per notification, `targets` queried by JSONB containment
pub struct PostgresNotificationStore {
    pool: PgPool,
}

impl PostgresNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the table and index if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_TARGETS_INDEX).execute(&self.pool).await?;
        tracing::info!("Notification schema ready");
        Ok(())
    }

    fn target_filter(user_id: &str) -> serde_json::Value {
        json!([{ "user_id": user_id }])
    }

    fn decode(row: NotificationRow) -> Result<Notification, StoreError> {
        let (id, targets, variant, last_accessed, created_at) = row;

        let targets: Vec<Target> = serde_json::from_value(targets)?;
        let variant: NotificationVariant = serde_json::from_value(variant)?;

        Ok(Notification {
            id,
            targets,
            last_accessed,
            created_at,
            variant,
        })
    }
}

#[async_trait]
impl NotificationStore for PostgresNotificationStore {
    fn backend_type(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, notification: NewNotification) -> Result<Notification, StoreError> {
        notification.validate().map_err(StoreError::Validation)?;

        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO notifications (id, notification_type, targets, variant, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&id)
        .bind(notification.variant.discriminator())
        .bind(Json(&notification.targets))
        .bind(Json(&notification.variant))
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            notification_id = %id,
            notification_type = notification.variant.discriminator(),
            "Notification stored in PostgreSQL"
        );

        Ok(notification.into_stored(id, created_at))
    }

    async fn find_by_target(&self, user_id: &str) -> Result<Vec<Notification>, StoreError> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            r#"
            SELECT id, targets, variant, last_accessed, created_at
            FROM notifications
            WHERE targets @> $1
            ORDER BY seq ASC
            "#,
        )
        .bind(Self::target_filter(user_id))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::decode).collect()
    }

    async fn touch_by_target(&self, user_id: &str, at: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET last_accessed = $2
            WHERE targets @> $1
            "#,
        )
        .bind(Self::target_filter(user_id))
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn touch_and_find_by_target(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<Notification>, StoreError> {
        // RETURNING has no ORDER BY; sort on seq afterwards
        let mut rows: Vec<SequencedRow> = sqlx::query_as(
            r#"
            UPDATE notifications
            SET last_accessed = $2
            WHERE targets @> $1
            RETURNING seq, id, targets, variant, last_accessed, created_at
            "#,
        )
        .bind(Self::target_filter(user_id))
        .bind(at)
        .fetch_all(&self.pool)
        .await?;

        rows.sort_by_key(|row| row.0);

        rows.into_iter()
            .map(|(_, id, targets, variant, last_accessed, created_at)| {
                Self::decode((id, targets, variant, last_accessed, created_at))
            })
            .collect()
    }

    async fn find_one(&self, id: &str) -> Result<FindOne, StoreError> {
        let mut rows: Vec<NotificationRow> = sqlx::query_as(
            r#"
            SELECT id, targets, variant, last_accessed, created_at
            FROM notifications
            WHERE id = $1
            LIMIT 2
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        match rows.len() {
            0 => Ok(FindOne::Missing),
            1 => Ok(FindOne::Found(Self::decode(rows.remove(0))?)),
            n => Ok(FindOne::Multiple(n)),
        }
    }

    async fn delete(&self, notification: &Notification) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(&notification.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Operation(format!(
                "notification {} no longer exists",
                notification.id
            )));
        }

        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notifications")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_filter_shape() {
        assert_eq!(
            PostgresNotificationStore::target_filter("u1"),
            json!([{"user_id": "u1"}])
        );
    }

    #[test]
    fn test_decode_row() {
        let created_at = Utc::now();
        let row: NotificationRow = (
            "n-1".to_string(),
            json!([{"user_id": "u1", "external_id": "k1"}]),
            json!({"notification_type": "list-invite", "list_id": "L1"}),
            None,
            created_at,
        );

        let notification = PostgresNotificationStore::decode(row).unwrap();
        assert_eq!(notification.id, "n-1");
        assert_eq!(notification.targets, vec![Target::new("u1", "k1")]);
        assert_eq!(notification.variant.list_id(), Some("L1"));
    }

    #[test]
    fn test_decode_rejects_unknown_variant() {
        let row: NotificationRow = (
            "n-1".to_string(),
            json!([{"user_id": "u1", "external_id": null}]),
            json!({"notification_type": "friend-request"}),
            None,
            Utc::now(),
        );

        assert!(matches!(
            PostgresNotificationStore::decode(row),
            Err(StoreError::Serialization(_))
        ));
    }
}
