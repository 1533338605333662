//! Notification document storage.
//!
//! # Architecture
//!
//! - `MemoryNotificationStore`: in-memory storage using DashMap (default)
//! - `PostgresNotificationStore`: JSONB documents in PostgreSQL
//!
//! Use `create_notification_store()` to create the backend selected by
//! configuration.

mod factory;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::notification::{NewNotification, Notification};

pub use factory::create_notification_store;
pub use memory::MemoryNotificationStore;
pub use postgres::PostgresNotificationStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The document does not satisfy the stored schema
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The storage operation itself failed
    #[error("Operation failed: {0}")]
    Operation(String),

    /// Stored document could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        // SQLSTATE class 22 (data exception) and 23 (integrity constraint)
        // are caused by the document, not by the database.
        if let sqlx::Error::Database(ref db) = err {
            if let Some(code) = db.code() {
                if code.starts_with("22") || code.starts_with("23") {
                    return StoreError::Validation(db.message().to_string());
                }
            }
        }
        StoreError::Operation(err.to_string())
    }
}

/// Result of a lookup that must be unique.
#[derive(Debug, Clone, PartialEq)]
pub enum FindOne {
    Found(Notification),
    Missing,
    Multiple(usize),
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    fn backend_type(&self) -> &'static str;

    /// Validate and persist, assigning `id` and `created_at`.
    async fn insert(&self, notification: NewNotification) -> Result<Notification, StoreError>;

    /// Every notification with a target whose `user_id` matches, oldest first.
    async fn find_by_target(&self, user_id: &str) -> Result<Vec<Notification>, StoreError>;

    /// Set `last_accessed` on everything `find_by_target` would return.
    ///
    /// Returns the number of updated notifications.
    async fn touch_by_target(&self, user_id: &str, at: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Set `last_accessed` and return the touched notifications, oldest first.
    ///
    /// Runs as one step: every returned notification carries `at`, including
    /// one inserted while the call is in flight.
    async fn touch_and_find_by_target(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<Notification>, StoreError>;

    async fn find_one(&self, id: &str) -> Result<FindOne, StoreError>;

    async fn delete(&self, notification: &Notification) -> Result<(), StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}
