//! Notification store factory

use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::postgres::PostgresPool;

use super::memory::MemoryNotificationStore;
use super::postgres::PostgresNotificationStore;
use super::{NotificationStore, StoreError};

/// Create a notification store based on configuration.
///
/// - `"postgres"`: `PostgresNotificationStore` if a pool is provided; the
///   schema is created when missing
/// - `"memory"` (default): `MemoryNotificationStore`
pub async fn create_notification_store(
    settings: &DatabaseConfig,
    postgres_pool: Option<&PostgresPool>,
) -> Result<Arc<dyn NotificationStore>, StoreError> {
    match settings.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(backend = "postgres", "Creating PostgreSQL notification store");
                let store = PostgresNotificationStore::new(pool.pool().clone());
                store.ensure_schema().await?;
                Ok(Arc::new(store))
            } else {
                tracing::warn!(
                    "PostgreSQL backend requested but no pool provided, falling back to memory"
                );
                Ok(Arc::new(MemoryNotificationStore::new()))
            }
        }
        _ => {
            tracing::info!(backend = "memory", "Creating memory notification store");
            Ok(Arc::new(MemoryNotificationStore::new()))
        }
    }
}
