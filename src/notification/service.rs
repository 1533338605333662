//! Notification use cases: list, delete, create.
//!
//! Every operation authorizes first, then validates, then touches the
//! store. Lower-level failures leave this module as exactly one `AppError`.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::AuthorizationGuard;
use crate::error::{AppError, Result};
use crate::metrics::OperationMetrics;
use crate::store::{FindOne, NotificationStore, StoreError};

use super::factory::NotificationFactory;
use super::types::Notification;

pub struct NotificationService {
    guard: AuthorizationGuard,
    factory: NotificationFactory,
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(
        guard: AuthorizationGuard,
        factory: NotificationFactory,
        store: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            guard,
            factory,
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn NotificationStore> {
        &self.store
    }

    /// All notifications addressed to `target_user`.
    ///
    /// `last_accessed` is updated and read back in one store call, so every
    /// returned record carries the timestamp of this request.
    #[tracing::instrument(name = "notifications.list", skip(self, token))]
    pub async fn get_notifications(
        &self,
        token: &str,
        target_user: Option<&str>,
    ) -> Result<Vec<Notification>> {
        let result = self.list(token, target_user).await;
        match &result {
            Ok(notifications) => OperationMetrics::record_listed(notifications.len()),
            Err(e) => OperationMetrics::record_error("list", e),
        }
        result
    }

    async fn list(&self, token: &str, target_user: Option<&str>) -> Result<Vec<Notification>> {
        self.guard.authorize(token).await?;

        let target_user =
            target_user.ok_or_else(|| AppError::BadRequest("target_user must be a value.".to_string()))?;

        let internal =
            |e: StoreError| AppError::Internal(format!("There was an internal service error: {}", e));

        let notifications = self
            .store
            .touch_and_find_by_target(target_user, Utc::now())
            .await
            .map_err(internal)?;

        tracing::debug!(returned = notifications.len(), "Notifications listed");

        Ok(notifications)
    }

    /// Delete the single notification with `notification_id`.
    #[tracing::instrument(name = "notifications.delete", skip(self, token))]
    pub async fn delete_notifications(
        &self,
        token: &str,
        notification_id: Option<&str>,
    ) -> Result<()> {
        let result = self.delete(token, notification_id).await;
        match &result {
            Ok(()) => OperationMetrics::record_deleted(),
            Err(e) => OperationMetrics::record_error("delete", e),
        }
        result
    }

    async fn delete(&self, token: &str, notification_id: Option<&str>) -> Result<()> {
        self.guard.authorize(token).await?;

        let notification_id = notification_id
            .ok_or_else(|| AppError::BadRequest("notification_id must be a value.".to_string()))?;

        let internal = |e: StoreError| {
            AppError::Internal(format!(
                "Unable to delete notification {}: {}",
                notification_id, e
            ))
        };
        let not_unique = || {
            AppError::NotFound(format!(
                "Unable to find unique notification_id: {}",
                notification_id
            ))
        };

        let notification = match self.store.find_one(notification_id).await.map_err(internal)? {
            FindOne::Found(notification) => notification,
            FindOne::Missing => return Err(not_unique()),
            FindOne::Multiple(count) => {
                tracing::warn!(count, "Notification id is not unique");
                return Err(not_unique());
            }
        };

        self.store.delete(&notification).await.map_err(internal)?;

        tracing::info!(notification_id = %notification.id, "Notification deleted");
        Ok(())
    }

    /// Build a notification from `payload` and store it.
    #[tracing::instrument(name = "notifications.create", skip(self, token, payload))]
    pub async fn post_notifications(
        &self,
        token: &str,
        payload: serde_json::Value,
    ) -> Result<Notification> {
        let result = self.create(token, payload).await;
        match &result {
            Ok(notification) => OperationMetrics::record_created(notification.notification_type()),
            Err(e) => OperationMetrics::record_error("create", e),
        }
        result
    }

    async fn create(&self, token: &str, payload: serde_json::Value) -> Result<Notification> {
        self.guard.authorize(token).await?;

        if !payload.is_object() {
            return Err(AppError::BadRequest(
                "Input payload must be a JSON object".to_string(),
            ));
        }

        let notification = self.factory.create_from_payload(payload).await?;

        let stored = self.store.insert(notification).await.map_err(|e| match e {
            StoreError::Validation(msg) => {
                AppError::BadRequest(format!("There was an issue creating notification: {}", msg))
            }
            other => AppError::Internal(format!("Unable to store notification: {}", other)),
        })?;

        tracing::info!(
            notification_id = %stored.id,
            notification_type = stored.notification_type(),
            target_count = stored.targets.len(),
            "Notification created"
        );

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, IdentityVerifier, VerifiedIdentity};
    use crate::directory::NoopTargetDirectory;
    use crate::notification::{TargetResolver, VariantRegistry};
    use crate::store::MemoryNotificationStore;
    use async_trait::async_trait;
    use serde_json::json;

    /// Accepts "good-token" only.
    struct TokenVerifier;

    #[async_trait]
    impl IdentityVerifier for TokenVerifier {
        async fn verify(&self, token: &str) -> std::result::Result<VerifiedIdentity, AuthError> {
            match token {
                "good-token" => Ok(VerifiedIdentity {
                    id: Some("kc-caller".to_string()),
                    username: None,
                }),
                "empty-id" => Ok(VerifiedIdentity::default()),
                _ => Err(AuthError::InvalidToken("unknown".to_string())),
            }
        }
    }

    fn service() -> NotificationService {
        NotificationService::new(
            AuthorizationGuard::new(Arc::new(TokenVerifier)),
            NotificationFactory::new(
                Arc::new(VariantRegistry::builtin()),
                TargetResolver::new(Arc::new(NoopTargetDirectory), false),
            ),
            Arc::new(MemoryNotificationStore::new()),
        )
    }

    #[tokio::test]
    async fn test_forbidden_wins_over_bad_input() {
        let service = service();

        for token in ["bad-token", "empty-id", ""] {
            assert!(matches!(
                service.get_notifications(token, None).await,
                Err(AppError::Forbidden(_))
            ));
            assert!(matches!(
                service.delete_notifications(token, None).await,
                Err(AppError::Forbidden(_))
            ));
            assert!(matches!(
                service.post_notifications(token, json!("garbage")).await,
                Err(AppError::Forbidden(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_list_requires_target_user() {
        let err = service()
            .get_notifications("good-token", None)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "target_user must be a value.");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_list_touches_last_accessed() {
        let service = service();
        service
            .post_notifications("good-token", json!({"targets": [{"user_id": "u1"}], "notification_type": "base"}))
            .await
            .unwrap();

        let before = Utc::now();
        let listed = service
            .get_notifications("good-token", Some("u1"))
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert!(listed[0].last_accessed.unwrap() >= before);
    }

    #[tokio::test]
    async fn test_delete_requires_id() {
        let err = service()
            .delete_notifications("good-token", None)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "notification_id must be a value.");
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let err = service()
            .delete_notifications("good-token", Some("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.message(), "Unable to find unique notification_id: nope");
    }

    #[tokio::test]
    async fn test_create_rejects_non_object_payload() {
        let err = service()
            .post_notifications("good-token", json!([1, 2]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = service()
            .post_notifications(
                "good-token",
                json!({"targets": "u1", "notification_type": "base"}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_unknown_type() {
        let service = service();
        let err = service
            .post_notifications(
                "good-token",
                json!({"targets": [{"user_id": "u1"}], "notification_type": "List-Invite"}),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotificationType(_)));
        assert_eq!(service.store().count().await.unwrap(), 0);
    }
}
